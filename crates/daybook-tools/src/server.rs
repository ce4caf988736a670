//! Stdio JSON-RPC server exposing tools, one resource, and one prompt.
//!
//! One request per line on stdin, one response per line on stdout; log
//! output goes to stderr so it never mixes with the protocol stream.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use daybook_notes::NoteStore;

use crate::registry::ToolRegistry;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "daybook";

pub const NOTES_LATEST_URI: &str = "notes://latest";
pub const NOTE_SUMMARY_PROMPT: &str = "note_summary";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

pub struct ToolServer {
    registry: ToolRegistry,
    notes: Arc<NoteStore>,
}

impl ToolServer {
    pub fn new(registry: ToolRegistry, notes: Arc<NoteStore>) -> Self {
        Self { registry, notes }
    }

    /// Serve requests from stdin until EOF.
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut lines = stdin.lines();

        tracing::info!("Tool server listening on stdio");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Value>(line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => Some(error_response(Value::Null, PARSE_ERROR, &e.to_string())),
            };

            if let Some(response) = response {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                stdout.write_all(&out).await?;
                stdout.flush().await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Dispatch one request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: Value) -> Option<Value> {
        let id = request.get("id").cloned()?;
        let method = request.get("method").and_then(Value::as_str).unwrap_or_default();
        let params = request.get("params").cloned().unwrap_or(Value::Null);

        let response = match method {
            "initialize" => result_response(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                    "capabilities": {
                        "tools": {},
                        "resources": {},
                        "prompts": {},
                    }
                }),
            ),
            "tools/list" => result_response(id, json!({"tools": self.registry.list()})),
            "tools/call" => self.handle_tool_call(id, params).await,
            "resources/list" => result_response(
                id,
                json!({
                    "resources": [{
                        "uri": NOTES_LATEST_URI,
                        "name": "Latest note",
                        "mimeType": "text/plain",
                    }]
                }),
            ),
            "resources/read" => self.handle_resource_read(id, params),
            "prompts/list" => result_response(
                id,
                json!({
                    "prompts": [{
                        "name": NOTE_SUMMARY_PROMPT,
                        "description": "Summarize all current notes",
                    }]
                }),
            ),
            "prompts/get" => self.handle_prompt_get(id, params),
            other => error_response(id, METHOD_NOT_FOUND, &format!("Unknown method: {}", other)),
        };

        Some(response)
    }

    async fn handle_tool_call(&self, id: Value, params: Value) -> Value {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return error_response(id, INVALID_PARAMS, "tools/call requires a tool name");
        };
        let args = params.get("arguments").cloned().unwrap_or(Value::Null);

        let output = self.registry.call(name, args).await;

        result_response(
            id,
            json!({
                "content": [{"type": "text", "text": output.text}],
                "isError": output.is_error,
            }),
        )
    }

    fn handle_resource_read(&self, id: Value, params: Value) -> Value {
        let uri = params.get("uri").and_then(Value::as_str).unwrap_or_default();
        if uri != NOTES_LATEST_URI {
            return error_response(id, INVALID_PARAMS, &format!("Unknown resource: {}", uri));
        }

        let text = match self.notes.read_last() {
            Ok(Some(line)) => line,
            Ok(None) => "No notes found.".to_string(),
            Err(e) => return error_response(id, INVALID_PARAMS, &e.to_string()),
        };

        result_response(
            id,
            json!({
                "contents": [{
                    "uri": NOTES_LATEST_URI,
                    "mimeType": "text/plain",
                    "text": text,
                }]
            }),
        )
    }

    fn handle_prompt_get(&self, id: Value, params: Value) -> Value {
        let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
        if name != NOTE_SUMMARY_PROMPT {
            return error_response(id, INVALID_PARAMS, &format!("Unknown prompt: {}", name));
        }

        let notes = match self.notes.read_all() {
            Ok(notes) => notes,
            Err(e) => return error_response(id, INVALID_PARAMS, &e.to_string()),
        };

        let text = if notes.trim().is_empty() {
            "No notes found".to_string()
        } else {
            format!("Summarize the following notes:\n{}", notes.trim())
        };

        result_response(
            id,
            json!({
                "description": "Summarize all current notes",
                "messages": [{
                    "role": "user",
                    "content": {"type": "text", "text": text},
                }]
            }),
        )
    }
}

fn result_response(id: Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
}
