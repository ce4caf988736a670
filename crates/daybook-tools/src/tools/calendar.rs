//! Calendar tools: create, list, update, delete.
//!
//! The Calendar API context is built lazily on first use so notes-only
//! sessions never trigger an authorization flow.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use daybook_auth::{
    obtain_credential, ClientSecret, CredentialStore, GoogleAuthenticator, InteractiveFlow,
    CALENDAR_SCOPE,
};
use daybook_calendar::ops::{self, CreateEventArgs, UpdateEventArgs};
use daybook_calendar::{CalendarClient, CalendarContext, CalendarError};
use daybook_core::{AuthError, Config};

use crate::registry::ToolRegistry;
use crate::tool::{Tool, ToolOutput};

/// Lazily authorized calendar context shared by the calendar tools.
pub struct CalendarHandle {
    config: Config,
    ctx: OnceCell<CalendarContext>,
}

impl CalendarHandle {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self { config, ctx: OnceCell::new() })
    }

    async fn context(&self) -> Result<&CalendarContext, AuthError> {
        self.ctx
            .get_or_try_init(|| async {
                let secret = ClientSecret::load(&self.config.credentials_path)?;
                let authenticator = GoogleAuthenticator::from_secret(&secret);
                let store = CredentialStore::new(&self.config.token_path);
                let flow = InteractiveFlow::new(
                    GoogleAuthenticator::from_secret(&secret),
                    vec![CALENDAR_SCOPE.to_string()],
                );

                let credential = obtain_credential(&store, &authenticator, &flow).await?;

                Ok(CalendarContext::new(
                    CalendarClient::new(&credential.access_token),
                    self.config.calendar_id.clone(),
                ))
            })
            .await
    }
}

/// Register the four calendar tools.
pub fn register(registry: &mut ToolRegistry, config: &Config) {
    let handle = CalendarHandle::new(config.clone());
    registry.register(Arc::new(CreateEventTool { handle: handle.clone() }));
    registry.register(Arc::new(ListEventsTool { handle: handle.clone() }));
    registry.register(Arc::new(UpdateEventTool { handle: handle.clone() }));
    registry.register(Arc::new(DeleteEventTool { handle }));
}

// Failures cross the tool boundary as user-facing text; the technical
// detail stays in the logs.

fn auth_failure(e: &AuthError) -> ToolOutput {
    tracing::warn!("Authorization failed: {}", e);
    ToolOutput::error(format!("Authorization failed: {}", e.user_message()))
}

fn calendar_failure(e: &CalendarError) -> ToolOutput {
    tracing::warn!("Calendar operation failed: {}", e);
    ToolOutput::error(format!("An error occurred: {}", e.user_message()))
}

fn bad_args(e: &serde_json::Error) -> ToolOutput {
    ToolOutput::error(format!("Invalid arguments: {}", e))
}

fn parse_args<T: for<'de> Deserialize<'de>>(args: Value) -> Result<T, serde_json::Error> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
}

// create_event

#[derive(Debug, Deserialize)]
struct CreateParams {
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    duration_hours: Option<f64>,
}

struct CreateEventTool {
    handle: Arc<CalendarHandle>,
}

#[async_trait]
impl Tool for CreateEventTool {
    fn name(&self) -> &'static str {
        "create_event"
    }

    fn description(&self) -> &'static str {
        "Create a calendar event. Defaults to starting now, lasting duration_hours (1 hour if unset), with a popup reminder 30 minutes before."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "summary": {"type": "string", "description": "Event title"},
                "description": {"type": "string"},
                "location": {"type": "string"},
                "start_time": {"type": "string", "description": "ISO-8601; trailing Z is UTC"},
                "end_time": {"type": "string", "description": "ISO-8601; trailing Z is UTC"},
                "duration_hours": {"type": "number", "description": "Used when end_time is not given"}
            },
            "required": ["summary"]
        })
    }

    async fn call(&self, args: Value) -> ToolOutput {
        let params: CreateParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return bad_args(&e),
        };

        let ctx = match self.handle.context().await {
            Ok(ctx) => ctx,
            Err(e) => return auth_failure(&e),
        };

        let result = ops::create_event(
            ctx,
            CreateEventArgs {
                summary: params.summary,
                description: params.description,
                location: params.location,
                start_time: params.start_time,
                end_time: params.end_time,
                duration_hours: params.duration_hours,
            },
        )
        .await;

        match result {
            Ok(text) => ToolOutput::ok(text),
            Err(e) => calendar_failure(&e),
        }
    }
}

// list_events

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default = "default_max_results")]
    max_results: u32,
    #[serde(default = "default_days_ahead")]
    days_ahead: i64,
}

fn default_max_results() -> u32 {
    10
}

fn default_days_ahead() -> i64 {
    7
}

struct ListEventsTool {
    handle: Arc<CalendarHandle>,
}

#[async_trait]
impl Tool for ListEventsTool {
    fn name(&self) -> &'static str {
        "list_events"
    }

    fn description(&self) -> &'static str {
        "List upcoming events between now and now + days_ahead, ordered by start time."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "max_results": {"type": "integer", "default": 10},
                "days_ahead": {"type": "integer", "default": 7}
            }
        })
    }

    async fn call(&self, args: Value) -> ToolOutput {
        let params: ListParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return bad_args(&e),
        };

        let ctx = match self.handle.context().await {
            Ok(ctx) => ctx,
            Err(e) => return auth_failure(&e),
        };

        match ops::list_events(ctx, params.max_results, params.days_ahead).await {
            Ok(text) => ToolOutput::ok(text),
            Err(e) => calendar_failure(&e),
        }
    }
}

// update_event

#[derive(Debug, Deserialize)]
struct UpdateParams {
    event_id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

struct UpdateEventTool {
    handle: Arc<CalendarHandle>,
}

#[async_trait]
impl Tool for UpdateEventTool {
    fn name(&self) -> &'static str {
        "update_event"
    }

    fn description(&self) -> &'static str {
        "Update an event by id. Only the supplied fields change; everything else is left untouched."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "event_id": {"type": "string"},
                "summary": {"type": "string"},
                "description": {"type": "string"},
                "location": {"type": "string"},
                "start_time": {"type": "string"},
                "end_time": {"type": "string"}
            },
            "required": ["event_id"]
        })
    }

    async fn call(&self, args: Value) -> ToolOutput {
        let params: UpdateParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return bad_args(&e),
        };

        let ctx = match self.handle.context().await {
            Ok(ctx) => ctx,
            Err(e) => return auth_failure(&e),
        };

        let result = ops::update_event(
            ctx,
            &params.event_id,
            UpdateEventArgs {
                summary: params.summary,
                description: params.description,
                location: params.location,
                start_time: params.start_time,
                end_time: params.end_time,
            },
        )
        .await;

        match result {
            Ok(text) => ToolOutput::ok(text),
            Err(e) => calendar_failure(&e),
        }
    }
}

// delete_event

#[derive(Debug, Deserialize)]
struct DeleteParams {
    event_id: String,
}

struct DeleteEventTool {
    handle: Arc<CalendarHandle>,
}

#[async_trait]
impl Tool for DeleteEventTool {
    fn name(&self) -> &'static str {
        "delete_event"
    }

    fn description(&self) -> &'static str {
        "Delete an event by id. Deleting the same id twice reports an error."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "event_id": {"type": "string"}
            },
            "required": ["event_id"]
        })
    }

    async fn call(&self, args: Value) -> ToolOutput {
        let params: DeleteParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return bad_args(&e),
        };

        let ctx = match self.handle.context().await {
            Ok(ctx) => ctx,
            Err(e) => return auth_failure(&e),
        };

        match ops::delete_event(ctx, &params.event_id).await {
            Ok(text) => ToolOutput::ok(text),
            Err(e) => calendar_failure(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let params: ListParams = parse_args(Value::Null).unwrap();
        assert_eq!(params.max_results, 10);
        assert_eq!(params.days_ahead, 7);
    }

    #[test]
    fn test_create_params_require_summary() {
        let result: Result<CreateParams, _> = parse_args(json!({"location": "Room A"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_params_optional_fields() {
        let params: UpdateParams =
            parse_args(json!({"event_id": "ev1", "location": "Room B"})).unwrap();
        assert_eq!(params.event_id, "ev1");
        assert_eq!(params.location, Some("Room B".to_string()));
        assert_eq!(params.summary, None);
    }

    #[test]
    fn test_failures_surface_user_messages() {
        let output = calendar_failure(&CalendarError::RateLimited(30));
        assert!(output.is_error);
        assert_eq!(
            output.text,
            "An error occurred: Too many requests. Please wait 30 seconds."
        );

        let output = auth_failure(&AuthError::CredentialNotFound("token.json".into()));
        assert!(output.is_error);
        assert_eq!(output.text, "Authorization failed: Not signed in. Please authenticate.");
    }

    #[test]
    fn test_failures_omit_technical_detail() {
        let output = calendar_failure(&CalendarError::EventNotFound("abc123".into()));
        assert!(!output.text.contains("abc123"));
        assert!(output.text.contains("Event not found"));
    }

    #[tokio::test]
    async fn test_missing_client_secret_is_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            credentials_path: dir.path().join("credentials.json"),
            token_path: dir.path().join("token.json"),
            notes_path: dir.path().join("notes.txt"),
            calendar_id: "primary".to_string(),
        };

        let handle = CalendarHandle::new(config);
        let tool = ListEventsTool { handle };

        let output = tool.call(json!({})).await;
        assert!(output.is_error);
        assert!(output.text.contains("Authorization failed"));
    }
}
