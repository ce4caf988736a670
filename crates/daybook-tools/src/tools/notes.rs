//! Sticky-note tools over the append-only notes file.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use daybook_notes::{NoteError, NoteStore};

use crate::registry::ToolRegistry;
use crate::tool::{Tool, ToolOutput};

pub const NO_NOTES: &str = "No notes found.";

/// Register the note tools.
pub fn register(registry: &mut ToolRegistry, store: Arc<NoteStore>) {
    registry.register(Arc::new(AddNoteTool { store: store.clone() }));
    registry.register(Arc::new(ReadNotesTool { store: store.clone() }));
    registry.register(Arc::new(ReadLastNoteTool { store }));
}

fn note_failure(e: &NoteError) -> ToolOutput {
    tracing::warn!("Note operation failed: {}", e);
    ToolOutput::error(format!("An error occurred: {}", e.user_message()))
}

#[derive(Debug, Deserialize)]
struct AddNoteParams {
    message: String,
}

struct AddNoteTool {
    store: Arc<NoteStore>,
}

#[async_trait]
impl Tool for AddNoteTool {
    fn name(&self) -> &'static str {
        "add_note"
    }

    fn description(&self) -> &'static str {
        "Append a new note to the sticky notes file."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {"type": "string", "description": "The note content to be added"}
            },
            "required": ["message"]
        })
    }

    async fn call(&self, args: Value) -> ToolOutput {
        let params: AddNoteParams = match serde_json::from_value(args) {
            Ok(p) => p,
            Err(e) => return ToolOutput::error(format!("Invalid arguments: {}", e)),
        };

        match self.store.append(&params.message) {
            Ok(()) => ToolOutput::ok("Note added successfully."),
            Err(e) => note_failure(&e),
        }
    }
}

struct ReadNotesTool {
    store: Arc<NoteStore>,
}

#[async_trait]
impl Tool for ReadNotesTool {
    fn name(&self) -> &'static str {
        "read_notes"
    }

    fn description(&self) -> &'static str {
        "Read all notes from the sticky notes file."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn call(&self, _args: Value) -> ToolOutput {
        match self.store.read_all() {
            Ok(notes) if notes.is_empty() => ToolOutput::ok(NO_NOTES),
            Ok(notes) => ToolOutput::ok(notes),
            Err(e) => note_failure(&e),
        }
    }
}

struct ReadLastNoteTool {
    store: Arc<NoteStore>,
}

#[async_trait]
impl Tool for ReadLastNoteTool {
    fn name(&self) -> &'static str {
        "read_last_note"
    }

    fn description(&self) -> &'static str {
        "Read the most recently added note."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn call(&self, _args: Value) -> ToolOutput {
        match self.store.read_last() {
            Ok(Some(line)) => ToolOutput::ok(line),
            Ok(None) => ToolOutput::ok(NO_NOTES),
            Err(e) => note_failure(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn registry_with_store() -> (tempfile::TempDir, ToolRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(NoteStore::new(dir.path().join("notes.txt")));
        let mut registry = ToolRegistry::new();
        register(&mut registry, store);
        (dir, registry)
    }

    #[tokio::test]
    async fn test_add_then_read() {
        let (_dir, registry) = registry_with_store();

        let added = registry.call("add_note", json!({"message": "a"})).await;
        assert_eq!(added, ToolOutput::ok("Note added successfully."));

        registry.call("add_note", json!({"message": "b"})).await;

        let all = registry.call("read_notes", json!({})).await;
        assert_eq!(all.text, "a\nb\n");

        let last = registry.call("read_last_note", json!({})).await;
        assert_eq!(last.text, "b");
    }

    #[tokio::test]
    async fn test_read_empty_notes() {
        let (_dir, registry) = registry_with_store();

        let all = registry.call("read_notes", json!({})).await;
        assert_eq!(all.text, NO_NOTES);

        let last = registry.call("read_last_note", json!({})).await;
        assert_eq!(last.text, NO_NOTES);
    }

    #[test]
    fn test_note_failure_hides_path() {
        let err = NoteError::Io {
            path: "/home/user/notes.txt".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        let output = note_failure(&err);
        assert!(output.is_error);
        assert_eq!(output.text, "An error occurred: Could not access the notes file.");
    }

    #[tokio::test]
    async fn test_add_note_missing_message() {
        let (_dir, registry) = registry_with_store();

        let output = registry.call("add_note", json!({})).await;
        assert!(output.is_error);
        assert!(output.text.contains("Invalid arguments"));
    }
}
