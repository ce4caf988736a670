//! Tool implementations, one module per backing component.

pub mod calendar;
pub mod notes;

use std::sync::Arc;

use daybook_core::Config;
use daybook_notes::NoteStore;

use crate::registry::ToolRegistry;

/// Build the registry with every builtin tool.
pub fn builtin_registry(config: &Config, notes: Arc<NoteStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    calendar::register(&mut registry, config);
    notes::register(&mut registry, notes);
    registry
}
