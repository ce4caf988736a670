//! Agent-facing tool surface for Daybook.
//!
//! Tools are named callable operations with JSON-schema-described
//! parameters, each returning a plain string. A small stdio JSON-RPC server
//! exposes them, plus one read-only resource (`notes://latest`) and one
//! prompt template (`note_summary`).

pub mod registry;
pub mod server;
pub mod tool;
pub mod tools;

pub use registry::ToolRegistry;
pub use server::ToolServer;
pub use tool::{Tool, ToolOutput};
