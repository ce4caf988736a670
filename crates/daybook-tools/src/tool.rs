use async_trait::async_trait;
use serde_json::Value;

/// Result of a tool invocation: a plain string, flagged ok or failed.
///
/// Errors never cross this boundary as typed values; callers on the agent
/// side only see text (by design, per the tool protocol).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_error: false }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_error: true }
    }
}

/// A named callable operation exposed to an external agent.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema for the tool's arguments.
    fn input_schema(&self) -> Value;

    async fn call(&self, args: Value) -> ToolOutput;
}
