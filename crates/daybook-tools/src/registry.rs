use std::sync::Arc;

use serde_json::{json, Value};

use crate::tool::{Tool, ToolOutput};

/// Central tool registration and dispatch.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        tracing::debug!("Registered tool: {}", tool.name());
        self.tools.push(tool);
    }

    /// Tool descriptors for `tools/list`.
    pub fn list(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "inputSchema": t.input_schema(),
                })
            })
            .collect()
    }

    /// Invoke a tool by name. Unknown names and tool failures both come
    /// back as error outputs, never as propagated errors.
    pub async fn call(&self, name: &str, args: Value) -> ToolOutput {
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            return ToolOutput::error(format!("Unknown tool: {}", name));
        };

        tracing::info!("Calling tool: {}", name);
        tool.call(args).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
