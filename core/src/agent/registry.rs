use crate::traits::{Tool, ToolResult, ToolSpec};
use std::sync::Arc;
use tracing::warn;

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tool`, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        if let Some(existing) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            warn!(tool = tool.name(), "replacing already registered tool");
            *existing = tool;
        } else {
            self.tools.push(tool);
        }
    }

    pub fn extend(&mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn get_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub async fn execute(&self, name: &str, args: serde_json::Value) -> ToolResult {
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            return ToolResult::error(format!("Tool '{}' not found", name));
        };

        match tool.execute(args).await {
            Ok(result) => result,
            Err(e) => ToolResult::error(format!("Execution failed: {}", e)),
        }
    }
}
