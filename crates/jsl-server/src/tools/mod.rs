pub mod lint;
pub mod results;

use crate::mcp::{ToolCallResult, ToolDefinition};
use crate::session::Session;
use serde_json::Value;
use std::sync::Arc;

/// Trait that every exposed tool implements.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn call(&self, params: Value) -> ToolCallResult;
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(session: Arc<Session>) -> Self {
        let tools: Vec<Box<dyn Tool>> = vec![
            Box::new(lint::LintTool::new(Arc::clone(&session))),
            Box::new(results::ResultsTool::new(Arc::clone(&session))),
            Box::new(results::ResetTool::new(session)),
        ];
        Self { tools }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub async fn call(&self, name: &str, params: Value) -> ToolCallResult {
        for tool in &self.tools {
            if tool.definition().name == name {
                return tool.call(params).await;
            }
        }
        ToolCallResult::error(format!("Unknown tool: {name}"))
    }
}

/// Params for tools that take none; tolerates `null` and `{}`.
pub(crate) fn is_empty_params(params: &Value) -> bool {
    params.is_null() || params.as_object().is_some_and(|o| o.is_empty())
}
