use super::{is_empty_params, Tool};
use crate::mcp::{ToolCallResult, ToolDefinition};
use crate::session::Session;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct ResultsTool {
    session: Arc<Session>,
}

#[derive(Deserialize, Default)]
struct ResultsParams {
    #[serde(default)]
    query: Option<String>,
}

impl ResultsTool {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Tool for ResultsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "jsl_results",
            description: "List lint results in the order tasks finished. Each entry has host, \
                url, status (\"Beautified\" when the pipeline ran cleanly) and finding_count.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Only return results whose host, url or status contains this text (case-insensitive)."
                    }
                }
            }),
        }
    }

    async fn call(&self, params: Value) -> ToolCallResult {
        let params: ResultsParams = if is_empty_params(&params) {
            ResultsParams::default()
        } else {
            match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => return ToolCallResult::error(format!("Invalid parameters: {e}")),
            }
        };

        let rows = match params.query.as_deref() {
            Some(query) => self.session.table().search(query),
            None => self.session.table().snapshot(),
        };
        ToolCallResult::json(&rows)
    }
}

pub struct ResetTool {
    session: Arc<Session>,
}

impl ResetTool {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Tool for ResetTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "jsl_reset",
            description: "Clear all collected lint results. Tasks still running will add \
                their results afterwards.",
            input_schema: json!({"type": "object", "properties": {}}),
        }
    }

    async fn call(&self, _params: Value) -> ToolCallResult {
        let removed = self.session.table().reset();
        tracing::info!("Reset result table ({removed} removed)");
        ToolCallResult::json(&json!({ "removed": removed }))
    }
}
