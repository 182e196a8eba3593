use super::Tool;
use crate::capture::Capture;
use crate::mcp::{ToolCallResult, ToolDefinition};
use crate::session::Session;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct LintTool {
    session: Arc<Session>,
}

impl LintTool {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Tool for LintTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "jsl_lint",
            description: "Queue a captured script for beautification and linting. Returns \
                immediately; the outcome appears in jsl_results once the task finishes.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "host": {"type": "string", "description": "Host the traffic came from."},
                    "url": {"type": "string", "description": "Full URL the script was extracted from."},
                    "script": {"type": "string", "description": "Raw script text."}
                },
                "required": ["host", "url", "script"]
            }),
        }
    }

    async fn call(&self, params: Value) -> ToolCallResult {
        let capture: Capture = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return ToolCallResult::error(format!("Invalid parameters: {e}")),
        };

        let metadata = self.session.submit(capture).await;
        ToolCallResult::json(&json!({
            "queued": true,
            "url": metadata.url(),
            "file": metadata.storage_file_name(),
        }))
    }
}
