//! Protocol search tool — wraps a search backend over nursing protocols.

use async_trait::async_trait;
use std::sync::Arc;
use wardline_core::{SearchBackend, Tool, ToolError, ToolOutput};

pub struct ProtocolSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl ProtocolSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for ProtocolSearchTool {
    fn name(&self) -> &str {
        "protocol_search"
    }

    fn description(&self) -> &str {
        "Search hospital nursing protocols and clinical procedures. \
         Returns the most relevant protocol passages for a query."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for, e.g. 'IV insertion' or 'wound dressing'"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'query' must be a string".into()))?;

        let passages = self
            .backend
            .search(query)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "protocol_search".into(),
                reason: e.to_string(),
            })?;

        if passages.is_empty() {
            return Ok(ToolOutput {
                call_id: String::new(),
                success: true,
                output: format!("No protocols found matching '{query}'."),
                data: None,
            });
        }

        let output = passages
            .iter()
            .map(|p| format!("[{}] {}\n{}", p.source, p.title, p.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(ToolOutput {
            call_id: String::new(),
            success: true,
            output,
            data: serde_json::to_value(&passages).ok(),
        })
    }
}
