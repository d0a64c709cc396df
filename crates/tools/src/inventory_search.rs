//! Pharmacy inventory search tool.

use async_trait::async_trait;
use std::sync::Arc;
use wardline_core::{SearchBackend, Tool, ToolError, ToolOutput};

pub struct InventorySearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl InventorySearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for InventorySearchTool {
    fn name(&self) -> &str {
        "inventory_search"
    }

    fn description(&self) -> &str {
        "Search the pharmacy inventory for medication availability, stock \
         levels, storage locations, and dispensing requirements."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "medication": {
                    "type": "string",
                    "description": "Medication name to search for, e.g. 'ibuprofen'"
                }
            },
            "required": ["medication"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let medication = arguments["medication"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("'medication' must be a string".into()))?;

        let passages = self
            .backend
            .search(medication)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "inventory_search".into(),
                reason: e.to_string(),
            })?;

        if passages.is_empty() {
            return Ok(ToolOutput {
                call_id: String::new(),
                success: true,
                output: format!(
                    "No inventory entry found for '{medication}'. \
                     It may not be stocked; contact the pharmacy directly."
                ),
                data: None,
            });
        }

        let output = passages
            .iter()
            .map(|p| format!("{}: {}", p.title, p.snippet))
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
