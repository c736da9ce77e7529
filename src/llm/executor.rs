//! Tool execution orchestration for LLM function calls
//!
//! Runs a batch of provider tool calls against a [`ToolRegistry`] and
//! returns one result per call, in order. A failing call never aborts the
//! batch; its error text becomes the content sent back to the model.

use crate::ToolRegistry;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::converter::json_to_tool_args;

/// Result from a single tool execution
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolExecutionResult {
    /// Tool call ID (for provider correlation)
    pub tool_call_id: String,
    pub tool_name: String,
    /// JSON-encoded result, or an error message
    pub content: String,
    pub success: bool,
}

impl ToolExecutionResult {
    fn failed(call: &ToolCallRequest, message: String) -> Self {
        warn!(tool = %call.name, call_id = %call.id, "{}", message);
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            content: message,
            success: false,
        }
    }
}

/// Simple tool call representation for execution
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// JSON arguments as string
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Execute tool calls sequentially and return structured results
pub async fn execute_tool_calls(
    registry: &ToolRegistry,
    tool_calls: Vec<ToolCallRequest>,
) -> Vec<ToolExecutionResult> {
    let mut results = Vec::with_capacity(tool_calls.len());

    for call in tool_calls {
        info!(tool = %call.name, call_id = %call.id, "Executing tool call");

        let raw = if call.arguments.trim().is_empty() {
            "{}"
        } else {
            call.arguments.as_str()
        };
        let args: Value = match serde_json::from_str(raw) {
            Ok(args) => args,
            Err(e) => {
                let message = format!("Failed to parse tool arguments for {}: {}", call.name, e);
                results.push(ToolExecutionResult::failed(&call, message));
                continue;
            }
        };

        let tool_args = match json_to_tool_args(&call.name, args) {
            Ok(args) => args,
            Err(e) => {
                let message = format!("Failed to convert arguments for {}: {}", call.name, e);
                results.push(ToolExecutionResult::failed(&call, message));
                continue;
            }
        };

        match registry.execute_tool(&call.name, &tool_args).await {
            Ok(result) => {
                let content = json!({
                    "message": result.message,
                    "data": result.data,
                })
                .to_string();
                results.push(ToolExecutionResult {
                    tool_call_id: call.id,
                    tool_name: call.name,
                    content,
                    success: result.success,
                });
            }
            Err(e) => {
                let message = format!("Tool execution failed for {}: {}", call.name, e);
                results.push(ToolExecutionResult::failed(&call, message));
            }
        }
    }

    results
}
