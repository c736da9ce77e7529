//! LLM integration for the PSA tools
//!
//! Bridges provider function calling (OpenAI, Anthropic and similar) to the
//! [`ToolRegistry`](crate::ToolRegistry):
//!
//! - **JSON Conversion**: function call arguments to [`ToolArgs`](crate::ToolArgs)
//! - **Tool Execution**: run a batch of calls, one result per call

pub mod converter;
pub mod executor;

pub use converter::json_to_tool_args;
pub use executor::{execute_tool_calls, ToolCallRequest, ToolExecutionResult};
