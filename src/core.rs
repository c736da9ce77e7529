//! Core traits and types for the PSA tools system

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::cache::CacheError;
use crate::context::ToolContext;

/// Error types for tool operations
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },
    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },
    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arguments passed to tool execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolArgs {
    pub args: Vec<String>,
    pub named_args: HashMap<String, String>,
}

impl ToolArgs {
    /// Create ToolArgs from command line arguments
    pub fn from_args(args: &[&str]) -> Self {
        let mut positional = Vec::new();
        let mut named = HashMap::new();

        for &arg in args {
            if let Some(flag) = arg.strip_prefix("--") {
                if let Some((key, value)) = flag.split_once('=') {
                    named.insert(key.to_string(), value.to_string());
                } else {
                    // Bare flag
                    named.insert(flag.to_string(), "true".to_string());
                }
            } else {
                positional.push(arg.to_string());
            }
        }

        Self {
            args: positional,
            named_args: named,
        }
    }

    /// Create ToolArgs with named arguments
    pub fn with_named_args(args: Vec<String>, named_args: HashMap<String, String>) -> Self {
        Self { args, named_args }
    }

    /// Get positional argument by index
    pub fn get_arg(&self, index: usize) -> Option<&String> {
        self.args.get(index)
    }

    /// Get named argument
    pub fn get_named_arg(&self, name: &str) -> Option<&String> {
        self.named_args.get(name)
    }

    /// Named argument, falling back to a positional slot
    pub fn get_named_or_positional(&self, name: &str, index: usize) -> Option<&String> {
        self.get_named_arg(name).or_else(|| self.get_arg(index))
    }

    /// Parse a named argument as a numeric record ID
    pub fn get_id_arg(&self, name: &str) -> Result<Option<i64>, ToolError> {
        match self.get_named_arg(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ToolError::InvalidArgs {
                    message: format!("{} must be a numeric ID, got {:?}", name, raw),
                }),
        }
    }

    /// Get argument count
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Check if arguments are empty
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.named_args.is_empty()
    }
}

/// Result returned by tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// Create successful result
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// Create successful result with data
    pub fn success_with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Main trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Get the tool usage/signature
    fn signature(&self) -> &str;

    /// Validate arguments before execution
    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError>;

    /// Execute the tool with given arguments
    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolResult>;

    /// Get OpenAI function schema for this tool
    fn get_openai_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": self.get_parameters_schema()
            }
        })
    }

    /// Get parameters schema - should be overridden by implementing tools
    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }
}

/// Registry for managing available tools
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    context: Arc<ToolContext>,
    enhance_responses: bool,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self {
            tools: HashMap::new(),
            context,
            enhance_responses: true,
        }
    }

    /// Toggle inlining of company/resource names into tool data
    pub fn set_enhance_responses(&mut self, enabled: bool) {
        self.enhance_responses = enabled;
    }

    /// Register a tool
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Execute a tool by name
    pub async fn execute_tool(&self, name: &str, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::ToolNotFound {
            name: name.to_string(),
        })?;

        // Validate arguments
        tool.validate_args(args)?;

        let mut result = tool
            .execute(args, &self.context)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                message: e.to_string(),
            })?;

        if self.enhance_responses && result.success {
            if let Some(data) = result.data.take() {
                result.data = Some(self.context.enhance(data).await);
            }
        }

        debug!("Successfully executed tool: {}", name);
        Ok(result)
    }

    /// List all registered tool names
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get OpenAI function schemas for all tools
    pub fn get_all_schemas(&self) -> Vec<serde_json::Value> {
        self.list_tools()
            .iter()
            .filter_map(|name| self.get_tool(name))
            .map(|tool| tool.get_openai_schema())
            .collect()
    }

    /// Get the shared tool context
    pub fn context(&self) -> Arc<ToolContext> {
        Arc::clone(&self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MockSource;
    use serde_json::json;

    // Mock tool returning canned ticket records
    struct MockTool {
        name: String,
        data: serde_json::Value,
    }

    impl MockTool {
        fn new(name: &str, data: serde_json::Value) -> Self {
            Self {
                name: name.to_string(),
                data,
            }
        }
    }

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "Mock tool for testing"
        }

        fn signature(&self) -> &str {
            "mock_tool <arg>"
        }

        fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
            if args.is_empty() {
                return Err(ToolError::InvalidArgs {
                    message: "Mock tool requires at least one argument".to_string(),
                });
            }
            Ok(())
        }

        async fn execute(&self, args: &ToolArgs, _ctx: &ToolContext) -> Result<ToolResult> {
            if args.get_arg(0).map(String::as_str) == Some("fail") {
                anyhow::bail!("upstream rejected the request");
            }
            Ok(ToolResult::success_with_data(
                format!("Mock tool {} executed with {} args", self.name, args.len()),
                self.data.clone(),
            ))
        }
    }

    fn registry_with(source: &Arc<MockSource>) -> ToolRegistry {
        ToolRegistry::new(Arc::new(ToolContext::isolated(
            source.clone(),
            crate::cache::DEFAULT_LABEL_TTL,
        )))
    }

    #[test]
    fn test_tool_args_creation() {
        let args = ToolArgs::from_args(&["arg1", "--entity_type=Tickets", "arg2", "--verbose"]);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get_arg(0), Some(&"arg1".to_string()));
        assert_eq!(args.get_arg(1), Some(&"arg2".to_string()));
        assert_eq!(args.get_named_arg("entity_type").map(String::as_str), Some("Tickets"));
        assert_eq!(args.get_named_arg("verbose").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_id_args() {
        let args = ToolArgs::from_args(&["--company_id=42", "--resource_id=abc"]);
        assert_eq!(args.get_id_arg("company_id").unwrap(), Some(42));
        assert_eq!(args.get_id_arg("missing").unwrap(), None);
        assert!(matches!(
            args.get_id_arg("resource_id"),
            Err(ToolError::InvalidArgs { .. })
        ));
    }

    #[test]
    fn test_tool_result_creation() {
        let result = ToolResult::success("Test message");
        assert!(result.success);
        assert_eq!(result.message, "Test message");
        assert!(result.data.is_none());

        let error_result = ToolResult::error("Error message");
        assert!(!error_result.success);
        assert_eq!(error_result.message, "Error message");
    }

    #[tokio::test]
    async fn test_tool_registry() {
        let source = Arc::new(MockSource::new());
        let mut registry = registry_with(&source);
        registry.register(Box::new(MockTool::new("test_tool", json!([]))));

        assert_eq!(registry.list_tools(), vec!["test_tool".to_string()]);

        let args = ToolArgs::from_args(&["test_arg"]);
        let result = registry.execute_tool("test_tool", &args).await;
        assert!(result.unwrap().success);

        let result = registry.execute_tool("nonexistent", &args).await;
        assert!(matches!(result, Err(ToolError::ToolNotFound { .. })));
    }

    #[tokio::test]
    async fn test_tool_validation_and_failure() {
        let source = Arc::new(MockSource::new());
        let mut registry = registry_with(&source);
        registry.register(Box::new(MockTool::new("test_tool", json!([]))));

        let empty_args = ToolArgs::from_args(&[]);
        let result = registry.execute_tool("test_tool", &empty_args).await;
        assert!(matches!(result, Err(ToolError::InvalidArgs { .. })));

        let result = registry
            .execute_tool("test_tool", &ToolArgs::from_args(&["fail"]))
            .await;
        match result {
            Err(ToolError::ExecutionFailed { message }) => {
                assert!(message.contains("upstream rejected"))
            }
            other => panic!("expected execution failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_registry_inlines_names() {
        let source = Arc::new(MockSource::new());
        let mut registry = registry_with(&source);
        registry.register(Box::new(MockTool::new(
            "search_tickets",
            json!([
                {"id": 500, "title": "Printer down", "companyID": 1, "assignedResourceID": 10},
                {"id": 501, "title": "VPN", "companyID": 999}
            ]),
        )));

        let result = registry
            .execute_tool("search_tickets", &ToolArgs::from_args(&["x"]))
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data[0]["company"], "Acme Corp");
        assert_eq!(data[0]["assignedTo"], "John Doe");
        assert!(data[1].get("company").is_none());
    }

    #[tokio::test]
    async fn test_registry_skips_label_preload_without_ids() {
        let source = Arc::new(MockSource::new());
        let mut registry = registry_with(&source);
        registry.register(Box::new(MockTool::new("plain", json!([{"id": "1", "name": "New"}]))));

        registry
            .execute_tool("plain", &ToolArgs::from_args(&["x"]))
            .await
            .unwrap();
        assert_eq!(source.calls().list_companies, 0);
        assert!(registry.context().loaded_labels().is_none());
    }

    #[tokio::test]
    async fn test_enhancement_can_be_disabled() {
        let source = Arc::new(MockSource::new());
        let mut registry = registry_with(&source);
        registry.set_enhance_responses(false);
        registry.register(Box::new(MockTool::new("t", json!({"companyID": 1}))));

        let result = registry
            .execute_tool("t", &ToolArgs::from_args(&["x"]))
            .await
            .unwrap();
        assert_eq!(result.data.unwrap(), json!({"companyID": 1}));
        assert_eq!(source.calls().list_companies, 0);
    }
}
