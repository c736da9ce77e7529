//! Company/resource name resolution tool

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::context::ToolContext;
use crate::core::{Tool, ToolArgs, ToolError, ToolResult};

pub struct ResolveNamesTool;

impl ResolveNamesTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResolveNamesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ResolveNamesTool {
    fn name(&self) -> &str {
        "resolve_names"
    }

    fn description(&self) -> &str {
        "Resolve company and resource (user) IDs to human-readable names. Unknown IDs resolve to null."
    }

    fn signature(&self) -> &str {
        "resolve_names [--company_id=<id>] [--resource_id=<id>]"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        let company = args.get_id_arg("company_id")?;
        let resource = args.get_id_arg("resource_id")?;
        if company.is_none() && resource.is_none() {
            return Err(ToolError::InvalidArgs {
                message: "resolve_names requires company_id and/or resource_id".to_string(),
            });
        }
        Ok(())
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolResult> {
        let labels = ctx.labels().await;
        let mut data = Map::new();
        let mut resolved = 0;

        if let Some(id) = args.get_id_arg("company_id")? {
            let name = labels.get_company_name(id).await;
            resolved += usize::from(name.is_some());
            data.insert("company".to_string(), json!({"id": id, "name": name}));
        }
        if let Some(id) = args.get_id_arg("resource_id")? {
            let name = labels.get_resource_name(id).await;
            resolved += usize::from(name.is_some());
            data.insert("resource".to_string(), json!({"id": id, "name": name}));
        }

        Ok(ToolResult::success_with_data(
            format!("Resolved {} of {} IDs", resolved, data.len()),
            Value::Object(data),
        ))
    }

    fn get_parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "company_id": {
                    "type": "integer",
                    "description": "Company ID to resolve"
                },
                "resource_id": {
                    "type": "integer",
                    "description": "Resource (user) ID to resolve"
                }
            },
            "required": []
        })
    }
}
