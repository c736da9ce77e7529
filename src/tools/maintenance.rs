//! Cache diagnostics and invalidation tools

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::ToolContext;
use crate::core::{Tool, ToolArgs, ToolError, ToolResult};

/// Reports what both caches currently hold
pub struct CacheStatsTool;

impl CacheStatsTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CacheStatsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CacheStatsTool {
    fn name(&self) -> &str {
        "cache_stats"
    }

    fn description(&self) -> &str {
        "Show label and field cache statistics without triggering any loads"
    }

    fn signature(&self) -> &str {
        "cache_stats"
    }

    fn validate_args(&self, _args: &ToolArgs) -> Result<(), ToolError> {
        Ok(())
    }

    async fn execute(&self, _args: &ToolArgs, ctx: &ToolContext) -> Result<ToolResult> {
        let labels = ctx.loaded_labels().map(|cache| cache.get_cache_stats());
        let fields = ctx.fields().stats();

        let message = match &labels {
            Some(stats) => format!(
                "Label cache: {} companies, {} resources; field cache: {} entity types",
                stats.companies.count,
                stats.resources.count,
                fields.cached.len()
            ),
            None => format!(
                "Label cache: not loaded; field cache: {} entity types",
                fields.cached.len()
            ),
        };

        Ok(ToolResult::success_with_data(
            message,
            json!({
                "labels": labels,
                "fields": fields,
            }),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClearScope {
    Labels,
    Fields,
    All,
}

impl ClearScope {
    fn parse(raw: Option<&String>) -> Result<Self, ToolError> {
        match raw.map(|s| s.as_str()) {
            None | Some("all") => Ok(ClearScope::All),
            Some("labels") => Ok(ClearScope::Labels),
            Some("fields") => Ok(ClearScope::Fields),
            Some(other) => Err(ToolError::InvalidArgs {
                message: format!(
                    "Invalid scope: {}. Valid scopes: labels, fields, all",
                    other
                ),
            }),
        }
    }
}

/// Invalidates cached labels and/or field definitions
pub struct ClearCacheTool;

impl ClearCacheTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClearCacheTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ClearCacheTool {
    fn name(&self) -> &str {
        "clear_cache"
    }

    fn description(&self) -> &str {
        "Clear cached company/resource names and/or field definitions so they are reloaded on next use"
    }

    fn signature(&self) -> &str {
        "clear_cache [--scope=labels|fields|all] [--entity_type=<type>]"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        let scope = ClearScope::parse(args.get_named_arg("scope"))?;
        if scope == ClearScope::Labels && args.get_named_arg("entity_type").is_some() {
            return Err(ToolError::InvalidArgs {
                message: "entity_type only applies to the fields scope".to_string(),
            });
        }
        Ok(())
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolResult> {
        let scope = ClearScope::parse(args.get_named_arg("scope"))?;
        let entity_type = args.get_named_arg("entity_type").map(|s| s.as_str());
        let mut cleared = Vec::new();

        if matches!(scope, ClearScope::Labels | ClearScope::All) {
            if let Some(labels) = ctx.loaded_labels() {
                labels.clear_cache();
            }
            cleared.push("labels".to_string());
        }
        if matches!(scope, ClearScope::Fields | ClearScope::All) {
            ctx.fields().clear_cache(entity_type);
            cleared.push(match entity_type {
                Some(entity_type) => format!("fields for {}", entity_type),
                None => "fields".to_string(),
            });
        }

        Ok(ToolResult::success_with_data(
            format!("Cleared {}", cleared.join(" and ")),
            json!({ "cleared": cleared }),
        ))
    }

    fn get_parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "scope": {
                    "type": "string",
                    "enum": ["labels", "fields", "all"],
                    "description": "Which cache to clear (default: all)"
                },
                "entity_type": {
                    "type": "string",
                    "description": "Only clear field definitions for this entity type"
                }
            },
            "required": []
        })
    }
}

/// Reloads label segments older than the configured TTL
pub struct RefreshLabelsTool;

impl RefreshLabelsTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RefreshLabelsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for RefreshLabelsTool {
    fn name(&self) -> &str {
        "refresh_labels"
    }

    fn description(&self) -> &str {
        "Reload company/resource names if the cached lists are older than the configured TTL"
    }

    fn signature(&self) -> &str {
        "refresh_labels"
    }

    fn validate_args(&self, _args: &ToolArgs) -> Result<(), ToolError> {
        Ok(())
    }

    async fn execute(&self, _args: &ToolArgs, ctx: &ToolContext) -> Result<ToolResult> {
        let labels = ctx.labels().await;
        let refreshed = labels.refresh_stale().await;
        let message = if refreshed {
            "Reloaded stale label lists"
        } else {
            "Label lists are fresh, nothing reloaded"
        };

        Ok(ToolResult::success_with_data(
            message,
            json!({
                "refreshed": refreshed,
                "stats": labels.get_cache_stats(),
            }),
        ))
    }
}
