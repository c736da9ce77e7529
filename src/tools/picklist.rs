//! Picklist and field definition tools

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::cache::PicklistValue;
use crate::context::ToolContext;
use crate::core::{Tool, ToolArgs, ToolError, ToolResult};

/// Well-known ticket picklists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PicklistKind {
    Queues,
    TicketStatuses,
    TicketPriorities,
}

impl PicklistKind {
    fn noun(self) -> &'static str {
        match self {
            PicklistKind::Queues => "queues",
            PicklistKind::TicketStatuses => "ticket statuses",
            PicklistKind::TicketPriorities => "ticket priorities",
        }
    }
}

/// Lists the active values of one ticket picklist
pub struct PicklistTool {
    name: String,
    kind: PicklistKind,
}

impl PicklistTool {
    pub fn new(kind: PicklistKind) -> Self {
        let name = match kind {
            PicklistKind::Queues => "list_queues",
            PicklistKind::TicketStatuses => "list_ticket_statuses",
            PicklistKind::TicketPriorities => "list_ticket_priorities",
        };
        Self {
            name: name.to_string(),
            kind,
        }
    }

    fn summarize(values: &[PicklistValue]) -> Value {
        Value::Array(
            values
                .iter()
                .map(|v| {
                    json!({
                        "id": v.value,
                        "name": v.label,
                        "isActive": v.is_active.unwrap_or(true),
                    })
                })
                .collect(),
        )
    }
}

#[async_trait]
impl Tool for PicklistTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        match self.kind {
            PicklistKind::Queues => {
                "List all available ticket queues. Use this to find queue IDs for filtering tickets by queue."
            }
            PicklistKind::TicketStatuses => {
                "List all available ticket statuses. Use this to find status values for filtering or creating tickets."
            }
            PicklistKind::TicketPriorities => {
                "List all available ticket priorities. Use this to find priority values for filtering or creating tickets."
            }
        }
    }

    fn signature(&self) -> &str {
        match self.kind {
            PicklistKind::Queues => "list_queues",
            PicklistKind::TicketStatuses => "list_ticket_statuses",
            PicklistKind::TicketPriorities => "list_ticket_priorities",
        }
    }

    fn validate_args(&self, _args: &ToolArgs) -> Result<(), ToolError> {
        Ok(())
    }

    async fn execute(&self, _args: &ToolArgs, ctx: &ToolContext) -> Result<ToolResult> {
        let fields = ctx.fields();
        let values = match self.kind {
            PicklistKind::Queues => fields.get_queues().await?,
            PicklistKind::TicketStatuses => fields.get_ticket_statuses().await?,
            PicklistKind::TicketPriorities => fields.get_ticket_priorities().await?,
        };

        Ok(ToolResult::success_with_data(
            format!("Found {} {}", values.len(), self.kind.noun()),
            Self::summarize(&values),
        ))
    }
}

/// Field definitions of an entity type, or one field in full
pub struct GetFieldInfoTool;

impl GetFieldInfoTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GetFieldInfoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetFieldInfoTool {
    fn name(&self) -> &str {
        "get_field_info"
    }

    fn description(&self) -> &str {
        "Get field definitions for an entity type, including picklist values. Useful for discovering valid values for any picklist field."
    }

    fn signature(&self) -> &str {
        "get_field_info <entity_type> [field_name]"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        match args.get_named_or_positional("entity_type", 0) {
            Some(entity_type) if !entity_type.trim().is_empty() => Ok(()),
            _ => Err(ToolError::InvalidArgs {
                message: "Usage: get_field_info <entity_type> [field_name]".to_string(),
            }),
        }
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolResult> {
        let entity_type = args
            .get_named_or_positional("entity_type", 0)
            .map(|s| s.trim())
            .ok_or_else(|| anyhow::anyhow!("entity_type is required"))?;

        if let Some(field_name) = args.get_named_or_positional("field_name", 1) {
            let field = ctx.fields().find_field(entity_type, field_name).await?;
            let result = match field {
                Some(field) => ToolResult::success_with_data(
                    format!("Field info for {}.{}", entity_type, field_name),
                    serde_json::to_value(field)?,
                ),
                None => ToolResult::success_with_data(
                    format!("Field '{}' not found on {}", field_name, entity_type),
                    Value::Null,
                ),
            };
            return Ok(result);
        }

        // Summaries only; full picklist values can be large
        let fields = ctx.fields().get_fields(entity_type).await?;
        let summary: Vec<Value> = fields
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "dataType": f.data_type,
                    "isRequired": f.is_required,
                    "isPickList": f.is_pick_list,
                    "isQueryable": f.is_queryable,
                    "picklistValueCount": f.picklist_values.as_ref().map_or(0, Vec::len),
                })
            })
            .collect();

        Ok(ToolResult::success_with_data(
            format!("Found {} fields for {}", fields.len(), entity_type),
            Value::Array(summary),
        ))
    }

    fn get_parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "entity_type": {
                    "type": "string",
                    "description": "The entity type (e.g., \"Tickets\", \"Companies\", \"Contacts\", \"Projects\")"
                },
                "field_name": {
                    "type": "string",
                    "description": "Optional: filter to a specific field name"
                }
            },
            "required": ["entity_type"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_LABEL_TTL;
    use crate::source::testing::MockSource;
    use std::sync::Arc;

    fn context() -> (Arc<MockSource>, ToolContext) {
        let source = Arc::new(MockSource::new());
        let ctx = ToolContext::isolated(source.clone(), DEFAULT_LABEL_TTL);
        (source, ctx)
    }

    #[tokio::test]
    async fn test_list_ticket_statuses() {
        let (_, ctx) = context();
        let tool = PicklistTool::new(PicklistKind::TicketStatuses);
        assert_eq!(tool.name(), "list_ticket_statuses");

        let result = tool.execute(&ToolArgs::default(), &ctx).await.unwrap();
        assert!(result.success);
        assert_eq!(result.message, "Found 3 ticket statuses");

        let data = result.data.unwrap();
        assert_eq!(data[0], json!({"id": "1", "name": "New", "isActive": true}));
        assert_eq!(data[2]["name"], "Waiting Customer");
    }

    #[tokio::test]
    async fn test_picklist_tools_share_one_fetch() {
        let (source, ctx) = context();
        for kind in [
            PicklistKind::Queues,
            PicklistKind::TicketStatuses,
            PicklistKind::TicketPriorities,
        ] {
            let result = PicklistTool::new(kind)
                .execute(&ToolArgs::default(), &ctx)
                .await
                .unwrap();
            assert!(result.success);
        }
        assert_eq!(source.calls().field_info, 1);
    }

    #[tokio::test]
    async fn test_field_summary() {
        let (_, ctx) = context();
        let tool = GetFieldInfoTool::new();
        let args = ToolArgs::from_args(&["--entity_type=Tickets"]);
        assert!(tool.validate_args(&args).is_ok());

        let result = tool.execute(&args, &ctx).await.unwrap();
        assert_eq!(result.message, "Found 4 fields for Tickets");
        let data = result.data.unwrap();
        assert_eq!(data[1]["name"], "status");
        assert_eq!(data[1]["picklistValueCount"], 4);
        assert_eq!(data[0]["picklistValueCount"], 0);
    }

    #[tokio::test]
    async fn test_single_field_lookup() {
        let (_, ctx) = context();
        let tool = GetFieldInfoTool::new();

        let result = tool
            .execute(&ToolArgs::from_args(&["Tickets", "PRIORITY"]), &ctx)
            .await
            .unwrap();
        assert_eq!(result.message, "Field info for Tickets.PRIORITY");
        assert_eq!(result.data.unwrap()["isPickList"], true);

        let result = tool
            .execute(&ToolArgs::from_args(&["Tickets", "--field_name=nope"]), &ctx)
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.message, "Field 'nope' not found on Tickets");
        assert_eq!(result.data, Some(Value::Null));
    }

    #[tokio::test]
    async fn test_malformed_entity_type_is_an_error() {
        let (source, ctx) = context();
        let tool = GetFieldInfoTool::new();

        let result = tool
            .execute(&ToolArgs::from_args(&["--entity_type=../Tickets"]), &ctx)
            .await;
        assert!(result.is_err());
        assert_eq!(source.calls().field_info, 0);
    }

    #[test]
    fn test_field_info_validation_and_schema() {
        let tool = GetFieldInfoTool::new();
        assert!(tool.validate_args(&ToolArgs::default()).is_err());
        assert!(tool.validate_args(&ToolArgs::from_args(&["--entity_type= "])).is_err());
        assert!(tool.validate_args(&ToolArgs::from_args(&["Tickets"])).is_ok());

        let schema = tool.get_openai_schema();
        assert_eq!(schema["function"]["name"], "get_field_info");
        assert_eq!(schema["function"]["parameters"]["required"][0], "entity_type");
    }
}
