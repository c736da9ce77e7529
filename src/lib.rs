//! # PSA Tools
//!
//! Agent-facing tools for a PSA (professional services automation) API,
//! built around two caches that turn numeric IDs into readable labels.
//!
//! ## Features
//!
//! - **Label Cache**: process-wide, bulk-preloaded company and resource names
//!   with single-flight loading and a per-ID resource fallback
//! - **Field Cache**: lazily fetched field definitions per entity type,
//!   with picklist accessors for queues, statuses and priorities
//! - **Response Enhancement**: inline `company`, `assignedTo` and `lead`
//!   names into tool results
//! - **LLM Integration**: run provider function calls against the registry
//!
//! ## Usage
//!
//! ```rust,no_run
//! use psa_tools::{create_tool_registry, FixtureSource, ToolArgs, ToolContext};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let source = Arc::new(FixtureSource::from_path("fixtures/demo.toml")?);
//! let ctx = ToolContext::new(source, Duration::from_secs(1800));
//! let registry = create_tool_registry(Arc::new(ctx));
//! let result = registry
//!     .execute_tool("list_ticket_statuses", &ToolArgs::default())
//!     .await?;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod core;
pub mod enhance;
pub mod llm;
pub mod logging;
pub mod source;
pub mod tools;

use std::sync::Arc;

// Re-export main types
pub use crate::cache::{
    FieldCache, FieldCacheStats, FieldInfo, LabelCache, LabelCacheStats, PicklistValue,
    DEFAULT_LABEL_TTL,
};
pub use crate::config::AppConfig;
pub use crate::context::{LabelScope, ToolContext};
pub use crate::core::{Tool, ToolArgs, ToolError, ToolRegistry, ToolResult};
pub use crate::enhance::ResponseEnhancer;
pub use crate::source::{CompanyRecord, DataSource, FixtureSource, ResourceRecord, SourceError};
pub use crate::tools::{
    CacheStatsTool, ClearCacheTool, GetFieldInfoTool, PicklistKind, PicklistTool,
    RefreshLabelsTool, ResolveNamesTool,
};

/// Initialize the tool registry with all available tools
pub fn create_tool_registry(context: Arc<ToolContext>) -> ToolRegistry {
    let mut registry = ToolRegistry::new(context);

    // Picklists
    registry.register(Box::new(PicklistTool::new(PicklistKind::Queues)));
    registry.register(Box::new(PicklistTool::new(PicklistKind::TicketStatuses)));
    registry.register(Box::new(PicklistTool::new(PicklistKind::TicketPriorities)));
    registry.register(Box::new(GetFieldInfoTool::new()));

    // Names
    registry.register(Box::new(ResolveNamesTool::new()));

    // Cache maintenance
    registry.register(Box::new(CacheStatsTool::new()));
    registry.register(Box::new(ClearCacheTool::new()));
    registry.register(Box::new(RefreshLabelsTool::new()));

    registry
}
