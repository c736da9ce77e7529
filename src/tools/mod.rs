//! Tools exposed to the agent
//!
//! - **Picklists**: queues, ticket statuses, ticket priorities, field info
//! - **Names**: company/resource ID resolution
//! - **Maintenance**: cache statistics, invalidation and refresh

mod maintenance;
mod names;
mod picklist;

pub use maintenance::{CacheStatsTool, ClearCacheTool, RefreshLabelsTool};
pub use names::ResolveNamesTool;
pub use picklist::{GetFieldInfoTool, PicklistKind, PicklistTool};
