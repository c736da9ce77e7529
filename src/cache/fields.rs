//! Field definition cache
//!
//! Field lists are fetched per entity type the first time someone asks for
//! them and kept until invalidated. Concurrent requests for the same entity
//! type share one fetch.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::OnceCell;
use tracing::{debug, error};

use super::{lock, CacheError};
use crate::source::DataSource;

pub const TICKETS_ENTITY: &str = "Tickets";
pub const QUEUE_FIELD: &str = "queueID";
pub const STATUS_FIELD: &str = "status";
pub const PRIORITY_FIELD: &str = "priority";

/// One entry of a picklist field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PicklistValue {
    pub value: String,
    pub label: String,
    pub is_default_value: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub is_system: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_value: Option<String>,
}

/// Definition of a single entity field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldInfo {
    pub name: String,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    pub is_required: bool,
    pub is_read_only: bool,
    pub is_queryable: bool,
    pub is_reference: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_entity_type: Option<String>,
    pub is_pick_list: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picklist_values: Option<Vec<PicklistValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picklist_parent_value_field: Option<String>,
}

/// Snapshot of what the field cache holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldCacheStats {
    /// Entity type -> number of cached fields
    pub cached: BTreeMap<String, usize>,
    /// Entity types with a load in flight
    pub loading: usize,
}

type FieldList = Arc<Vec<FieldInfo>>;

fn entity_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("entity type pattern"))
}

/// Lazily loaded field definitions, keyed by entity type (case-sensitive)
pub struct FieldCache {
    source: Arc<dyn DataSource>,
    entries: Mutex<HashMap<String, Arc<OnceCell<FieldList>>>>,
}

impl FieldCache {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Field definitions for an entity type.
    ///
    /// A failed fetch is cached as an empty list. Only a malformed entity
    /// type name is reported as an error.
    pub async fn get_fields(&self, entity_type: &str) -> Result<FieldList, CacheError> {
        if !entity_type_pattern().is_match(entity_type) {
            return Err(CacheError::InvalidEntityType {
                entity_type: entity_type.to_string(),
            });
        }

        let cell = {
            let mut entries = lock(&self.entries);
            Arc::clone(entries.entry(entity_type.to_string()).or_default())
        };
        let fields = cell.get_or_init(|| self.load_fields(entity_type)).await;
        Ok(Arc::clone(fields))
    }

    /// A single field, matched case-insensitively by name
    pub async fn find_field(
        &self,
        entity_type: &str,
        field_name: &str,
    ) -> Result<Option<FieldInfo>, CacheError> {
        let fields = self.get_fields(entity_type).await?;
        Ok(fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field_name))
            .cloned())
    }

    /// Active picklist values of a field. Empty when the field does not
    /// exist or is not a picklist.
    pub async fn get_picklist_values(
        &self,
        entity_type: &str,
        field_name: &str,
    ) -> Result<Vec<PicklistValue>, CacheError> {
        let values = self
            .find_field(entity_type, field_name)
            .await?
            .filter(|f| f.is_pick_list)
            .and_then(|f| f.picklist_values)
            .map(|values| {
                values
                    .into_iter()
                    .filter(|v| v.is_active != Some(false))
                    .collect()
            })
            .unwrap_or_default();
        Ok(values)
    }

    pub async fn get_queues(&self) -> Result<Vec<PicklistValue>, CacheError> {
        self.get_picklist_values(TICKETS_ENTITY, QUEUE_FIELD).await
    }

    pub async fn get_ticket_statuses(&self) -> Result<Vec<PicklistValue>, CacheError> {
        self.get_picklist_values(TICKETS_ENTITY, STATUS_FIELD).await
    }

    pub async fn get_ticket_priorities(&self) -> Result<Vec<PicklistValue>, CacheError> {
        self.get_picklist_values(TICKETS_ENTITY, PRIORITY_FIELD).await
    }

    /// Drop one entity type, or everything when `entity_type` is `None`.
    /// Callers already waiting on an in-flight load still get its result.
    pub fn clear_cache(&self, entity_type: Option<&str>) {
        let mut entries = lock(&self.entries);
        match entity_type {
            Some(entity_type) => {
                entries.remove(entity_type);
            }
            None => entries.clear(),
        }
    }

    pub fn stats(&self) -> FieldCacheStats {
        let entries = lock(&self.entries);
        let mut stats = FieldCacheStats::default();
        for (entity_type, cell) in entries.iter() {
            match cell.get() {
                Some(fields) => {
                    stats.cached.insert(entity_type.clone(), fields.len());
                }
                None => stats.loading += 1,
            }
        }
        stats
    }

    async fn load_fields(&self, entity_type: &str) -> FieldList {
        debug!("Loading field info for entity: {}", entity_type);
        match self.source.get_field_info(entity_type).await {
            Ok(fields) => {
                debug!("Loaded {} fields for {}", fields.len(), entity_type);
                Arc::new(fields)
            }
            Err(e) => {
                error!("Failed to load field info for {}: {}", entity_type, e);
                Arc::new(Vec::new())
            }
        }
    }
}
