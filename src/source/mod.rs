//! Data source adapter contract
//!
//! The caches never talk to the PSA API directly. They go through a
//! [`DataSource`], which hands back whole record lists, single records, or
//! field definitions. Every call is independently fallible.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::FieldInfo;

mod fixture;
#[cfg(test)]
pub(crate) mod testing;

pub use fixture::FixtureSource;

/// Errors raised by a data source
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Method not allowed: {operation}")]
    MethodNotAllowed { operation: String },
    #[error("Request failed: {message}")]
    Request { message: String },
    #[error("Not found: {what}")]
    NotFound { what: String },
    #[error("Fixture error in {path}: {message}")]
    Fixture { path: String, message: String },
}

impl SourceError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }
}

/// A company as returned by the company listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: i64,
    pub company_name: String,
}

impl CompanyRecord {
    pub fn new(id: i64, company_name: impl Into<String>) -> Self {
        Self {
            id,
            company_name: company_name.into(),
        }
    }
}

/// A resource (user) as returned by the resource listing or lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl ResourceRecord {
    pub fn new(id: i64, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Label shown in place of the resource ID
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fetch capabilities the caches depend on
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Every company visible to the integration
    async fn list_companies(&self) -> Result<Vec<CompanyRecord>, SourceError>;

    /// Every resource visible to the integration. Some tenants reject this
    /// request outright with [`SourceError::MethodNotAllowed`].
    async fn list_resources(&self) -> Result<Vec<ResourceRecord>, SourceError>;

    /// A single resource, `None` if the ID does not exist
    async fn get_resource_by_id(&self, id: i64) -> Result<Option<ResourceRecord>, SourceError>;

    /// Field definitions (including picklist values) for an entity type
    async fn get_field_info(&self, entity_type: &str) -> Result<Vec<FieldInfo>, SourceError>;
}
