//! Offline data source backed by a TOML fixture file
//!
//! ```toml
//! list_resources_allowed = true
//!
//! [[companies]]
//! id = 1
//! companyName = "Acme Corp"
//!
//! [[resources]]
//! id = 10
//! firstName = "John"
//! lastName = "Doe"
//!
//! [[fields.Tickets]]
//! name = "status"
//! dataType = "integer"
//! isPickList = true
//! picklistValues = [{ value = "1", label = "New" }]
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{CompanyRecord, DataSource, ResourceRecord, SourceError};
use crate::cache::FieldInfo;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureData {
    #[serde(default = "default_true")]
    list_resources_allowed: bool,
    #[serde(default)]
    companies: Vec<CompanyRecord>,
    #[serde(default)]
    resources: Vec<ResourceRecord>,
    #[serde(default)]
    fields: HashMap<String, Vec<FieldInfo>>,
}

impl Default for FixtureData {
    fn default() -> Self {
        Self {
            list_resources_allowed: true,
            companies: Vec::new(),
            resources: Vec::new(),
            fields: HashMap::new(),
        }
    }
}

/// [`DataSource`] serving records from a fixture instead of a live API
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    data: FixtureData,
}

impl FixtureSource {
    /// Load a fixture from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SourceError::Fixture {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse fixture content directly
    pub fn from_toml_str(content: &str) -> Result<Self, SourceError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, SourceError> {
        let data: FixtureData = toml::from_str(content).map_err(|e| SourceError::Fixture {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        debug!(
            companies = data.companies.len(),
            resources = data.resources.len(),
            entity_types = data.fields.len(),
            "Loaded fixture from {}",
            origin
        );
        Ok(Self { data })
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    async fn list_companies(&self) -> Result<Vec<CompanyRecord>, SourceError> {
        Ok(self.data.companies.clone())
    }

    async fn list_resources(&self) -> Result<Vec<ResourceRecord>, SourceError> {
        if !self.data.list_resources_allowed {
            return Err(SourceError::MethodNotAllowed {
                operation: "list_resources".to_string(),
            });
        }
        Ok(self.data.resources.clone())
    }

    async fn get_resource_by_id(&self, id: i64) -> Result<Option<ResourceRecord>, SourceError> {
        Ok(self.data.resources.iter().find(|r| r.id == id).cloned())
    }

    async fn get_field_info(&self, entity_type: &str) -> Result<Vec<FieldInfo>, SourceError> {
        self.data
            .fields
            .get(entity_type)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                what: format!("entity type {}", entity_type),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FIXTURE: &str = r#"
list_resources_allowed = false

[[companies]]
id = 1
companyName = "Acme Corp"

[[resources]]
id = 10
firstName = "John"
lastName = "Doe"

[[fields.Tickets]]
name = "status"
dataType = "integer"
isPickList = true
picklistValues = [
    { value = "1", label = "New" },
    { value = "5", label = "Complete", isActive = false },
]
"#;

    #[tokio::test]
    async fn test_fixture_serves_records() {
        let source = FixtureSource::from_toml_str(FIXTURE).unwrap();

        let companies = source.list_companies().await.unwrap();
        assert_eq!(companies, vec![CompanyRecord::new(1, "Acme Corp")]);

        let fields = source.get_field_info("Tickets").await.unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields[0].is_pick_list);
        assert_eq!(fields[0].picklist_values.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fixture_can_reject_resource_listing() {
        let source = FixtureSource::from_toml_str(FIXTURE).unwrap();

        let err = source.list_resources().await.unwrap_err();
        assert!(matches!(err, SourceError::MethodNotAllowed { .. }));

        // Single lookups keep working when listing is rejected
        let john = source.get_resource_by_id(10).await.unwrap();
        assert_eq!(john.unwrap().display_name(), "John Doe");
        assert!(source.get_resource_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fixture_unknown_entity_type() {
        let source = FixtureSource::from_toml_str(FIXTURE).unwrap();
        let err = source.get_field_info("Contracts").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[test]
    fn test_fixture_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        assert!(FixtureSource::from_path(file.path()).is_ok());
        assert!(matches!(
            FixtureSource::from_path("/nonexistent/fixture.toml"),
            Err(SourceError::Fixture { .. })
        ));
        assert!(FixtureSource::from_toml_str("companies = 3").is_err());
    }
}
