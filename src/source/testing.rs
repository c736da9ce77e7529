//! Counting mock data source shared by unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use super::{CompanyRecord, DataSource, ResourceRecord, SourceError};
use crate::cache::{FieldInfo, PicklistValue};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub list_companies: usize,
    pub list_resources: usize,
    pub get_resource: usize,
    pub field_info: usize,
}

pub struct MockSource {
    companies: Result<Vec<CompanyRecord>, SourceError>,
    resources: Result<Vec<ResourceRecord>, SourceError>,
    lookup: HashMap<i64, ResourceRecord>,
    lookup_error: Option<SourceError>,
    fields: HashMap<String, Result<Vec<FieldInfo>, SourceError>>,
    delay: Duration,
    gate: Option<Arc<Notify>>,
    list_companies_calls: AtomicUsize,
    list_resources_calls: AtomicUsize,
    get_resource_calls: AtomicUsize,
    field_info_calls: AtomicUsize,
}

impl MockSource {
    /// Two companies, two resources, ticket field definitions
    pub fn new() -> Self {
        let mut fields = HashMap::new();
        fields.insert("Tickets".to_string(), Ok(ticket_fields()));
        Self {
            companies: Ok(vec![
                CompanyRecord::new(1, "Acme Corp"),
                CompanyRecord::new(2, "Widget Inc"),
            ]),
            resources: Ok(vec![
                ResourceRecord::new(10, "John", "Doe"),
                ResourceRecord::new(20, "Jane", "Smith"),
            ]),
            lookup: HashMap::new(),
            lookup_error: None,
            fields,
            delay: Duration::ZERO,
            gate: None,
            list_companies_calls: AtomicUsize::new(0),
            list_resources_calls: AtomicUsize::new(0),
            get_resource_calls: AtomicUsize::new(0),
            field_info_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_companies(mut self, companies: Result<Vec<CompanyRecord>, SourceError>) -> Self {
        self.companies = companies;
        self
    }

    pub fn with_resources(mut self, resources: Result<Vec<ResourceRecord>, SourceError>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_lookup(mut self, resource: ResourceRecord) -> Self {
        self.lookup.insert(resource.id, resource);
        self
    }

    pub fn with_lookup_error(mut self, error: SourceError) -> Self {
        self.lookup_error = Some(error);
        self
    }

    pub fn with_fields(
        mut self,
        entity_type: &str,
        fields: Result<Vec<FieldInfo>, SourceError>,
    ) -> Self {
        self.fields.insert(entity_type.to_string(), fields);
        self
    }

    /// Every call sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every call waits for the gate to be notified before answering
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            list_companies: self.list_companies_calls.load(Ordering::SeqCst),
            list_resources: self.list_resources_calls.load(Ordering::SeqCst),
            get_resource: self.get_resource_calls.load(Ordering::SeqCst),
            field_info: self.field_info_calls.load(Ordering::SeqCst),
        }
    }

    async fn pause(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl DataSource for MockSource {
    async fn list_companies(&self) -> Result<Vec<CompanyRecord>, SourceError> {
        self.list_companies_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.companies.clone()
    }

    async fn list_resources(&self) -> Result<Vec<ResourceRecord>, SourceError> {
        self.list_resources_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.resources.clone()
    }

    async fn get_resource_by_id(&self, id: i64) -> Result<Option<ResourceRecord>, SourceError> {
        self.get_resource_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(err) = &self.lookup_error {
            return Err(err.clone());
        }
        Ok(self.lookup.get(&id).cloned())
    }

    async fn get_field_info(&self, entity_type: &str) -> Result<Vec<FieldInfo>, SourceError> {
        self.field_info_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.fields
            .get(entity_type)
            .cloned()
            .unwrap_or_else(|| {
                Err(SourceError::NotFound {
                    what: entity_type.to_string(),
                })
            })
    }
}

pub fn picklist_value(value: &str, label: &str, is_active: Option<bool>) -> PicklistValue {
    PicklistValue {
        value: value.to_string(),
        label: label.to_string(),
        is_active,
        ..Default::default()
    }
}

pub fn picklist_field(name: &str, values: Vec<PicklistValue>) -> FieldInfo {
    FieldInfo {
        name: name.to_string(),
        data_type: "integer".to_string(),
        is_queryable: true,
        is_pick_list: true,
        picklist_values: Some(values),
        ..Default::default()
    }
}

/// Ticket fields with status, priority and queue picklists
pub fn ticket_fields() -> Vec<FieldInfo> {
    vec![
        FieldInfo {
            name: "title".to_string(),
            data_type: "string".to_string(),
            length: Some(255),
            is_required: true,
            is_queryable: true,
            ..Default::default()
        },
        picklist_field(
            "status",
            vec![
                picklist_value("1", "New", Some(true)),
                picklist_value("5", "Complete", Some(true)),
                picklist_value("7", "Waiting Customer", None),
                picklist_value("9", "Retired", Some(false)),
            ],
        ),
        picklist_field(
            "priority",
            vec![
                picklist_value("1", "High", Some(true)),
                picklist_value("2", "Medium", Some(true)),
                picklist_value("3", "Low", Some(true)),
            ],
        ),
        picklist_field(
            "queueID",
            vec![
                picklist_value("29683", "Service Desk", Some(true)),
                picklist_value("29684", "Escalations", Some(false)),
            ],
        ),
    ]
}
