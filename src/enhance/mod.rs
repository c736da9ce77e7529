//! Inline company and resource names into tool payloads
//!
//! Records coming back from the PSA API carry numeric foreign keys. The
//! enhancer looks them up in the [`LabelCache`] and adds readable names next
//! to them:
//!
//! | ID field                | added field  |
//! |-------------------------|--------------|
//! | `companyID`             | `company`    |
//! | `assignedResourceID`    | `assignedTo` |
//! | `projectLeadResourceID` | `lead`       |
//!
//! A name that cannot be resolved is simply left out. Enhancement never fails
//! the response as a whole.

use futures::future::join_all;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::cache::LabelCache;

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("Expected a JSON object, found {kind}")]
    NotAnObject { kind: &'static str },
}

#[derive(Debug, Clone, Copy)]
enum LabelKind {
    Company,
    Resource,
}

struct LabelField {
    id_key: &'static str,
    label_key: &'static str,
    kind: LabelKind,
}

const LABEL_FIELDS: [LabelField; 3] = [
    LabelField {
        id_key: "companyID",
        label_key: "company",
        kind: LabelKind::Company,
    },
    LabelField {
        id_key: "assignedResourceID",
        label_key: "assignedTo",
        kind: LabelKind::Resource,
    },
    LabelField {
        id_key: "projectLeadResourceID",
        label_key: "lead",
        kind: LabelKind::Resource,
    },
];

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Numeric ID of a record field. Whole-number floats such as `1.0` count.
fn label_id(record: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = record.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn has_label_ids(record: &Map<String, Value>) -> bool {
    LABEL_FIELDS
        .iter()
        .any(|field| label_id(record, field.id_key).is_some())
}

pub struct ResponseEnhancer<'a> {
    labels: &'a LabelCache,
}

impl<'a> ResponseEnhancer<'a> {
    pub fn new(labels: &'a LabelCache) -> Self {
        Self { labels }
    }

    /// Whether any record in the payload carries an ID worth resolving
    pub fn needs_labels(payload: &Value) -> bool {
        match payload {
            Value::Array(items) => items
                .iter()
                .any(|item| item.as_object().map_or(false, has_label_ids)),
            Value::Object(map) => {
                has_label_ids(map)
                    || ["items", "data"]
                        .iter()
                        .filter_map(|key| map.get(*key))
                        .any(Self::needs_labels)
            }
            _ => false,
        }
    }

    /// Enhance a payload in any of the shapes tools produce:
    /// `{summary, items: [..]}`, `{message, data: [..]}`,
    /// `{message, data: {..}}`, a bare array, or a single record.
    pub async fn enhance(&self, payload: Value) -> Value {
        match payload {
            Value::Array(items) => Value::Array(self.enhance_items(items).await),
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = map.get_mut("items") {
                    let taken = std::mem::take(items);
                    *items = self.enhance_items(taken).await;
                    return Value::Object(map);
                }

                match map.get_mut("data") {
                    Some(Value::Array(items)) => {
                        let taken = std::mem::take(items);
                        *items = self.enhance_items(taken).await;
                        Value::Object(map)
                    }
                    Some(data) if data.is_object() => {
                        let original = data.take();
                        *data = match self.enhance_item(original.clone()).await {
                            Ok(enhanced) => enhanced,
                            Err(_) => original,
                        };
                        Value::Object(map)
                    }
                    Some(_) => Value::Object(map),
                    None => match self.enhance_item(Value::Object(map.clone())).await {
                        Ok(enhanced) => enhanced,
                        Err(_) => Value::Object(map),
                    },
                }
            }
            other => other,
        }
    }

    /// Enhance all records concurrently, keeping their order. Records that
    /// fail are dropped, the rest go on.
    pub async fn enhance_items(&self, items: Vec<Value>) -> Vec<Value> {
        let results = join_all(items.into_iter().map(|item| self.enhance_item(item))).await;
        results
            .into_iter()
            .enumerate()
            .filter_map(|(index, result)| match result {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!(index, error = %e, "Dropping record that could not be enhanced");
                    None
                }
            })
            .collect()
    }

    /// Add resolved names to a single record
    pub async fn enhance_item(&self, item: Value) -> Result<Value, EnhanceError> {
        let mut record = match item {
            Value::Object(record) => record,
            other => {
                return Err(EnhanceError::NotAnObject {
                    kind: json_kind(&other),
                })
            }
        };

        for field in &LABEL_FIELDS {
            let Some(id) = label_id(&record, field.id_key) else {
                continue;
            };
            let label = match field.kind {
                LabelKind::Company => self.labels.get_company_name(id).await,
                LabelKind::Resource => self.labels.get_resource_name(id).await,
            };
            if let Some(label) = label {
                record.insert(field.label_key.to_string(), Value::String(label));
            }
        }

        Ok(Value::Object(record))
    }
}
