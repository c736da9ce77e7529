//! Shared context handed to every tool invocation
//!
//! Holds the data source and both caches. The label cache is obtained on
//! first use so tools that never touch company/resource names do not pay
//! for the bulk preload.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::cache::{FieldCache, LabelCache};
use crate::enhance::ResponseEnhancer;
use crate::source::DataSource;

/// Where the label cache comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelScope {
    /// The process-wide instance from [`LabelCache::get_instance`]
    Shared,
    /// A cache owned by this context alone
    Isolated,
}

pub struct ToolContext {
    source: Arc<dyn DataSource>,
    fields: FieldCache,
    labels: OnceCell<Arc<LabelCache>>,
    label_ttl: Duration,
    scope: LabelScope,
}

impl ToolContext {
    /// Context backed by the process-wide label cache.
    ///
    /// Field metadata is cached per context, not per process. Embedders that
    /// want one field cache for the whole process should share a single
    /// context, as the binary does.
    pub fn new(source: Arc<dyn DataSource>, label_ttl: Duration) -> Self {
        Self::with_scope(source, label_ttl, LabelScope::Shared)
    }

    /// Context with its own label cache
    pub fn isolated(source: Arc<dyn DataSource>, label_ttl: Duration) -> Self {
        Self::with_scope(source, label_ttl, LabelScope::Isolated)
    }

    fn with_scope(source: Arc<dyn DataSource>, label_ttl: Duration, scope: LabelScope) -> Self {
        Self {
            fields: FieldCache::new(Arc::clone(&source)),
            source,
            labels: OnceCell::new(),
            label_ttl,
            scope,
        }
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn fields(&self) -> &FieldCache {
        &self.fields
    }

    pub fn scope(&self) -> LabelScope {
        self.scope
    }

    /// The label cache, preloaded
    pub async fn labels(&self) -> Arc<LabelCache> {
        let labels = self
            .labels
            .get_or_init(|| async {
                match self.scope {
                    LabelScope::Shared => {
                        LabelCache::get_instance(Arc::clone(&self.source), self.label_ttl).await
                    }
                    LabelScope::Isolated => {
                        let cache = Arc::new(LabelCache::new(
                            Arc::clone(&self.source),
                            self.label_ttl,
                        ));
                        cache.ensure_loaded().await;
                        cache
                    }
                }
            })
            .await;
        Arc::clone(labels)
    }

    /// The label cache if something already asked for it
    pub fn loaded_labels(&self) -> Option<Arc<LabelCache>> {
        self.labels.get().cloned()
    }

    /// Inline company/resource names into a tool payload
    pub async fn enhance(&self, payload: Value) -> Value {
        if !ResponseEnhancer::needs_labels(&payload) {
            return payload;
        }
        let labels = self.labels().await;
        ResponseEnhancer::new(&labels).enhance(payload).await
    }
}
