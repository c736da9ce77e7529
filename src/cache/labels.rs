//! Company and resource name cache
//!
//! The whole company and resource lists are fetched once and kept as
//! `id -> label` maps. A single shared instance lives for the life of the
//! process; the first caller of [`LabelCache::get_instance`] starts the
//! preload and everyone arriving before it settles waits on the same load.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{lock, read, write, CacheEntry, SegmentStats};
use crate::source::{DataSource, SourceError};

/// Age after which a segment is reported as stale
pub const DEFAULT_LABEL_TTL: Duration = Duration::from_secs(30 * 60);

static SHARED: Mutex<Option<Arc<OnceCell<Arc<LabelCache>>>>> = Mutex::new(None);

/// Statistics for both label segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCacheStats {
    pub companies: SegmentStats,
    pub resources: SegmentStats,
}

/// Resolves company and resource IDs to display names
pub struct LabelCache {
    source: Arc<dyn DataSource>,
    ttl: Duration,
    companies: RwLock<CacheEntry<i64, String>>,
    resources: RwLock<CacheEntry<i64, String>>,
    /// Serializes bulk loads; at most one preload is in flight
    load_gate: tokio::sync::Mutex<()>,
}

impl LabelCache {
    /// Create an unloaded cache. Prefer [`LabelCache::get_instance`] outside
    /// of tests and embedded setups that need their own instance.
    pub fn new(source: Arc<dyn DataSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            companies: RwLock::new(CacheEntry::new()),
            resources: RwLock::new(CacheEntry::new()),
            load_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Get the process-wide cache, preloading it on first use.
    ///
    /// Concurrent callers during initialization all await the same preload.
    /// `source` and `ttl` are only used by the call that creates the
    /// instance.
    pub async fn get_instance(source: Arc<dyn DataSource>, ttl: Duration) -> Arc<LabelCache> {
        let cell = {
            let mut slot = lock(&SHARED);
            Arc::clone(slot.get_or_insert_with(|| Arc::new(OnceCell::new())))
        };

        let cache = cell
            .get_or_init(|| async move {
                debug!("Initializing shared label cache");
                let cache = Arc::new(LabelCache::new(source, ttl));
                cache.ensure_loaded().await;
                cache
            })
            .await;
        Arc::clone(cache)
    }

    /// Forget the process-wide instance. The next `get_instance` builds and
    /// preloads a new one.
    #[doc(hidden)]
    pub fn reset_instance() {
        *lock(&SHARED) = None;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load any segment that has not been attempted yet.
    ///
    /// Returns once both segments are valid. Failures are logged and leave
    /// the affected segment empty but valid.
    pub async fn ensure_loaded(&self) {
        if self.is_ready() {
            return;
        }

        let _gate = self.load_gate.lock().await;
        let load_companies = !read(&self.companies).is_valid();
        let load_resources = !read(&self.resources).is_valid();
        if !load_companies && !load_resources {
            // Another caller finished the load while we waited
            return;
        }
        self.load(load_companies, load_resources).await;
    }

    /// Reload segments that are stale (or were cleared). Lookups never do
    /// this on their own. Returns true when a load ran.
    pub async fn refresh_stale(&self) -> bool {
        let _gate = self.load_gate.lock().await;
        let load_companies = Self::due(&read(&self.companies), self.ttl);
        let load_resources = Self::due(&read(&self.resources), self.ttl);
        if !load_companies && !load_resources {
            return false;
        }
        self.load(load_companies, load_resources).await;
        true
    }

    /// Name of a company, `None` if the ID is unknown
    pub async fn get_company_name(&self, id: i64) -> Option<String> {
        self.ensure_loaded().await;
        read(&self.companies).get(&id).cloned()
    }

    /// Name of a resource as "First Last", `None` if it cannot be resolved.
    ///
    /// A miss against a populated cache falls back to a single lookup by ID.
    /// That answer is returned but not added to the cache. A miss against an
    /// empty cache means the listing is unusable here, so no lookup is made.
    pub async fn get_resource_name(&self, id: i64) -> Option<String> {
        self.ensure_loaded().await;

        {
            let entry = read(&self.resources);
            if let Some(name) = entry.get(&id) {
                return Some(name.clone());
            }
            if entry.is_valid() && entry.is_empty() {
                debug!(id, "Resource list unavailable, not looking up resource");
                return None;
            }
        }

        match self.source.get_resource_by_id(id).await {
            Ok(Some(resource)) => Some(resource.display_name()),
            Ok(None) => None,
            Err(e) => {
                warn!(id, error = %e, "Resource lookup failed");
                None
            }
        }
    }

    pub fn get_cache_stats(&self) -> LabelCacheStats {
        LabelCacheStats {
            companies: read(&self.companies).stats(self.ttl),
            resources: read(&self.resources).stats(self.ttl),
        }
    }

    /// Empty both segments. The next lookup triggers a fresh preload.
    pub fn clear_cache(&self) {
        write(&self.companies).clear();
        write(&self.resources).clear();
        info!("Label cache cleared");
    }

    fn is_ready(&self) -> bool {
        read(&self.companies).is_valid() && read(&self.resources).is_valid()
    }

    fn due(entry: &CacheEntry<i64, String>, ttl: Duration) -> bool {
        !entry.is_valid() || entry.is_stale(ttl)
    }

    async fn load(&self, companies: bool, resources: bool) {
        let company_load = async {
            if !companies {
                return None;
            }
            let result = self.source.list_companies().await.map(|list| {
                list.into_iter()
                    .map(|c| (c.id, c.company_name))
                    .collect::<HashMap<_, _>>()
            });
            Some(result)
        };
        let resource_load = async {
            if !resources {
                return None;
            }
            let result = self.source.list_resources().await.map(|list| {
                list.into_iter()
                    .map(|r| (r.id, r.display_name()))
                    .collect::<HashMap<_, _>>()
            });
            Some(result)
        };

        let (company_result, resource_result) = tokio::join!(company_load, resource_load);
        if let Some(result) = company_result {
            Self::store(&self.companies, "company", result);
        }
        if let Some(result) = resource_result {
            Self::store(&self.resources, "resource", result);
        }
    }

    fn store(
        segment: &RwLock<CacheEntry<i64, String>>,
        kind: &str,
        result: Result<HashMap<i64, String>, SourceError>,
    ) {
        let mut entry = write(segment);
        match result {
            Ok(labels) => {
                info!(count = labels.len(), "Cached {} names", kind);
                entry.replace(labels);
            }
            Err(e) => {
                // Any failure, including method-not-allowed, is final until
                // the cache is cleared.
                warn!(error = %e, "Failed to load {} names, continuing without them", kind);
                entry.mark_attempted();
            }
        }
    }
}
