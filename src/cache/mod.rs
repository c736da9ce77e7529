//! Identifier-to-label and field metadata caches
//!
//! Both caches sit in front of a [`DataSource`](crate::source::DataSource)
//! and are shared by every concurrent tool invocation:
//!
//! - [`LabelCache`]: bulk-preloaded company/resource names, one per process
//! - [`FieldCache`]: field definitions per entity type, loaded on first use
//!
//! Data source failures never escape a lookup. They degrade to empty cache
//! contents and show up in logs and in the `is_valid` flag of the stats.

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use thiserror::Error;

mod fields;
mod labels;

pub use fields::{FieldCache, FieldCacheStats, FieldInfo, PicklistValue};
pub use labels::{LabelCache, LabelCacheStats, DEFAULT_LABEL_TTL};

/// Errors surfaced by the caches
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid entity type: {entity_type:?}")]
    InvalidEntityType { entity_type: String },
}

/// One cached key/value segment plus its load bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    values: HashMap<K, V>,
    loaded_at: Option<Instant>,
    is_valid: bool,
}

impl<K: Eq + Hash, V> CacheEntry<K, V> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            loaded_at: None,
            is_valid: false,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True once a load attempt has completed, whatever its outcome
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn loaded_at(&self) -> Option<Instant> {
        self.loaded_at
    }

    pub fn age(&self) -> Option<Duration> {
        self.loaded_at.map(|at| at.elapsed())
    }

    /// A valid segment whose last load is at least `ttl` old
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.is_valid && self.age().map_or(false, |age| age >= ttl)
    }

    /// Install the result of a successful full load
    pub fn replace(&mut self, values: HashMap<K, V>) {
        self.values = values;
        self.loaded_at = Some(Instant::now());
        self.is_valid = true;
    }

    /// Record a failed load. The segment becomes valid so the failure is
    /// not retried on every lookup. Values and `loaded_at` still describe
    /// the last successful load.
    pub fn mark_attempted(&mut self) {
        self.is_valid = true;
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.loaded_at = None;
        self.is_valid = false;
    }

    pub fn stats(&self, ttl: Duration) -> SegmentStats {
        SegmentStats {
            count: self.count(),
            is_valid: self.is_valid,
            age_secs: self.age().map(|age| age.as_secs()),
            stale: self.is_stale(ttl),
        }
    }
}

impl<K: Eq + Hash, V> Default for CacheEntry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Diagnostics for a single cache segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    pub count: usize,
    pub is_valid: bool,
    pub age_secs: Option<u64>,
    pub stale: bool,
}

// Critical sections never await and never panic mid-update, so a poisoned
// lock still holds consistent data.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_not_valid() {
        let entry: CacheEntry<i64, String> = CacheEntry::new();
        assert!(!entry.is_valid());
        assert_eq!(entry.count(), 0);
        assert!(entry.loaded_at().is_none());
        assert!(!entry.is_stale(Duration::ZERO));
    }

    #[test]
    fn test_replace_and_clear() {
        let mut entry = CacheEntry::new();
        entry.replace(HashMap::from([(1_i64, "Acme Corp".to_string())]));
        assert!(entry.is_valid());
        assert_eq!(entry.get(&1).map(String::as_str), Some("Acme Corp"));
        assert!(entry.loaded_at().is_some());

        entry.clear();
        assert!(!entry.is_valid());
        assert!(entry.is_empty());
        assert!(entry.loaded_at().is_none());
    }

    #[test]
    fn test_failed_load_still_counts_as_attempted() {
        let mut entry: CacheEntry<i64, String> = CacheEntry::new();
        entry.mark_attempted();
        assert!(entry.is_valid());
        assert_eq!(entry.count(), 0);
        assert!(entry.loaded_at().is_none());
        assert!(!entry.is_stale(Duration::ZERO));
    }

    #[test]
    fn test_failed_refresh_does_not_reset_age() {
        let ttl = Duration::from_millis(50);
        let mut entry = CacheEntry::new();
        entry.replace(HashMap::from([(1_i64, "Acme Corp".to_string())]));
        let loaded_at = entry.loaded_at();
        std::thread::sleep(Duration::from_millis(60));
        assert!(entry.is_stale(ttl));

        entry.mark_attempted();
        assert_eq!(entry.loaded_at(), loaded_at);
        assert!(entry.is_stale(ttl));
        assert!(entry.stats(ttl).stale);
        assert!(entry.age().map_or(false, |age| age >= ttl));
    }

    #[test]
    fn test_failed_refresh_keeps_previous_snapshot() {
        let mut entry = CacheEntry::new();
        entry.replace(HashMap::from([(10_i64, "John Doe".to_string())]));
        entry.mark_attempted();
        assert_eq!(entry.count(), 1);
    }

    #[test]
    fn test_staleness() {
        let mut entry = CacheEntry::new();
        entry.replace(HashMap::from([(1_i64, "a".to_string())]));
        assert!(entry.is_stale(Duration::ZERO));
        assert!(!entry.is_stale(Duration::from_secs(3600)));

        let stats = entry.stats(Duration::from_secs(3600));
        assert_eq!(stats.count, 1);
        assert!(stats.is_valid);
        assert_eq!(stats.age_secs, Some(0));
        assert!(!stats.stale);
    }
}
