//! Response Cache Module
//!
//! Size-estimated LRU cache of JSON values in front of read queries.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::estimate::estimate;
use crate::cache::{CacheSlot, CacheStats, OrderTracker};
use crate::error::CacheError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// == Cache Info ==
/// Read-only snapshot of the response cache's footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheInfo {
    pub item_count: usize,
    pub bytes_used: usize,
    /// `bytes_used` in MiB, rounded to 4 decimals
    pub mb_used: f64,
    pub mb_budget: f64,
}

#[derive(Debug, Default)]
struct LruState {
    slots: HashMap<String, CacheSlot>,
    /// Recency order (oldest = least recently used)
    order: OrderTracker,
    /// Sum of slot sizes
    current_memory_usage: usize,
    stats: CacheStats,
}

// == Response Cache ==
/// LRU cache bounded by the estimated size of its keys and values.
///
/// Values are stored as live `serde_json::Value` trees; `get` hands out the
/// stored allocation itself. There is no TTL: slots live until evicted.
#[derive(Debug)]
pub struct ResponseCache {
    state: Mutex<LruState>,
    max_memory_bytes: usize,
}

impl ResponseCache {
    // == Constructor ==
    pub fn new(max_memory_bytes: usize) -> Self {
        Self {
            state: Mutex::new(LruState::default()),
            max_memory_bytes,
        }
    }

    /// Creates a cache with a budget given in MiB.
    pub fn with_megabytes(max_memory_mb: f64) -> Self {
        Self::new((max_memory_mb * BYTES_PER_MB) as usize)
    }

    // == Get ==
    /// Returns the value under `key` and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let value = state.slots.get(key).map(|slot| Arc::clone(&slot.value));

        match value {
            Some(value) => {
                state.order.touch(key);
                state.stats.record_hit();
                Some(value)
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, evicting least recently used slots.
    ///
    /// A single item whose estimated size exceeds the whole budget is not
    /// stored and nothing is evicted; the write is dropped with a warning.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let item_size = estimate(key.as_str()) + estimate(&value);

        let mut guard = self.state.lock();
        let state = &mut *guard;

        if item_size > self.max_memory_bytes {
            state.stats.record_rejection();
            warn!(
                key = %key,
                item_size,
                budget = self.max_memory_bytes,
                "item too large for response cache, not cached"
            );
            return;
        }

        if let Some(old) = state.slots.get(&key) {
            state.current_memory_usage -= old.size_bytes;
        }

        state.order.touch(&key);
        state.slots.insert(key, CacheSlot::new(value, item_size));
        state.current_memory_usage += item_size;

        while state.current_memory_usage > self.max_memory_bytes {
            let Some(evicted_key) = state.order.evict_oldest() else {
                break;
            };
            if let Some(evicted) = state.slots.remove(&evicted_key) {
                state.current_memory_usage -= evicted.size_bytes;
                state.stats.record_eviction();
                debug!(
                    key = %evicted_key,
                    freed = evicted.size_bytes,
                    "response cache eviction"
                );
            }
        }

        state.stats.set_total_entries(state.slots.len());
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// On a hit the stored JSON is decoded into `T`; a decode failure is
    /// returned as [`CacheError::Codec`]. On a miss `fetch` runs without the
    /// lock held, its error is returned unchanged, and its success is stored
    /// in JSON form before being returned as-is.
    ///
    /// Concurrent misses on the same key each run `fetch`; the last write
    /// wins. Callers must only pass idempotent reads.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get(key) {
            debug!(key, "response cache hit");
            return T::deserialize(&*cached).map_err(|err| E::from(CacheError::Codec(err)));
        }

        let result = fetch().await?;

        match serde_json::to_value(&result) {
            Ok(value) => self.set(key, value),
            Err(err) => warn!(key, error = %err, "fetch result has no JSON form, not cached"),
        }

        Ok(result)
    }

    // == Info ==
    pub fn info(&self) -> CacheInfo {
        let state = self.state.lock();
        let mb_used = state.current_memory_usage as f64 / BYTES_PER_MB;

        CacheInfo {
            item_count: state.slots.len(),
            bytes_used: state.current_memory_usage,
            mb_used: (mb_used * 10_000.0).round() / 10_000.0,
            mb_budget: self.max_memory_bytes as f64 / BYTES_PER_MB,
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().slots.is_empty()
    }

    pub fn bytes_used(&self) -> usize {
        self.state.lock().current_memory_usage
    }

    pub fn max_bytes(&self) -> usize {
        self.max_memory_bytes
    }

    /// Whether `key` is cached, without touching its recency.
    pub fn contains_key(&self, key: &str) -> bool {
        self.state.lock().slots.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.slots.len());
        stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Size of a slot holding `len` bytes of text under a two-char key.
    fn slot_size(len: usize) -> usize {
        estimate("k1") + estimate(&json!("x".repeat(len)))
    }

    #[test]
    fn test_set_and_get_returns_same_allocation() {
        let cache = ResponseCache::new(4096);

        cache.set("popular:64:0", json!({"total": 1}));
        let first = cache.get("popular:64:0").unwrap();
        let second = cache.get("popular:64:0").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, json!({"total": 1}));
    }

    #[test]
    fn test_get_missing_key() {
        let cache = ResponseCache::new(4096);
        assert!(cache.get("missing").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_bytes_used_matches_estimate() {
        let cache = ResponseCache::new(4096);
        let value = json!({"title": "Monster", "genres": ["thriller"]});

        cache.set("manga:1", value.clone());

        assert_eq!(cache.bytes_used(), estimate("manga:1") + estimate(&value));
    }

    #[test]
    fn test_overwrite_applies_size_delta() {
        let cache = ResponseCache::new(1 << 20);

        cache.set("k1", json!("x".repeat(500)));
        cache.set("k1", json!("x".repeat(20)));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.bytes_used(), slot_size(20));
    }

    #[test]
    fn test_lru_eviction_respects_recent_get() {
        let size = slot_size(64);
        let cache = ResponseCache::new(size * 2 + size / 2);

        cache.set("k1", json!("x".repeat(64)));
        cache.set("k2", json!("x".repeat(64)));
        cache.get("k1").unwrap();
        cache.set("k3", json!("x".repeat(64)));

        assert!(cache.contains_key("k1"));
        assert!(!cache.contains_key("k2"), "least recently used must go first");
        assert!(cache.contains_key("k3"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_promotes_recency() {
        let size = slot_size(64);
        let cache = ResponseCache::new(size * 2 + size / 2);

        cache.set("k1", json!("x".repeat(64)));
        cache.set("k2", json!("x".repeat(64)));
        cache.set("k1", json!("y".repeat(64)));
        cache.set("k3", json!("x".repeat(64)));

        assert!(cache.contains_key("k1"));
        assert!(!cache.contains_key("k2"));
    }

    #[test]
    fn test_oversized_item_is_rejected_without_eviction() {
        let cache = ResponseCache::new(512);
        cache.set("small", json!(1));
        let before = cache.info();

        cache.set("huge", json!("x".repeat(4096)));

        assert_eq!(cache.info(), before);
        assert!(cache.get("huge").is_none());
        assert!(cache.contains_key("small"));
        assert_eq!(cache.stats().rejections, 1);
    }

    #[test]
    fn test_item_exactly_at_budget_is_stored() {
        let size = slot_size(32);
        let cache = ResponseCache::new(size);

        cache.set("k1", json!("x".repeat(32)));

        assert!(cache.contains_key("k1"));
        assert_eq!(cache.bytes_used(), size);
    }

    #[test]
    fn test_info_snapshot() {
        let cache = ResponseCache::with_megabytes(4.0);
        cache.set("latest:10:0", json!([1, 2, 3]));

        let info = cache.info();
        assert_eq!(info.item_count, 1);
        assert_eq!(info.bytes_used, cache.bytes_used());
        assert_eq!(info.mb_budget, 4.0);
        assert!(info.mb_used >= 0.0 && info.mb_used < 0.01);
    }

    #[test]
    fn test_with_megabytes_budget() {
        assert_eq!(ResponseCache::with_megabytes(1.5).max_bytes(), 1_572_864);
    }
}
