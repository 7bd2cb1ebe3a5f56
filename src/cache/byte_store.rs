//! Byte-Budget Cache Module
//!
//! Serialized entries under a hard byte ceiling, with per-entry TTL.
//!
//! Every `get` and `set` first sweeps all expired entries. When a write pushes
//! the total over budget, entries are evicted oldest-insertion-first until it
//! fits again. Eviction ignores access recency: an entry read a million times
//! still goes before one inserted a second later.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{ByteEntry, CacheStats, OrderTracker};
use crate::error::{CacheError, Result};

// == Byte Store ==
/// Unsynchronized storage behind [`ByteBudgetCache`].
///
/// Time is passed in explicitly so the eviction rules can be driven
/// deterministically.
#[derive(Debug)]
pub struct ByteStore {
    /// Key-entry storage
    entries: HashMap<String, ByteEntry>,
    /// Insertion order
    order: OrderTracker,
    /// Sum of `size_bytes` over stored entries
    current_size: usize,
    /// Byte ceiling enforced after every write
    max_bytes: usize,
    stats: CacheStats,
}

impl ByteStore {
    // == Constructor ==
    pub fn new(max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: OrderTracker::new(),
            current_size: 0,
            max_bytes,
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores a serialized payload expiring `ttl_seconds` after `now_ms`.
    ///
    /// An existing entry for `key` is dropped first and the new one gets a
    /// fresh insertion sequence, so it is no longer the oldest.
    pub fn set_at(&mut self, key: String, value: Vec<u8>, ttl_seconds: u64, now_ms: u64) {
        self.cleanup_expired(now_ms);

        if self.entries.contains_key(&key) {
            self.evict_key(&key);
        }

        let sequence = self.order.touch(&key);
        let entry = ByteEntry::new(value, now_ms, ttl_seconds, sequence);
        self.current_size += entry.size_bytes;
        self.entries.insert(key, entry);

        self.evict_oldest_until_fit();
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns a copy of the payload stored under `key`, if live at `now_ms`.
    pub fn get_at(&mut self, key: &str, now_ms: u64) -> Option<Vec<u8>> {
        self.cleanup_expired(now_ms);

        // The sweep above leaves only entries live at `now_ms`.
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Cleanup Expired ==
    /// Removes every entry expired at `now_ms`. Returns the number removed.
    pub fn cleanup_expired(&mut self, now_ms: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now_ms))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.evict_key(&key);
        }

        if count > 0 {
            debug!(removed = count, "byte cache expiry sweep");
            self.stats.record_expirations(count);
            self.stats.set_total_entries(self.entries.len());
        }
        count
    }

    fn evict_key(&mut self, key: &str) -> Option<ByteEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(key);
        self.current_size -= entry.size_bytes;
        Some(entry)
    }

    fn evict_oldest_until_fit(&mut self) {
        while self.current_size > self.max_bytes && !self.entries.is_empty() {
            let Some(oldest) = self.order.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&oldest) {
                self.current_size -= entry.size_bytes;
                self.stats.record_eviction();
                debug!(key = %oldest, freed = entry.size_bytes, "byte cache eviction");
            }
        }
    }

    /// Insertion sequence of a stored entry.
    pub fn insertion_sequence(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.insertion_sequence)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bytes_used(&self) -> usize {
        self.current_size
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}

// == Byte Budget Cache ==
/// Thread-safe byte-budget TTL cache.
///
/// Values are encoded with `serde_json` on `set` and decoded on `get`. All
/// operations run under one exclusive lock; encoding and decoding happen
/// outside it.
#[derive(Debug)]
pub struct ByteBudgetCache {
    inner: Mutex<ByteStore>,
}

impl ByteBudgetCache {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(ByteStore::new(max_bytes)),
        }
    }

    // == Set ==
    /// Serializes `value` and stores it for `ttl_seconds`.
    ///
    /// The encoding must decode back to a value equal to `value`; JSON folds
    /// NaN, infinities and `Some(None)` into `null`, and such values are
    /// refused here rather than read back altered. A serialization failure is
    /// returned and leaves the cache untouched.
    pub fn set<V>(&self, key: impl Into<String>, value: &V, ttl_seconds: u64) -> Result<()>
    where
        V: Serialize + DeserializeOwned + PartialEq,
    {
        let bytes = serde_json::to_vec(value)?;
        let decoded: V = serde_json::from_slice(&bytes)?;
        if decoded != *value {
            return Err(CacheError::Codec(serde::ser::Error::custom(
                "value does not survive a JSON round trip",
            )));
        }
        self.inner
            .lock()
            .set_at(key.into(), bytes, ttl_seconds, current_timestamp_ms());
        Ok(())
    }

    // == Get ==
    /// Returns the live value under `key`, decoded into `V`.
    ///
    /// `Ok(None)` means absent or expired. A payload that does not decode into
    /// `V` fails this call only; the entry is kept.
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>> {
        let bytes = self.inner.lock().get_at(key, current_timestamp_ms());
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn bytes_used(&self) -> usize {
        self.inner.lock().bytes_used()
    }

    pub fn max_bytes(&self) -> usize {
        self.inner.lock().max_bytes()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }
}
