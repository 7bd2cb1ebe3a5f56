//! Cache Entry Module
//!
//! Stored records for the byte-budget cache and the response cache.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Byte Entry ==
/// A serialized payload held by the byte-budget cache.
#[derive(Debug, Clone)]
pub struct ByteEntry {
    /// Serialized value
    pub value: Vec<u8>,
    /// Always `value.len()`
    pub size_bytes: usize,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Position in insertion order, unique for the cache's lifetime
    pub insertion_sequence: u64,
}

impl ByteEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl_seconds` after `now_ms`.
    pub fn new(value: Vec<u8>, now_ms: u64, ttl_seconds: u64, insertion_sequence: u64) -> Self {
        let expires_at = now_ms.saturating_add(ttl_seconds.saturating_mul(1000));

        Self {
            size_bytes: value.len(),
            value,
            expires_at,
            insertion_sequence,
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now_ms` reaches its expiration time.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}

// == Cache Slot ==
/// A live value held by the response cache.
#[derive(Debug, Clone)]
pub struct CacheSlot {
    /// Stored value, shared with every reader
    pub value: Arc<Value>,
    /// Estimated footprint of key and value
    pub size_bytes: usize,
}

impl CacheSlot {
    pub fn new(value: Value, size_bytes: usize) -> Self {
        Self {
            value: Arc::new(value),
            size_bytes,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
