//! Cache Module
//!
//! Two independent in-process caches:
//! - [`ByteBudgetCache`]: serialized entries, TTL, FIFO eviction under a byte budget
//! - [`ResponseCache`]: live JSON values, LRU eviction under an estimated-size budget

mod byte_store;
mod entry;
pub mod estimate;
mod order;
mod response;
mod stats;


// Re-export public types
pub use byte_store::{ByteBudgetCache, ByteStore};
pub use entry::{current_timestamp_ms, ByteEntry, CacheSlot};
pub use estimate::{estimate, EstimateSize};
pub use order::OrderTracker;
pub use response::{CacheInfo, ResponseCache};
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes for keys arriving over HTTP
pub const MAX_KEY_LENGTH: usize = 256;

/// Default byte budget of the byte-budget cache
pub const DEFAULT_BYTE_BUDGET: usize = 1024 * 1024; // 1 MB

/// Default estimated-memory budget of the response cache, in MiB
pub const DEFAULT_RESPONSE_BUDGET_MB: f64 = 4.0;
