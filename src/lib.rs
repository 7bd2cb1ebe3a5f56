//! Query Cache - in-process response caches for read-heavy endpoints
//!
//! Provides a byte-budget TTL cache with FIFO eviction and a size-estimated
//! LRU cache with a compute-or-fetch helper.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{ByteBudgetCache, CacheInfo, ResponseCache};
pub use config::Config;
pub use error::CacheError;
