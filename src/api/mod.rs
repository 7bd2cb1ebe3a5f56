//! API Module
//!
//! Thin HTTP surface for observing and exercising the caches.
//!
//! # Endpoints
//! - `PUT /kv` - Store a JSON value in the byte-budget cache
//! - `GET /kv/:key` - Read a value from the byte-budget cache
//! - `GET /cache/info` - Response cache footprint
//! - `GET /stats` - Counters of both caches
//! - `GET /health` - Health check endpoint
//!
//! No route reads through the response cache. It is filled by library callers
//! holding `AppState::response_cache` (read endpoints calling
//! `ResponseCache::get_or_compute`); `/cache/info` and `/stats` report on it.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
