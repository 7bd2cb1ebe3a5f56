//! API Handlers
//!
//! HTTP request handlers over the shared cache instances.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{ByteBudgetCache, CacheInfo, ResponseCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    CacheStatsView, GetResponse, HealthResponse, PutRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the single long-lived instance of each cache, created once at
/// start-up and cloned (by `Arc`) into every consumer.
#[derive(Clone)]
pub struct AppState {
    pub byte_cache: Arc<ByteBudgetCache>,
    pub response_cache: Arc<ResponseCache>,
    /// TTL for byte cache writes that do not carry one
    pub default_ttl: u64,
}

impl AppState {
    pub fn new(byte_cache: ByteBudgetCache, response_cache: ResponseCache, default_ttl: u64) -> Self {
        Self {
            byte_cache: Arc::new(byte_cache),
            response_cache: Arc::new(response_cache),
            default_ttl,
        }
    }

    /// Creates both caches from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ByteBudgetCache::new(config.byte_cache_max_bytes),
            ResponseCache::with_megabytes(config.response_cache_max_mb),
            config.default_ttl,
        )
    }
}

/// Handler for PUT /kv
///
/// Stores a JSON value in the byte-budget cache.
pub async fn put_handler(
    State(state): State<AppState>,
    Json(req): Json<PutRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl.unwrap_or(state.default_ttl);
    state.byte_cache.set(req.key.clone(), &req.value, ttl)?;

    Ok(Json(SetResponse::new(req.key, ttl)))
}

/// Handler for GET /kv/:key
///
/// Absent and expired keys are both reported as not found.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.byte_cache.get::<Value>(&key)? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /cache/info
///
/// Reports the response cache, which only library callers of
/// `get_or_compute` populate; it stays empty until one runs.
pub async fn info_handler(State(state): State<AppState>) -> Json<CacheInfo> {
    Json(state.response_cache.info())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let byte_cache = &state.byte_cache;
    let response_cache = &state.response_cache;

    Json(StatsResponse {
        byte_cache: CacheStatsView::new(
            &byte_cache.stats(),
            byte_cache.bytes_used(),
            byte_cache.max_bytes(),
        ),
        response_cache: CacheStatsView::new(
            &response_cache.stats(),
            response_cache.bytes_used(),
            response_cache.max_bytes(),
        ),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
