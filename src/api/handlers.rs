//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheConfig, LruCache};
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, DeleteResponse, GetResponse, HealthResponse, ReapResponse, SetRequest,
    SetResponse, StatsResponse, TrimResponse,
};
use crate::store::OrderedStore;

/// Cache over whichever store backend the server was started with.
pub type SharedCache = Arc<LruCache<dyn OrderedStore>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: LruCache<dyn OrderedStore>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Builds the cache over `store` from a cache configuration.
    pub fn from_config(store: Arc<dyn OrderedStore>, config: CacheConfig) -> Result<Self> {
        Ok(Self::new(LruCache::new(store, config)?))
    }

    /// Runs a cache call on the blocking pool; every engine call is a
    /// synchronous store round trip.
    async fn run<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&LruCache<dyn OrderedStore>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let cache = self.cache.clone();
        tokio::task::spawn_blocking(move || f(&*cache))
            .await
            .map_err(|e| CacheError::Internal(format!("cache task failed: {}", e)))?
    }
}

fn checked_key(key: String) -> Result<String> {
    match validate_key(&key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(key),
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let SetRequest { key, value } = req;
    let response = SetResponse::new(key.clone());
    state.run(move |cache| cache.set(&key, value)).await?;

    Ok(Json(response))
}

/// Handler for GET /get/:key
///
/// A hit marks the entry as most recently used.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let key = checked_key(key)?;
    let lookup = key.clone();
    let value = state.run(move |cache| cache.get(&lookup)).await?;

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /peek/:key
///
/// Same as get, without touching recency.
pub async fn peek_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let key = checked_key(key)?;
    let lookup = key.clone();
    let value = state.run(move |cache| cache.peek(&lookup)).await?;

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deleting an absent key succeeds with `removed: false`.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let key = checked_key(key)?;
    let target = key.clone();
    let removed = state.run(move |cache| cache.delete(&[target])).await?;

    Ok(Json(DeleteResponse::new(key, removed > 0)))
}

/// Handler for POST /trim
pub async fn trim_handler(State(state): State<AppState>) -> Result<Json<TrimResponse>> {
    let report = state.run(|cache| cache.trim_to_limit()).await?;
    Ok(Json(report.into()))
}

/// Handler for POST /reap
pub async fn reap_handler(State(state): State<AppState>) -> Result<Json<ReapResponse>> {
    let reaped = state.run(|cache| cache.reap_expired()).await?;
    Ok(Json(ReapResponse { reaped }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let entries = state.run(|cache| cache.len()).await?;
    let cache = &state.cache;

    Ok(Json(StatsResponse {
        namespace: cache.namespace().to_string(),
        limit: cache.limit(),
        ttl: cache.ttl(),
        entries,
        trim_policy: cache.trim_policy().to_string(),
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
