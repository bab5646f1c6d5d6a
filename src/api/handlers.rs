//! API Handlers
//!
//! HTTP request handlers for the cache protocol. Requests are decoded
//! into (database id, key, value) and handed to the database layer; the
//! same endpoints serve both clients and peer-forwarded operations.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::ByteView;
use crate::database::Registry;
use crate::error::{CacheError, Result};
use crate::models::{DeleteResponse, HealthResponse, PutResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide database registry
    pub registry: Arc<Registry>,
}

impl AppState {
    /// Creates a new AppState over the given registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    fn database(&self, id: u8) -> Result<Arc<crate::database::Database>> {
        self.registry
            .get(id)
            .ok_or(CacheError::DatabaseNotFound(id))
    }
}

/// Handler for GET /cache/:db/:key
///
/// Returns the cached bytes as `text/plain` on a hit; 404 when the key
/// resolves to no value anywhere.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((db, key)): Path<(u8, String)>,
) -> Result<Response> {
    let database = state.database(db)?;

    match database.get(&key).await? {
        Some(value) => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            value.to_vec(),
        )
            .into_response()),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for PUT /cache/:db
///
/// The body is a JSON object mapping keys to values; every pair is
/// stored into the given database.
pub async fn put_handler(
    State(state): State<AppState>,
    Path(db): Path<u8>,
    Json(entries): Json<HashMap<String, String>>,
) -> Result<Json<PutResponse>> {
    let database = state.database(db)?;

    let stored = entries.len();
    for (key, value) in entries {
        database.put(&key, ByteView::from(value.as_str())).await?;
    }

    Ok(Json(PutResponse::new(stored)))
}

/// Handler for DELETE /cache/:db/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((db, key)): Path<(u8, String)>,
) -> Result<Json<DeleteResponse>> {
    let database = state.database(db)?;
    database.delete(&key).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats/:db
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(db): Path<u8>,
) -> Result<Json<StatsResponse>> {
    let database = state.database(db)?;
    let stats = database.stats();

    Ok(Json(StatsResponse::new(db, &stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
