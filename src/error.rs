//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Malformed input: empty key, bad path segment, bad body
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Unknown database id
    #[error("Database {0} not found")]
    DatabaseNotFound(u8),

    /// A peer call failed (transport error or non-success status)
    #[error("Peer fetch failed: {0}")]
    RemoteFetch(String),

    /// Programming mistake: double peer registration, zero capacity
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CacheError::DatabaseNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            CacheError::RemoteFetch(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            CacheError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            CacheError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
