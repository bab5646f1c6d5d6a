//! API Module
//!
//! HTTP handlers and routing for the peer cache protocol.
//!
//! # Endpoints
//! - `GET /cache/:db/:key` - Retrieve raw bytes for a key
//! - `PUT /cache/:db` - Store one or more key-value pairs (JSON object body)
//! - `DELETE /cache/:db/:key` - Delete a key
//! - `GET /stats/:db` - Per-database cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
