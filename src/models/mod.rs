//! Response models for the cache server API
//!
//! DTOs for the JSON response bodies. Cache hits are served as raw
//! `text/plain` bytes and have no DTO; these cover the write operations
//! and the ambient endpoints.

pub mod responses;

pub use responses::{
    DeleteResponse, ErrorResponse, HealthResponse, PutResponse, StatsResponse,
};
