//! Peercache - A distributed in-memory key-value cache
//!
//! Each process holds a local LRU cache and cooperates with a static set
//! of peers: a consistent hash ring gives every key exactly one owning
//! peer, and the other peers keep pass-through copies of remote reads.

pub mod api;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod peers;
pub mod pool;
pub mod ring;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use database::{Database, Registry};
pub use pool::HttpPeerPool;
pub use ring::HashRing;
