//! Cache Module
//!
//! Local storage layer: the sized LRU store, the immutable byte payload
//! it holds, and the lock-guarded per-database wrapper.

mod byte_view;
mod guarded;
mod lru;
mod stats;


// Re-export public types
pub use byte_view::ByteView;
pub use guarded::LocalCache;
pub use lru::{Measured, SizedLru};
pub use stats::CacheStats;
