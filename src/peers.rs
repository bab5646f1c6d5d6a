//! Peer Capability Traits
//!
//! Seams between a database and the peer transport: a picker resolves a
//! key to the responsible remote peer, a client speaks to that peer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// == Peer Picker ==
/// Locates the peer responsible for a key.
pub trait PeerPicker: Send + Sync {
    /// Returns a client bound to the owning remote peer, or None when the
    /// key belongs to the local node (or no peers are configured).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerClient>>;
}

// == Peer Client ==
/// Performs cache operations against one remote peer.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Fetches the raw bytes for (database, key) from the peer.
    async fn fetch(&self, db: u8, key: &str) -> Result<Vec<u8>>;

    /// Stores a key-value pair into the peer's database.
    async fn store(&self, db: u8, key: &str, value: &[u8]) -> Result<()>;

    /// Deletes a key from the peer's database.
    async fn remove(&self, db: u8, key: &str) -> Result<()>;
}
