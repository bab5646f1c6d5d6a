//! Database Module
//!
//! A database is one isolated cache namespace. Each operation tries the
//! local cache first, then consults the peer picker to decide whether the
//! key lives on a remote peer and forwards the operation there.

mod registry;

pub use registry::Registry;

use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, LocalCache};
use crate::error::{CacheError, Result};
use crate::peers::PeerPicker;

// == Database ==
/// One cache namespace, identified by a small integer id.
///
/// Many databases may share the same peer picker (the same physical peer
/// set) while keeping fully independent cache contents.
pub struct Database {
    id: u8,
    cache: LocalCache,
    /// Set at most once; never replaced for the process lifetime
    peers: OnceLock<Arc<dyn PeerPicker>>,
}

impl Database {
    // == Constructors ==
    /// Creates a database with the given byte budget and no peers.
    pub fn new(id: u8, capacity_bytes: u64) -> Result<Self> {
        Ok(Self {
            id,
            cache: LocalCache::new(capacity_bytes)?,
            peers: OnceLock::new(),
        })
    }

    /// Creates a database wired to a peer picker from the start.
    pub fn with_peers(
        id: u8,
        capacity_bytes: u64,
        picker: Arc<dyn PeerPicker>,
    ) -> Result<Self> {
        let db = Self::new(id, capacity_bytes)?;
        let _ = db.peers.set(picker);
        Ok(db)
    }

    /// Database id.
    pub fn id(&self) -> u8 {
        self.id
    }

    // == Register Peers ==
    /// Wires the peer picker after construction.
    ///
    /// Allowed at most once; a second registration is a configuration
    /// mistake and is rejected rather than silently swapping the peer set.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(picker).map_err(|_| {
            CacheError::Configuration(format!(
                "peer picker registered more than once on database {}",
                self.id
            ))
        })
    }

    // == Get ==
    /// Looks up `key` locally, then through the owning peer.
    ///
    /// A remote hit is written back into the local cache so subsequent
    /// lookups are served without another peer call. A failed peer fetch
    /// degrades to a miss; it never surfaces as an error to the caller.
    pub async fn get(&self, key: &str) -> Result<Option<ByteView>> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }

        if let Some(value) = self.cache.get(key) {
            debug!(db = self.id, key, "local cache hit");
            return Ok(Some(value));
        }

        if let Some(peer) = self.peer_for(key) {
            match peer.fetch(self.id, key).await {
                Ok(bytes) => {
                    let value = ByteView::from(bytes);
                    // Read-through: keep a local copy of the owner's value
                    self.cache.put(key, value.clone())?;
                    return Ok(Some(value));
                }
                Err(CacheError::NotFound(_)) => {
                    debug!(db = self.id, key, "key absent on owning peer");
                }
                Err(err) => {
                    warn!(db = self.id, key, %err, "peer fetch failed, treating as miss");
                }
            }
        }

        Ok(None)
    }

    // == Put ==
    /// Stores a key-value pair, forwarding to the owning peer when the
    /// key is remote, writing locally otherwise.
    pub async fn put(&self, key: &str, value: ByteView) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }

        if let Some(peer) = self.peer_for(key) {
            debug!(db = self.id, key, "forwarding put to owning peer");
            peer.store(self.id, key, value.as_bytes()).await
        } else {
            self.cache.put(key, value)
        }
    }

    // == Delete ==
    /// Deletes a key, forwarding to the owning peer when remote.
    ///
    /// The local pass-through copy (if any) is dropped as well so this
    /// node does not keep serving a value the owner no longer has.
    pub async fn delete(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }

        if let Some(peer) = self.peer_for(key) {
            debug!(db = self.id, key, "forwarding delete to owning peer");
            self.cache.delete(key);
            peer.remove(self.id, key).await
        } else {
            self.cache.delete(key);
            Ok(())
        }
    }

    // == Contains Key ==
    /// Local membership check; does not consult peers or recency order.
    pub fn contains_key(&self, key: &str) -> bool {
        !key.is_empty() && self.cache.contains_key(key)
    }

    // == Stats ==
    /// Snapshot of this database's local cache metrics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn peer_for(&self, key: &str) -> Option<Arc<dyn crate::peers::PeerClient>> {
        self.peers.get().and_then(|picker| picker.pick_peer(key))
    }
}
