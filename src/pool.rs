//! HTTP Peer Pool Module
//!
//! Concrete peer picker backed by the consistent hash ring, plus the
//! outbound HTTP client used to reach the owning peer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::peers::{PeerClient, PeerPicker};
use crate::ring::HashRing;

/// URL prefix every peer serves its cache protocol under.
pub const DEFAULT_BASE_PATH: &str = "/cache/";

/// Virtual nodes per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

/// Bound on every outbound peer call so a dead peer cannot stall the
/// requesting task indefinitely.
const PEER_TIMEOUT: Duration = Duration::from_secs(3);

// == HTTP Peer Pool ==
/// Owns the hash ring over the configured peer base URLs and one client
/// per peer. Peers are set once at startup; the pool is shared immutably
/// afterwards, so lookups take no lock.
#[derive(Debug)]
pub struct HttpPeerPool {
    /// This node's own base URL, e.g. `http://127.0.0.1:8001`
    self_url: String,
    base_path: String,
    ring: HashRing,
    clients: HashMap<String, Arc<HttpPeerClient>>,
}

impl HttpPeerPool {
    // == Constructor ==
    /// Creates an empty pool for the node at `self_url`.
    pub fn new(self_url: impl Into<String>) -> Self {
        Self {
            self_url: self_url.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            ring: HashRing::new(DEFAULT_REPLICAS),
            clients: HashMap::new(),
        }
    }

    // == Set Peers ==
    /// Registers the full peer set (normally including this node itself).
    ///
    /// This is the only membership change point; it happens once at
    /// startup, before the pool is shared.
    pub fn set_peers<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();
        let http = reqwest::Client::new();

        self.ring = HashRing::new(DEFAULT_REPLICAS);
        self.ring.add_nodes(peers.iter().cloned());

        self.clients = peers
            .into_iter()
            .map(|peer| {
                let client = HttpPeerClient {
                    prefix: format!("{}{}", peer, self.base_path),
                    http: http.clone(),
                };
                (peer, Arc::new(client))
            })
            .collect();
    }

    // == Owner ==
    /// Returns the peer the ring designates for `key`, self included.
    pub fn owner(&self, key: &str) -> Option<&str> {
        self.ring.get(key)
    }
}

impl PeerPicker for HttpPeerPool {
    /// Resolves `key` on the ring; own address means "not remote".
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerClient>> {
        let owner = self.ring.get(key)?;
        if owner == self.self_url {
            return None;
        }
        debug!(peer = owner, key, "picked remote peer");
        self.clients
            .get(owner)
            .cloned()
            .map(|client| client as Arc<dyn PeerClient>)
    }
}

// == HTTP Peer Client ==
/// Speaks the wire protocol to one remote peer.
#[derive(Debug)]
pub struct HttpPeerClient {
    /// Peer base URL joined with the base path, e.g.
    /// `http://127.0.0.1:8002/cache/`
    prefix: String,
    http: reqwest::Client,
}

impl HttpPeerClient {
    fn key_url(&self, db: u8, key: &str) -> String {
        format!("{}{}/{}", self.prefix, db, urlencoding::encode(key))
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn fetch(&self, db: u8, key: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.key_url(db, key))
            .timeout(PEER_TIMEOUT)
            .send()
            .await
            .map_err(|err| CacheError::RemoteFetch(err.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CacheError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            return Err(CacheError::RemoteFetch(format!(
                "peer returned {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| CacheError::RemoteFetch(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn store(&self, db: u8, key: &str, value: &[u8]) -> Result<()> {
        let body = serde_json::json!({ key: String::from_utf8_lossy(value) });
        let response = self
            .http
            .put(format!("{}{}", self.prefix, db))
            .timeout(PEER_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|err| CacheError::RemoteFetch(err.to_string()))?;

        if !response.status().is_success() {
            return Err(CacheError::RemoteFetch(format!(
                "peer returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn remove(&self, db: u8, key: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.key_url(db, key))
            .timeout(PEER_TIMEOUT)
            .send()
            .await
            .map_err(|err| CacheError::RemoteFetch(err.to_string()))?;

        if !response.status().is_success() {
            return Err(CacheError::RemoteFetch(format!(
                "peer returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
