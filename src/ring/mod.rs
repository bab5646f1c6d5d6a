//! Consistent Hash Ring Module
//!
//! Maps keys to owning peer addresses. Each real node is replicated as
//! several virtual nodes on the ring to smooth load distribution; a key
//! belongs to the first virtual node at or clockwise past its hash.

use std::collections::HashMap;
use std::fmt;

// == Hash Function ==
/// Pluggable 32-bit hash, swappable for a deterministic one in tests.
pub type HashFn = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

// == Hash Ring ==
/// Consistent hash ring over real node identifiers (peer base URLs).
///
/// Built once at startup and never mutated afterwards, so lookups need
/// no lock. A hash collision between two virtual nodes silently lets the
/// last-inserted node win that slot; with a decent hash this is rare
/// enough to accept.
pub struct HashRing {
    hash: HashFn,
    /// Virtual nodes per real node
    replicas: usize,
    /// Sorted virtual-node hash values
    keys: Vec<u32>,
    /// Virtual-node hash -> real node identifier
    nodes: HashMap<u32, String>,
}

impl HashRing {
    // == Constructors ==
    /// Creates a ring using the default CRC32 checksum hash.
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, Box::new(crc32fast::hash))
    }

    /// Creates a ring with a caller-supplied hash function.
    pub fn with_hasher(replicas: usize, hash: HashFn) -> Self {
        Self {
            hash,
            replicas,
            keys: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    // == Add Nodes ==
    /// Registers real nodes on the ring.
    ///
    /// Each node gets `replicas` virtual positions, hashed from the
    /// replica index concatenated with the node identifier. The key
    /// sequence is re-sorted before any lookup is trusted.
    pub fn add_nodes<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for node in nodes {
            let node = node.into();
            for i in 0..self.replicas {
                let virtual_key = format!("{}{}", i, node);
                let hash_value = (self.hash)(virtual_key.as_bytes());
                self.keys.push(hash_value);
                self.nodes.insert(hash_value, node.clone());
            }
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Returns the real node owning `key`, or None on an empty ring.
    ///
    /// The owner is the first virtual node whose hash is >= hash(key),
    /// wrapping around to the start of the sequence past the last one.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let hash_value = (self.hash)(key.as_bytes());
        let index = self.keys.partition_point(|&k| k < hash_value);
        let virtual_key = self.keys[index % self.keys.len()];
        self.nodes.get(&virtual_key).map(String::as_str)
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("virtual_nodes", &self.keys.len())
            .finish()
    }
}
