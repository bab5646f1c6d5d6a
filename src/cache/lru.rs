//! Sized LRU Store Module
//!
//! A capacity-bounded store keyed by string, ordered by recency of use.
//! When the byte budget is exceeded the least recently used entries are
//! evicted until the store fits again.

use std::collections::HashMap;

use crate::error::{CacheError, Result};

/// Sentinel for "no node" links in the recency list.
const NIL: usize = usize::MAX;

const CORRUPT: &str = "lru index out of sync with recency list";

// == Measured Trait ==
/// Sizing capability required of cached values.
///
/// Any type that can report its accounting weight in bytes can be stored,
/// so the store is not tied to one concrete payload type.
pub trait Measured {
    /// Returns the accounting weight of the value in bytes.
    fn byte_len(&self) -> usize;
}

// == Recency Node ==
/// One entry in the recency list. Nodes live in a slab and link to their
/// neighbors by index, front = most recently used, back = least.
#[derive(Debug)]
struct Node<V> {
    key: String,
    value: V,
    prev: usize,
    next: usize,
}

// == Sized LRU Store ==
/// Capacity-bounded LRU store.
///
/// The byte budget counts `key.len() + value.byte_len()` per entry.
/// Promotion to most-recently-used is O(1): the key index maps into a
/// slab of doubly linked nodes, so no re-sorting ever happens.
#[derive(Debug)]
pub struct SizedLru<V> {
    /// Fixed byte budget, set at construction
    capacity_bytes: u64,
    /// Sum of `key.len() + value.byte_len()` over live entries
    used_bytes: u64,
    /// Key -> slab position of the owning node
    index: HashMap<String, usize>,
    /// Node slab; freed slots are None until reused
    nodes: Vec<Option<Node<V>>>,
    /// Reusable slab positions
    free: Vec<usize>,
    /// Most recently used node, NIL when empty
    head: usize,
    /// Least recently used node, NIL when empty
    tail: usize,
}

impl<V: Measured + Clone> SizedLru<V> {
    // == Constructor ==
    /// Creates a store with a fixed byte budget.
    ///
    /// A zero capacity would make every insert evict itself, so it is
    /// rejected at construction instead of producing an unusable store.
    pub fn new(capacity_bytes: u64) -> Result<Self> {
        if capacity_bytes == 0 {
            return Err(CacheError::Configuration(
                "cache capacity must be greater than zero bytes".to_string(),
            ));
        }
        Ok(Self {
            capacity_bytes,
            used_bytes: 0,
            index: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        })
    }

    // == Put ==
    /// Inserts or replaces a value, making it most recently used.
    ///
    /// After the write, least recently used entries are evicted until
    /// `used_bytes <= capacity_bytes` holds or the store is empty. A value
    /// larger than the whole budget is accepted and immediately evicted.
    ///
    /// Returns the number of entries evicted by this call.
    pub fn put(&mut self, key: impl Into<String>, value: V) -> usize {
        let key = key.into();
        if let Some(&pos) = self.index.get(&key) {
            let node = self.nodes[pos].as_mut().expect(CORRUPT);
            let old_len = node.value.byte_len() as u64;
            let new_len = value.byte_len() as u64;
            node.value = value;
            self.used_bytes = self.used_bytes - old_len + new_len;
            self.move_to_front(pos);
        } else {
            let weight = key.len() as u64 + value.byte_len() as u64;
            let pos = self.alloc(Node {
                key: key.clone(),
                value,
                prev: NIL,
                next: NIL,
            });
            self.push_front(pos);
            self.index.insert(key, pos);
            self.used_bytes += weight;
        }

        let mut evicted = 0;
        while self.used_bytes > self.capacity_bytes {
            if self.evict_oldest().is_none() {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    // == Get ==
    /// Returns a copy of the value for `key`, promoting it to most
    /// recently used. Never evicts.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let pos = *self.index.get(key)?;
        self.move_to_front(pos);
        let node = self.nodes[pos].as_ref().expect(CORRUPT);
        Some(node.value.clone())
    }

    // == Delete ==
    /// Removes the entry for `key` if present. No-op when absent.
    pub fn delete(&mut self, key: &str) -> bool {
        if let Some(pos) = self.index.remove(key) {
            let node = self.detach(pos);
            self.used_bytes -= node.key.len() as u64 + node.value.byte_len() as u64;
            true
        } else {
            false
        }
    }

    // == Contains Key ==
    /// Pure membership check, does not affect recency order.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Evict Oldest ==
    /// Removes and returns the single least recently used entry.
    /// No-op on an empty store.
    pub fn evict_oldest(&mut self) -> Option<(String, V)> {
        if self.tail == NIL {
            return None;
        }
        let node = self.detach(self.tail);
        self.index.remove(&node.key);
        self.used_bytes -= node.key.len() as u64 + node.value.byte_len() as u64;
        Some((node.key, node.value))
    }

    // == Accessors ==
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current byte accounting over live entries.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// Fixed byte budget.
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    // == List Internals ==
    fn alloc(&mut self, node: Node<V>) -> usize {
        if let Some(pos) = self.free.pop() {
            self.nodes[pos] = Some(node);
            pos
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn push_front(&mut self, pos: usize) {
        let old_head = self.head;
        {
            let node = self.nodes[pos].as_mut().expect(CORRUPT);
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head != NIL {
            self.nodes[old_head].as_mut().expect(CORRUPT).prev = pos;
        }
        self.head = pos;
        if self.tail == NIL {
            self.tail = pos;
        }
    }

    fn unlink(&mut self, pos: usize) {
        let (prev, next) = {
            let node = self.nodes[pos].as_ref().expect(CORRUPT);
            (node.prev, node.next)
        };
        if prev != NIL {
            self.nodes[prev].as_mut().expect(CORRUPT).next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].as_mut().expect(CORRUPT).prev = prev;
        } else {
            self.tail = prev;
        }
    }

    /// Unlinks the node and frees its slab slot, returning the node.
    fn detach(&mut self, pos: usize) -> Node<V> {
        self.unlink(pos);
        let node = self.nodes[pos].take().expect(CORRUPT);
        self.free.push(pos);
        node
    }

    fn move_to_front(&mut self, pos: usize) {
        if self.head == pos {
            return;
        }
        self.unlink(pos);
        self.push_front(pos);
    }
}
