//! Guarded Local Cache Module
//!
//! Thread-safe wrapper over the sized LRU store. Every operation holds an
//! exclusive lock for the duration of the store call; there is no
//! read/write distinction because even `get` mutates recency order.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cache::{ByteView, CacheStats, SizedLru};
use crate::error::{CacheError, Result};

// == Inner State ==
#[derive(Debug, Default)]
struct Inner {
    /// Built lazily on first put
    store: Option<SizedLru<ByteView>>,
    stats: CacheStats,
}

// == Local Cache ==
/// One database's local cache: a lazily constructed `SizedLru` behind a
/// mutex. The store only materializes once a value is actually written,
/// and the lazy init runs under the same lock as the write, so two
/// concurrent first puts cannot race.
///
/// No I/O ever happens under the lock; callers drop the guard before any
/// network work.
#[derive(Debug)]
pub struct LocalCache {
    capacity_bytes: u64,
    inner: Mutex<Inner>,
}

impl LocalCache {
    // == Constructor ==
    /// Creates a cache with the given byte budget.
    ///
    /// The capacity is validated here so the lazy store construction on
    /// first put cannot fail later.
    pub fn new(capacity_bytes: u64) -> Result<Self> {
        if capacity_bytes == 0 {
            return Err(CacheError::Configuration(
                "cache capacity must be greater than zero bytes".to_string(),
            ));
        }
        Ok(Self {
            capacity_bytes,
            inner: Mutex::new(Inner::default()),
        })
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        // A poisoned store still holds consistent data: every mutation
        // completes before the guard is released
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Put ==
    /// Inserts or replaces a value, building the store on first use.
    pub fn put(&self, key: &str, value: ByteView) -> Result<()> {
        let mut inner = self.locked();
        if inner.store.is_none() {
            inner.store = Some(SizedLru::new(self.capacity_bytes)?);
        }
        if let Some(store) = inner.store.as_mut() {
            let evicted = store.put(key, value);
            inner.stats.record_evictions(evicted as u64);
        }
        Ok(())
    }

    // == Get ==
    /// Returns a copy of the value for `key`, promoting it to most
    /// recently used.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.locked();
        let found = inner.store.as_mut().and_then(|store| store.get(key));
        match found {
            Some(value) => {
                inner.stats.record_hit();
                Some(value)
            }
            None => {
                inner.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes the entry for `key` if present.
    pub fn delete(&self, key: &str) {
        let mut inner = self.locked();
        if let Some(store) = inner.store.as_mut() {
            store.delete(key);
        }
    }

    // == Contains Key ==
    /// Membership check without touching recency order or counters.
    pub fn contains_key(&self, key: &str) -> bool {
        let inner = self.locked();
        inner
            .store
            .as_ref()
            .map(|store| store.contains_key(key))
            .unwrap_or(false)
    }

    // == Stats ==
    /// Snapshot of the counters and current byte accounting.
    pub fn stats(&self) -> CacheStats {
        let inner = self.locked();
        let mut stats = inner.stats.clone();
        stats.capacity_bytes = self.capacity_bytes;
        if let Some(store) = inner.store.as_ref() {
            stats.total_entries = store.len();
            stats.used_bytes = store.used_bytes();
        }
        stats
    }
}
