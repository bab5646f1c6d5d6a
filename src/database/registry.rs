//! Database Registry Module
//!
//! Process-wide map from database id to database, used by the HTTP layer
//! to resolve incoming requests. Initialized empty, populated only through
//! `create`, never drained.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::database::Database;
use crate::error::Result;

// == Registry ==
/// Reader/writer-locked id -> database map.
///
/// Creation takes the exclusive lock; lookups take the shared lock so
/// concurrent request handlers resolve databases in parallel.
#[derive(Default)]
pub struct Registry {
    databases: RwLock<HashMap<u8, Arc<Database>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == Create ==
    /// Creates a database and registers it under its id.
    ///
    /// Re-creating an existing id replaces the registry entry; callers
    /// holding the old `Arc` keep the old cache contents.
    pub fn create(&self, id: u8, capacity_bytes: u64) -> Result<Arc<Database>> {
        let db = Arc::new(Database::new(id, capacity_bytes)?);
        let mut databases = self
            .databases
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        databases.insert(id, db.clone());
        Ok(db)
    }

    // == Get ==
    /// Looks up a database by id.
    pub fn get(&self, id: u8) -> Option<Arc<Database>> {
        let databases = self
            .databases
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        databases.get(&id).cloned()
    }

    /// Number of registered databases.
    pub fn len(&self) -> usize {
        self.databases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
