use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::codec::Entries;
use crate::error::StoreResult;
use crate::key::validate_key;
use crate::traits::{table, KvStore};

/// In-memory, HashMap-based store.
///
/// Intended for tests and embedding. Shares validation and CRUD semantics
/// with [`FileStore`](crate::FileStore) but has no backing file and no close.
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::from_entries(Entries::new())
    }

    /// Create a store pre-populated with `entries`.
    pub fn from_entries(entries: Entries) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Consume the store and return its mapping.
    pub fn into_entries(self) -> Entries {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for MemoryStore {
    fn create(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        table::insert_new(&mut self.lock(), key, value)
    }

    fn read(&self, key: &str) -> StoreResult<String> {
        table::get(&self.lock(), key)
    }

    fn update(&self, key: &str, value: &str) -> StoreResult<()> {
        table::replace(&mut self.lock(), key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<String> {
        table::remove(&mut self.lock(), key)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entry_count", &self.len())
            .finish()
    }
}
