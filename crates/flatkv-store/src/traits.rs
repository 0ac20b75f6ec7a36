use crate::error::StoreResult;

/// Key-value store with create/read/update/delete semantics.
///
/// All implementations must satisfy these invariants:
/// - Keys match `[A-Za-z0-9_-]*`; `create` rejects anything else.
/// - Values never contain a newline.
/// - `create` never overwrites, `update` never inserts.
/// - Every call is a single atomic transition of the mapping.
pub trait KvStore: Send + Sync {
    /// Insert a new entry.
    ///
    /// Returns `Err(InvalidKey)` for a malformed key and `Err(DuplicateKey)`
    /// if the key is already present; the existing value is left untouched.
    fn create(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Return the value stored under `key`, or `Err(NotFound)`.
    fn read(&self, key: &str) -> StoreResult<String>;

    /// Replace the value of an existing entry, or `Err(NotFound)`.
    fn update(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove an entry and return the value it held, or `Err(NotFound)`.
    fn delete(&self, key: &str) -> StoreResult<String>;
}

pub(crate) mod table {
    //! CRUD transitions over a bare mapping, shared by the store backends.
    //! Callers hold whatever lock guards the mapping. Values are checked only
    //! after the key's presence is known, so `DuplicateKey` and `NotFound`
    //! take precedence over `InvalidValue`.

    use std::collections::hash_map::Entry;

    use crate::codec::Entries;
    use crate::error::{StoreError, StoreResult};
    use crate::key::validate_value;

    pub(crate) fn insert_new(entries: &mut Entries, key: &str, value: &str) -> StoreResult<()> {
        match entries.entry(key.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(key.to_string())),
            Entry::Vacant(slot) => {
                validate_value(key, value)?;
                slot.insert(value.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn get(entries: &Entries, key: &str) -> StoreResult<String> {
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    pub(crate) fn replace(entries: &mut Entries, key: &str, value: &str) -> StoreResult<()> {
        match entries.get_mut(key) {
            Some(slot) => {
                validate_value(key, value)?;
                *slot = value.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    pub(crate) fn remove(entries: &mut Entries, key: &str) -> StoreResult<String> {
        entries
            .remove(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}
