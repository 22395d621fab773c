//! In-memory secret store for tests and simulation.
//!
//! A single mutex guards the whole map, which makes `take_by_handle` a
//! plain `HashMap::remove` and trivially atomic.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{SecretStore, TakenSecret};
use crate::crypto::SecretKey;
use crate::errors::{OnceSecretError, Result};

/// In-memory secret store. Contents vanish when it is dropped.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, TakenSecret>>,
}

impl MemoryStore {
    /// Create a new empty `MemoryStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of secrets still waiting to be retrieved.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if no secrets are stored.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Returns `true` if a record exists for `handle`.
    pub fn contains(&self, handle: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(handle))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, TakenSecret>>> {
        self.records
            .lock()
            .map_err(|_| OnceSecretError::Storage("memory store lock poisoned".into()))
    }
}

impl SecretStore for MemoryStore {
    fn create_table(&self) -> Result<()> {
        Ok(())
    }

    fn insert(&self, handle: &str, key: &SecretKey, ciphertext: &[u8]) -> Result<()> {
        let mut records = self.lock()?;
        match records.entry(handle.to_string()) {
            Entry::Occupied(_) => Err(OnceSecretError::DuplicateHandle),
            Entry::Vacant(slot) => {
                slot.insert(TakenSecret {
                    key: SecretKey::from_slice(key.as_bytes())?,
                    ciphertext: ciphertext.to_vec(),
                });
                Ok(())
            }
        }
    }

    fn take_by_handle(&self, handle: &str) -> Result<Option<TakenSecret>> {
        Ok(self.lock()?.remove(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_removes_the_record() {
        let store = MemoryStore::new();
        store.insert("h1", &SecretKey::generate(), b"ct").unwrap();
        assert!(store.contains("h1").unwrap());

        assert!(store.take_by_handle("h1").unwrap().is_some());
        assert!(store.take_by_handle("h1").unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn duplicate_handle_does_not_overwrite() {
        let store = MemoryStore::new();
        store.insert("h1", &SecretKey::generate(), b"first").unwrap();

        let result = store.insert("h1", &SecretKey::generate(), b"second");
        assert!(matches!(result, Err(OnceSecretError::DuplicateHandle)));

        let taken = store.take_by_handle("h1").unwrap().unwrap();
        assert_eq!(taken.ciphertext, b"first");
    }

    #[test]
    fn poisoned_lock_is_an_error_not_an_empty_store() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.insert("h1", &SecretKey::generate(), b"ct").unwrap();

        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.records.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(OnceSecretError::Storage(_))));
        assert!(matches!(store.is_empty(), Err(OnceSecretError::Storage(_))));
        assert!(matches!(store.contains("h1"), Err(OnceSecretError::Storage(_))));
    }
}
