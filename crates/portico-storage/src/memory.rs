//! In-process storage backends.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{Storage, StorageError};

/// A [`Storage`] backed by a `HashMap` in memory.
///
/// Nothing survives the process, so this is mostly useful in tests and
/// for sessions that are deliberately not persisted. Clones share the
/// same map, which lets a test keep a handle and inspect what was
/// written through another clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// A [`Storage`] where every operation fails with
/// [`StorageError::Unavailable`].
///
/// Stands in for a host with no durable client storage, e.g. code
/// running outside a browser-like environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStorage;

impl Storage for UnavailableStorage {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("no durable storage on this host".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no durable storage on this host".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no durable storage on this host".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_entry_is_readable() {
        let storage = MemoryStorage::with_entry("token", "abc");
        assert_eq!(storage.get("token").await.unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let a = MemoryStorage::new();
        let b = a.clone();

        a.set("token", "abc").await.unwrap();

        assert_eq!(b.get("token").await.unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let storage = MemoryStorage::new();
        storage.remove("token").await.unwrap();
        storage.remove("token").await.unwrap();
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_unavailable_storage_fails_every_call() {
        let storage = UnavailableStorage;
        assert!(matches!(
            storage.get("token").await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            storage.set("token", "abc").await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            storage.remove("token").await,
            Err(StorageError::Unavailable(_))
        ));
    }
}
