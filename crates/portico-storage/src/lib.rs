//! Durable storage abstraction layer for Portico.
//!
//! Provides the [`Storage`] trait that abstracts over wherever the client
//! keeps values between runs (browser local storage, a file on disk, a
//! plain in-memory map in tests).
//!
//! # Feature Flags
//!
//! - `file` (default) — JSON-file backed storage via `serde_json`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "file")]
mod file;
mod memory;

pub use error::StorageError;
#[cfg(feature = "file")]
pub use file::FileStorage;
pub use memory::{MemoryStorage, UnavailableStorage};

use std::future::Future;

/// A string-keyed store of opaque string values that survives reloads.
///
/// Mirrors the shape of browser local storage: `get`, `set`, `remove`.
/// Keys and values are opaque to the store.
///
/// The methods return `Send` futures so a store can be used from a task
/// spawned on the Tokio thread pool.
pub trait Storage: Send + Sync + 'static {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes the value stored under `key`.
    ///
    /// Removing a key that holds nothing is not an error.
    fn remove(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exercises a backend through the trait only, the way the session
    /// layer uses it.
    async fn set_get_remove<S: Storage>(storage: &S) {
        assert_eq!(storage.get("token").await.unwrap(), None);

        storage.set("token", "abc").await.unwrap();
        assert_eq!(storage.get("token").await.unwrap().as_deref(), Some("abc"));

        storage.set("token", "def").await.unwrap();
        assert_eq!(storage.get("token").await.unwrap().as_deref(), Some("def"));

        storage.remove("token").await.unwrap();
        assert_eq!(storage.get("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage_through_trait() {
        set_get_remove(&MemoryStorage::new()).await;
    }

    #[cfg(feature = "file")]
    #[tokio::test]
    async fn test_file_storage_through_trait() {
        let dir = tempfile::tempdir().unwrap();
        set_get_remove(&FileStorage::new(dir.path().join("session.json"))).await;
    }
}
