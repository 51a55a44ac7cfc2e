//! JSON-file storage backend.
//!
//! The whole store is a single JSON object on disk:
//!
//! ```text
//! { "token": "5f2b..." }
//! ```
//!
//! Every write rewrites the file. The store holds a handful of keys, so
//! read-modify-write is simpler than anything incremental. New contents
//! go to a sibling `.tmp` file that is then renamed over the store, so a
//! crash mid-write leaves the previous contents intact.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::{Storage, StorageError};

/// A [`Storage`] persisted as a JSON object in a file.
///
/// This is the command-line counterpart of browser local storage. A
/// missing file reads as an empty store. Writes create parent
/// directories. On Unix the file is created owner-only (`0600`) since it
/// holds bearer tokens.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Creates a store backed by the file at `path`. Nothing is touched
    /// on disk until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The sibling file a write goes to before it replaces the store.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("storage"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            StorageError::Corrupt(format!("{}: {e}", self.path.display()))
        })
    }

    async fn write_entries(
        &self,
        entries: &BTreeMap<String, String>,
    ) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(StorageError::Io)?;
            }
        }

        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;

        // `mode` only applies to newly created files, so a leftover temp
        // file from an interrupted write is removed first.
        let temp_path = self.temp_path();
        match tokio::fs::remove_file(&temp_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::Io(e)),
        }
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&temp_path).await.map_err(StorageError::Io)?;
        file.write_all(contents.as_bytes())
            .await
            .map_err(StorageError::Io)?;
        file.sync_all().await.map_err(StorageError::Io)?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(StorageError::Io)?;

        tracing::trace!(path = %self.path.display(), "storage file written");
        Ok(())
    }
}

impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));

        assert_eq!(storage.get("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("s.json");
        let storage = FileStorage::new(&path);

        storage.set("token", "abc").await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_values_survive_a_new_instance() {
        // A fresh FileStorage on the same path is the "page reload".
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");

        FileStorage::new(&path).set("token", "abc").await.unwrap();
        let reloaded = FileStorage::new(&path);

        assert_eq!(reloaded.get("token").await.unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("s.json"));
        storage.set("token", "abc").await.unwrap();
        storage.set("locale", "ar").await.unwrap();

        storage.remove("token").await.unwrap();

        assert_eq!(storage.get("token").await.unwrap(), None);
        assert_eq!(storage.get("locale").await.unwrap().as_deref(), Some("ar"));
    }

    #[tokio::test]
    async fn test_remove_without_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let storage = FileStorage::new(&path);

        storage.remove("token").await.unwrap();

        assert!(!path.exists(), "remove should not create the file");
    }

    #[tokio::test]
    async fn test_garbage_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileStorage::new(&path).get("token").await;

        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        FileStorage::new(&path).set("token", "abc").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rewrite_replaces_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, r#"{"locale":"ar"}"#).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileStorage::new(&path).set("token", "abc").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let storage = FileStorage::new(&path);

        storage.set("token", "abc").await.unwrap();
        storage.remove("token").await.unwrap();

        assert!(!dir.path().join("s.json.tmp").exists());
        let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_temp_file_does_not_affect_reads() {
        // What a crash between writing and renaming leaves behind.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let storage = FileStorage::new(&path);
        storage.set("token", "abc").await.unwrap();
        std::fs::write(dir.path().join("s.json.tmp"), "{\"tok").unwrap();

        assert_eq!(storage.get("token").await.unwrap().as_deref(), Some("abc"));

        storage.set("token", "def").await.unwrap();
        assert_eq!(storage.get("token").await.unwrap().as_deref(), Some("def"));
    }
}
