/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store cannot be reached at all (no browser storage,
    /// storage disabled, and so on).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[source] std::io::Error),

    /// The stored data exists but can't be parsed.
    #[error("storage data is corrupt: {0}")]
    Corrupt(String),
}
