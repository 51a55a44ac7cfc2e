//! The session store: the token's durable copy.
//!
//! Wraps any [`Storage`] backend with the one key the session needs.
//! The plain methods ([`load`](SessionStore::load),
//! [`save`](SessionStore::save), [`clear`](SessionStore::clear)) never
//! fail: a broken backend is logged and the session carries on in
//! memory. The `try_` variants surface the error for callers that want
//! to see it.

use std::fmt;

use portico_protocol::Token;
use portico_storage::{Storage, StorageError};

use crate::SessionError;

/// Whether a write actually reached durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// The write is on disk / in local storage and survives a reload.
    Durable,
    /// The backend failed; the change exists only in this process.
    MemoryOnly,
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Durable => write!(f, "durable"),
            Self::MemoryOnly => write!(f, "memory-only"),
        }
    }
}

/// Persists the session token under a fixed key.
#[derive(Debug)]
pub struct SessionStore<S: Storage> {
    storage: S,
    key: String,
}

impl<S: Storage> SessionStore<S> {
    /// Creates a store that keeps the token under `key`.
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Returns the underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the key the token is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the persisted token.
    ///
    /// Returns `None` when nothing is stored, when the stored value is an
    /// empty string, or when the backend is unavailable.
    pub async fn load(&self) -> Option<Token> {
        match self.try_load().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted session, starting signed out");
                None
            }
        }
    }

    /// Persists `token`, replacing any previous value.
    pub async fn save(&self, token: &Token) -> Durability {
        match self.try_save(token).await {
            Ok(()) => Durability::Durable,
            Err(e) => {
                tracing::warn!(error = %e, "could not persist session, keeping it in memory only");
                Durability::MemoryOnly
            }
        }
    }

    /// Removes the persisted token. Clearing an empty store is fine.
    pub async fn clear(&self) -> Durability {
        match self.try_clear().await {
            Ok(()) => Durability::Durable,
            Err(e) => {
                tracing::warn!(error = %e, "could not remove persisted session");
                Durability::MemoryOnly
            }
        }
    }

    /// Like [`load`](Self::load), but reports backend failures.
    pub async fn try_load(&self) -> Result<Option<Token>, SessionError> {
        let raw = self.storage.get(&self.key).await.map_err(unavailable)?;
        Ok(raw.and_then(|raw| match Token::new(raw) {
            Ok(token) => Some(token),
            Err(_) => {
                tracing::debug!(key = %self.key, "ignoring empty persisted token");
                None
            }
        }))
    }

    /// Like [`save`](Self::save), but reports backend failures.
    pub async fn try_save(&self, token: &Token) -> Result<(), SessionError> {
        self.storage
            .set(&self.key, token.as_str())
            .await
            .map_err(unavailable)
    }

    /// Like [`clear`](Self::clear), but reports backend failures.
    pub async fn try_clear(&self) -> Result<(), SessionError> {
        self.storage.remove(&self.key).await.map_err(unavailable)
    }
}

fn unavailable(err: StorageError) -> SessionError {
    SessionError::StorageUnavailable(err.to_string())
}
