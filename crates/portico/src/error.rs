//! Unified error type for Portico.

use portico_protocol::ProtocolError;
use portico_router::RouterError;
use portico_session::SessionError;
use portico_storage::StorageError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `portico` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates the `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PorticoError {
    /// Durable storage failed (missing directory, bad permissions, corrupt file).
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A response body didn't have the expected shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A login was rejected or the backend couldn't be reached.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The requested path isn't a page of the portal.
    #[error(transparent)]
    Router(#[from] RouterError),

    /// The backend answered a data request with a non-2xx status.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The HTTP request itself failed (connection refused, TLS, timeout).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A required form field was left empty.
    #[error("all fields are required")]
    MissingFields,

    /// The portal configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}
