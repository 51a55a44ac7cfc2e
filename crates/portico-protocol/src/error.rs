//! Error types for the protocol layer.
//!
//! Each crate in Portico defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the shape of data going to or
//! coming from the backend, not in the network or in storage.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, a missing `token` field, or an
    /// HTML error page where JSON was expected.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A token was built from an empty string.
    #[error("token must not be empty")]
    EmptyToken,
}
