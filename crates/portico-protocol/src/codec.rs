//! Codec trait and implementations for serializing wire types.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The HTTP layer reads response bodies as bytes and hands them to a
//! codec, so success bodies and error bodies are decoded the same way
//! and a malformed body surfaces as a [`ProtocolError`] instead of a
//! transport error.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// - `Send + Sync + 'static` → a codec lives inside long-lived clients
///   that are shared across Tokio tasks.
/// - `decode<T: DeserializeOwned>` → the result owns its data, so the
///   response buffer can be dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the portal backend's
/// only format.
///
/// ```rust
/// use portico_protocol::{Codec, JsonCodec, LoginResponse, Role};
///
/// let body = br#"{"token":"abc","actor":{"role":"USER"}}"#;
/// let resp: LoginResponse = JsonCodec.decode(body).unwrap();
/// assert_eq!(resp.token.as_str(), "abc");
/// assert_eq!(resp.actor.role, Role::User);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
