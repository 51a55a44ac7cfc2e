//! Wire protocol for Portico.
//!
//! This crate defines what the client and the portal backend exchange:
//!
//! - **Types** ([`Token`], [`Credentials`], [`LoginResponse`], [`Role`],
//!   [`Endpoint`], etc.) — request and response bodies and the REST paths
//!   they travel on.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those values are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong in between.
//!
//! The protocol layer knows nothing about sessions or HTTP clients. It
//! only knows shapes.
//!
//! ```text
//! HTTP (bytes) → Protocol (LoginResponse) → Session (token + state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Actor, Credentials, Endpoint, ErrorBody, LoginResponse, Method, Role, Token,
};
