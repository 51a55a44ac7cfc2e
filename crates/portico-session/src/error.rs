//! Error types for the session layer.

use portico_protocol::Role;

/// Errors a [`Gateway`](crate::Gateway) reports back to the controller.
///
/// The controller only needs to tell "the backend
/// said no" apart from "the backend couldn't be asked".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The backend answered and refused the request (bad credentials,
    /// expired token). The string is the backend's message, if any.
    #[error("rejected by gateway: {0}")]
    Rejected(String),

    /// The backend could not be reached or answered with garbage.
    #[error("gateway unreachable: {0}")]
    Unreachable(String),
}

/// Why a login was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The backend refused the mobile number / password pair.
    #[error("{0}")]
    BadCredentials(String),

    /// The backend accepted the credentials but the account's role may
    /// not hold a member session.
    #[error("role {0} may not sign in to the member portal")]
    DisallowedRole(Role),
}

/// Errors that can occur during the session lifecycle.
///
/// Nothing here is fatal: the worst case is a member left signed out
/// with a message on screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Login refused, either by the backend or locally because of the
    /// account's role. The member can correct this.
    #[error("authentication rejected: {0}")]
    AuthRejected(Rejection),

    /// The gateway could not be reached (network down, timeout, 5xx).
    /// The member can retry.
    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    /// Durable storage is inaccessible. The session keeps working in
    /// memory only.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl SessionError {
    /// The message shown to the member and mirrored into
    /// [`Session::error`](crate::Session::error).
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRejected(Rejection::BadCredentials(msg)) if !msg.is_empty() => {
                msg.clone()
            }
            Self::AuthRejected(Rejection::BadCredentials(_)) => {
                "Invalid mobile number or password.".to_string()
            }
            Self::AuthRejected(Rejection::DisallowedRole(_)) => {
                "Administrator accounts cannot sign in to the member portal.".to_string()
            }
            Self::Unreachable(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
            Self::StorageUnavailable(_) => {
                "Your session could not be saved on this device.".to_string()
            }
        }
    }
}

impl From<GatewayError> for SessionError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected(msg) => {
                Self::AuthRejected(Rejection::BadCredentials(msg))
            }
            GatewayError::Unreachable(msg) => Self::Unreachable(msg),
        }
    }
}
