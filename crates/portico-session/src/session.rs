//! Session types: the data structures every page reads.
//!
//! A [`Session`] is a snapshot of the client's authentication state:
//! - WHAT token it holds, if any
//! - WHETHER the persisted token has been loaded yet (hydration)
//! - WHETHER a login or logout is in flight
//! - WHAT went wrong on the last login attempt

use std::fmt;
use std::time::Duration;

use portico_protocol::Token;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The durable-storage key the token is kept under.
    ///
    /// Default: `"token"`.
    pub token_key: String,

    /// Upper bound (in seconds) on a single gateway call. A call that
    /// takes longer counts as [`SessionError::Unreachable`](crate::SessionError::Unreachable).
    ///
    /// Default: `None`, i.e. wait as long as the gateway takes.
    pub gateway_timeout_secs: Option<u64>,
}

impl SessionConfig {
    /// Returns the gateway timeout as a `Duration`, if one is set.
    pub fn gateway_timeout(&self) -> Option<Duration> {
        self.gateway_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "token".to_string(),
            gateway_timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Hydration
// ---------------------------------------------------------------------------

/// Progress of the one-time load of the persisted token.
///
/// ```text
///   NotStarted ──(hydrate)──→ InProgress ──(load done)──→ Complete
/// ```
///
/// Moves forward only. Until it reaches `Complete`, "no token" means
/// "don't know yet", not "signed out".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hydration {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// The lifecycle state of the session, derived from a [`Session`].
///
/// ```text
/// Uninitialized → Hydrating → Authenticated ⇄ Unauthenticated
///                         ↘ Unauthenticated ⇄ Authenticated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Hydrating,
    Authenticated,
    Unauthenticated,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Hydrating => write!(f, "Hydrating"),
            Self::Authenticated => write!(f, "Authenticated"),
            Self::Unauthenticated => write!(f, "Unauthenticated"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A snapshot of the client's authentication state.
///
/// Snapshots are handed out by the
/// [`SessionController`](crate::SessionController); changing a snapshot
/// changes nothing. Only the controller moves the real state forward.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    /// The bearer token, when signed in.
    pub token: Option<Token>,

    /// How far the persisted-token load has got.
    pub hydration: Hydration,

    /// `true` while a login or logout is in flight. Login forms disable
    /// their submit button on this.
    pub is_loading: bool,

    /// User-facing message from the last failed login, cleared when the
    /// next attempt starts.
    pub error: Option<String>,
}

impl Session {
    /// Returns `true` once the persisted token (if any) has been loaded.
    pub fn is_hydrated(&self) -> bool {
        self.hydration == Hydration::Complete
    }

    /// Returns `true` if a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the lifecycle phase this snapshot is in.
    pub fn phase(&self) -> SessionPhase {
        match (self.hydration, &self.token) {
            (Hydration::NotStarted, None) => SessionPhase::Uninitialized,
            (Hydration::InProgress, None) => SessionPhase::Hydrating,
            (_, Some(_)) => SessionPhase::Authenticated,
            (Hydration::Complete, None) => SessionPhase::Unauthenticated,
        }
    }
}
