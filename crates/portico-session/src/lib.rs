//! Client session management for Portico.
//!
//! This crate handles the lifecycle of the member's sign-in on this
//! client:
//!
//! 1. **Hydration** — loading a token persisted by an earlier run
//!    ([`SessionController::hydrate`], [`SessionStore`])
//! 2. **Login** — trading credentials for a token through a [`Gateway`],
//!    refusing administrative accounts
//! 3. **Logout** — dropping the token locally and, best-effort, at the
//!    backend
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)  ← reads Session snapshots to allow, redirect, or wait
//!     ↕
//! Session Layer (this crate)  ← owns the token and its lifecycle
//!     ↕
//! Storage + Protocol (below)  ← durable key/value store, wire types
//! ```

mod controller;
mod error;
mod gateway;
mod session;
mod store;

pub use controller::SessionController;
pub use error::{GatewayError, Rejection, SessionError};
pub use gateway::Gateway;
pub use session::{Hydration, Session, SessionConfig, SessionPhase};
pub use store::{Durability, SessionStore};
