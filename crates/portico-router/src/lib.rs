//! Route table and session guard for Portico.
//!
//! Every page of the portal is a [`Route`]. Before a page renders, the
//! [`Router`] resolves the requested path and asks the [`guard`] whether
//! the current [`Session`](portico_session::Session) may see it.
//!
//! # Key types
//!
//! - [`Route`] — the portal's pages and their paths
//! - [`guard`] / [`RouteDecision`] — allow, redirect, or wait
//! - [`Router`] — path → guarded [`Navigation`]
//! - [`RouterConfig`] — login and landing routes
//! - [`menu`] — the home-screen entries

mod error;
mod guard;
mod route;
mod router;

pub use error::RouterError;
pub use guard::{guard, RouteDecision};
pub use route::{menu, Access, MenuItem, Route};
pub use router::{Navigation, Router, RouterConfig};
