//! Error types for the routing layer.

use crate::Route;

/// Errors that can occur while resolving a navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// No page lives at this path.
    #[error("no route matches {0:?}")]
    UnknownRoute(String),

    /// The configured login route is itself protected, so signed-out
    /// members would be redirected from it again.
    #[error("login route {0} requires a session")]
    ProtectedLoginRoute(Route),
}
