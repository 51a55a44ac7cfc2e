//! The route guard: may this session open this page right now?
//!
//! The guard is a pure function of the route's [`Access`] and a
//! [`Session`] snapshot. It never redirects by itself; it returns a
//! [`RouteDecision`] and the caller acts on it.
//!
//! The checks run in a fixed order:
//!
//! ```text
//! not hydrated yet?        → Pending      (don't know who this is yet)
//! protected and no token?  → RedirectTo   (send to the login page)
//! otherwise                → Allow
//! ```
//!
//! Hydration is checked first so a member with a persisted token is never
//! bounced to the login page just because the token hasn't been loaded yet.

use portico_session::Session;

use crate::Access;

/// The outcome of guarding one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the page.
    Allow,
    /// Don't render; go to this path instead.
    RedirectTo(String),
    /// Don't render and don't redirect; show a neutral waiting state
    /// until the session is hydrated.
    Pending,
}

impl RouteDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns the redirect target, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::RedirectTo(path) => Some(path),
            _ => None,
        }
    }
}

/// Decides whether `session` may open a page with the given `access`.
///
/// `login_path` is where unauthenticated members are sent.
pub fn guard(access: Access, session: &Session, login_path: &str) -> RouteDecision {
    if !session.is_hydrated() {
        return RouteDecision::Pending;
    }

    match access {
        Access::Protected if !session.is_authenticated() => {
            RouteDecision::RedirectTo(login_path.to_string())
        }
        _ => RouteDecision::Allow,
    }
}
