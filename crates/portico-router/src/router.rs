//! The router: turns a requested path into a guarded navigation.

use portico_session::Session;
use serde::{Deserialize, Serialize};

use crate::{guard, Route, RouteDecision, RouterError};

// ---------------------------------------------------------------------------
// RouterConfig
// ---------------------------------------------------------------------------

/// Configuration for the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Where unauthenticated members are sent.
    ///
    /// Default: [`Route::Login`] (`/auth/login`).
    pub login_route: Route,

    /// Where a member lands after signing in.
    ///
    /// Default: [`Route::Home`] (`/`).
    pub landing_route: Route,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            login_route: Route::Login,
            landing_route: Route::Home,
        }
    }
}

impl RouterConfig {
    pub fn login_route(mut self, route: Route) -> Self {
        self.login_route = route;
        self
    }

    pub fn landing_route(mut self, route: Route) -> Self {
        self.landing_route = route;
        self
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// A resolved navigation: which page was asked for, and what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub decision: RouteDecision,
}

impl Navigation {
    /// Returns the route that ends up on screen, or `None` while the
    /// decision is pending.
    pub fn destination(&self) -> Option<Route> {
        match &self.decision {
            RouteDecision::Allow => Some(self.route),
            RouteDecision::RedirectTo(path) => Route::from_path(path),
            RouteDecision::Pending => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Resolves paths against the route table and guards them.
#[derive(Debug, Clone, Default)]
pub struct Router {
    config: RouterConfig,
}

impl Router {
    /// Creates a router.
    ///
    /// # Errors
    /// [`RouterError::ProtectedLoginRoute`] if `config.login_route` is a
    /// protected page.
    pub fn new(config: RouterConfig) -> Result<Self, RouterError> {
        if config.login_route.is_protected() {
            return Err(RouterError::ProtectedLoginRoute(config.login_route));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Resolves `path` and applies the guard to it.
    ///
    /// # Errors
    /// [`RouterError::UnknownRoute`] if no page lives at `path`.
    pub fn resolve(&self, path: &str, session: &Session) -> Result<Navigation, RouterError> {
        let route =
            Route::from_path(path).ok_or_else(|| RouterError::UnknownRoute(path.to_string()))?;
        Ok(self.navigate(route, session))
    }

    /// Applies the guard to a known route.
    pub fn navigate(&self, route: Route, session: &Session) -> Navigation {
        let decision = guard(route.access(), session, self.config.login_route.path());
        tracing::debug!(%route, ?decision, phase = %session.phase(), "navigation resolved");
        Navigation { route, decision }
    }

    /// Where to go after a successful sign-in.
    pub fn landing(&self) -> Route {
        self.config.landing_route
    }
}
