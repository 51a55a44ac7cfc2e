//! The portal's route table.
//!
//! Every page the portal can show is a [`Route`]. A route knows its path
//! and whether it needs a signed-in member ([`Access`]). Paths are parsed
//! leniently: `"/archive/"` and `"/archive?category=law"` both resolve to
//! [`Route::Archive`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RouterError;

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not (the login and registration pages).
    Public,
    /// Only a signed-in member. Everyone else is sent to the login page.
    Protected,
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// A page of the portal.
///
/// Serialized as its path, so configuration files can say
/// `login_route = "/auth/login"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Route {
    Home,
    Bulletin,
    Subscriptions,
    PreviousSubscriptions,
    Voting,
    Surveys,
    Archive,
    SubmitReport,
    Profile,
    Login,
    Register,
}

impl Route {
    /// Every route, home first.
    pub const ALL: [Route; 11] = [
        Route::Home,
        Route::Bulletin,
        Route::Subscriptions,
        Route::PreviousSubscriptions,
        Route::Voting,
        Route::Surveys,
        Route::Archive,
        Route::SubmitReport,
        Route::Profile,
        Route::Login,
        Route::Register,
    ];

    /// Returns the route's canonical path.
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Bulletin => "/bulletin",
            Self::Subscriptions => "/subscriptions",
            Self::PreviousSubscriptions => "/previous-subscriptions",
            Self::Voting => "/voting",
            Self::Surveys => "/surveys",
            Self::Archive => "/archive",
            Self::SubmitReport => "/submit-report",
            Self::Profile => "/profile",
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
        }
    }

    pub fn access(self) -> Access {
        match self {
            Self::Login | Self::Register => Access::Public,
            _ => Access::Protected,
        }
    }

    pub fn is_protected(self) -> bool {
        self.access() == Access::Protected
    }

    /// Looks a path up in the route table.
    ///
    /// The query string and any trailing slashes are ignored. Returns
    /// `None` for paths no page lives at.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };

        Self::ALL.into_iter().find(|route| route.path() == normalized)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl TryFrom<String> for Route {
    type Error = RouterError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        Self::from_path(&path).ok_or(RouterError::UnknownRoute(path))
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.path().to_string()
    }
}

// ---------------------------------------------------------------------------
// Home menu
// ---------------------------------------------------------------------------

/// One tile on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub title: &'static str,
    pub route: Route,
}

const MENU: [MenuItem; 8] = [
    MenuItem { title: "النشرة", route: Route::Bulletin },
    MenuItem { title: "الاشتراكات", route: Route::Subscriptions },
    MenuItem { title: "الاشتراكات السابقة", route: Route::PreviousSubscriptions },
    MenuItem { title: "التصويت", route: Route::Voting },
    MenuItem { title: "الاستبيانات", route: Route::Surveys },
    MenuItem { title: "الأرشيف", route: Route::Archive },
    MenuItem { title: "تقديم التقارير", route: Route::SubmitReport },
    MenuItem { title: "الملف الشخصي", route: Route::Profile },
];

/// The home-screen entries, in the order the portal shows them.
pub fn menu() -> &'static [MenuItem] {
    &MENU
}
