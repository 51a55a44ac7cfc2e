//! # Portico
//!
//! Session core for a member portal.
//!
//! Portico keeps a member signed in across restarts, guards every page
//! behind that sign-in, and talks to the portal's REST backend. Front ends
//! build one [`Portal`] and ask it where each navigation should go.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portico::prelude::*;
//!
//! # async fn run() -> Result<(), PorticoError> {
//! let portal = Portal::builder()
//!     .config(PortalConfig::from_env()?)
//!     .build()?;
//!
//! portal.login(LoginForm::new("900000002", "member123")).await?;
//! let nav = portal.navigate("/bulletin").await?;
//! assert!(nav.decision.is_allowed());
//! # Ok(())
//! # }
//! ```

mod api;
mod config;
mod dev;
mod error;
mod form;
mod http;
mod logging;
mod portal;

pub use api::{ApiClient, DataSource};
pub use config::{
    Environment, PortalConfig, StorageConfig, DEFAULT_API_BASE_URL, DEFAULT_COUNTRY_CODE,
};
pub use dev::{DevAccount, DevGateway};
pub use error::PorticoError;
pub use form::LoginForm;
pub use http::HttpGateway;
pub use logging::{default_filter, init_logging};
pub use portal::{Portal, PortalBuilder, PortalGateway, PortalStorage};

pub use portico_protocol as protocol;
pub use portico_router as router;
pub use portico_session as session;
pub use portico_storage as storage;

/// Everything a front end usually needs, in one import.
pub mod prelude {
    pub use crate::{
        init_logging, ApiClient, DataSource, DevGateway, Environment, LoginForm, Portal,
        PortalConfig, PorticoError, StorageConfig,
    };
    pub use portico_protocol::{Endpoint, Role, Token};
    pub use portico_router::{menu, Navigation, Route, RouteDecision};
    pub use portico_session::{Session, SessionController, SessionError, SessionPhase};
    pub use portico_storage::{FileStorage, MemoryStorage};
}
