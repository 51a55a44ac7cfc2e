//! Portal configuration.
//!
//! [`PortalConfig`] collects every knob of a portal instance. It can be
//! built in code (defaults plus builder setters), deserialized from a
//! config file, or layered from environment variables with
//! [`PortalConfig::from_env`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use portico_router::RouterConfig;
use portico_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::PorticoError;

/// Backend base URL used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Country calling code prepended to local mobile numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "+249";

/// Environment variable overriding [`PortalConfig::api_base_url`].
pub const ENV_API_URL: &str = "PORTICO_API_URL";
/// Environment variable overriding [`PortalConfig::environment`].
pub const ENV_ENVIRONMENT: &str = "PORTICO_ENV";
/// Environment variable switching storage to a file at the given path.
pub const ENV_STORAGE_PATH: &str = "PORTICO_STORAGE_PATH";

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Which deployment the portal runs in.
///
/// Development unlocks the in-process [`DevGateway`](crate::DevGateway)
/// and lets [`DataSource`](crate::DataSource) fall back to sample data
/// when the backend fails. Production does neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl FromStr for Environment {
    type Err = PorticoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(PorticoError::Config(format!(
                "unknown environment {other:?}, expected \"production\" or \"development\""
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Where the session token is kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In process memory. Nothing survives a restart.
    #[default]
    Memory,
    /// A JSON file on disk, created on first write.
    File { path: PathBuf },
}

// ---------------------------------------------------------------------------
// PortalConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Portal`](crate::Portal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Base URL of the REST backend. A trailing slash is ignored.
    ///
    /// Default: `http://localhost:5000`.
    pub api_base_url: String,

    /// Default: [`Environment::Production`].
    pub environment: Environment,

    /// Default: [`StorageConfig::Memory`].
    pub storage: StorageConfig,

    /// Prepended to the mobile number typed into the login form.
    ///
    /// Default: `+249`.
    pub country_code: String,

    pub session: SessionConfig,
    pub router: RouterConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            environment: Environment::default(),
            storage: StorageConfig::default(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            session: SessionConfig::default(),
            router: RouterConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Builds a config from the defaults and the process environment.
    ///
    /// Reads `PORTICO_API_URL`, `PORTICO_ENV`, and `PORTICO_STORAGE_PATH`.
    /// Unset or empty variables leave the default in place.
    ///
    /// # Errors
    /// [`PorticoError::Config`] if `PORTICO_ENV` names no known environment.
    pub fn from_env() -> Result<Self, PorticoError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up by variable name on top of `self`.
    ///
    /// [`from_env`](Self::from_env) passes `std::env::var`; tests pass a map.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, PorticoError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(env) = lookup(ENV_ENVIRONMENT) {
            self.environment = env.parse()?;
        }
        if let Some(path) = lookup(ENV_STORAGE_PATH) {
            self.storage = StorageConfig::File { path: path.into() };
        }
        Ok(self)
    }

    /// The base URL with any trailing slashes removed.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = code.into();
        self
    }

    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn router(mut self, router: RouterConfig) -> Self {
        self.router = router;
        self
    }
}
