//! `Portal` builder and facade.
//!
//! This is the entry point for a portal front end. It ties all the layers
//! together: storage → session → router, with the HTTP backend (or the
//! development gateway) underneath the session.
//!
//! ```text
//! PortalConfig ──→ PortalBuilder::build() ──→ Portal
//!                                              ├─ SessionController (hydrating in the background)
//!                                              ├─ Router
//!                                              └─ ApiClient / DataSource
//! ```

use portico_protocol::{Credentials, LoginResponse, Token};
use portico_router::{Navigation, Route, Router};
use portico_session::{Gateway, GatewayError, Session, SessionController};
use portico_storage::{FileStorage, MemoryStorage, Storage, StorageError, UnavailableStorage};

use crate::api::{ApiClient, DataSource};
use crate::config::{PortalConfig, StorageConfig};
use crate::dev::DevGateway;
use crate::form::LoginForm;
use crate::http::{Backend, HttpGateway};
use crate::PorticoError;

// ---------------------------------------------------------------------------
// Storage and gateway selected at runtime
// ---------------------------------------------------------------------------

/// The storage backend a portal runs on, chosen from [`StorageConfig`].
#[derive(Debug)]
pub enum PortalStorage {
    Memory(MemoryStorage),
    File(FileStorage),
    /// Storage that always fails. The session runs memory-only.
    Unavailable(UnavailableStorage),
}

impl PortalStorage {
    fn from_config(config: &StorageConfig) -> Self {
        match config {
            StorageConfig::Memory => Self::Memory(MemoryStorage::new()),
            StorageConfig::File { path } => Self::File(FileStorage::new(path)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

impl From<MemoryStorage> for PortalStorage {
    fn from(storage: MemoryStorage) -> Self {
        Self::Memory(storage)
    }
}

impl From<FileStorage> for PortalStorage {
    fn from(storage: FileStorage) -> Self {
        Self::File(storage)
    }
}

impl From<UnavailableStorage> for PortalStorage {
    fn from(storage: UnavailableStorage) -> Self {
        Self::Unavailable(storage)
    }
}

impl Storage for PortalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Memory(s) => s.get(key).await,
            Self::File(s) => s.get(key).await,
            Self::Unavailable(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Memory(s) => s.set(key, value).await,
            Self::File(s) => s.set(key, value).await,
            Self::Unavailable(s) => s.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Memory(s) => s.remove(key).await,
            Self::File(s) => s.remove(key).await,
            Self::Unavailable(s) => s.remove(key).await,
        }
    }
}

/// The gateway a portal signs in through.
#[derive(Debug)]
pub enum PortalGateway {
    Http(HttpGateway),
    Dev(DevGateway),
}

impl Gateway for PortalGateway {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse, GatewayError> {
        match self {
            Self::Http(g) => g.authenticate(credentials).await,
            Self::Dev(g) => g.authenticate(credentials).await,
        }
    }

    async fn invalidate(&self, token: &Token) -> Result<(), GatewayError> {
        match self {
            Self::Http(g) => g.invalidate(token).await,
            Self::Dev(g) => g.invalidate(token).await,
        }
    }
}

// ---------------------------------------------------------------------------
// PortalBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting a [`Portal`].
///
/// # Example
///
/// ```rust,no_run
/// use portico::prelude::*;
///
/// # async fn run() -> Result<(), PorticoError> {
/// let portal = Portal::builder()
///     .config(PortalConfig::from_env()?)
///     .build()?;
///
/// let nav = portal.navigate("/bulletin").await?;
/// println!("{:?}", nav.decision);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct PortalBuilder {
    config: PortalConfig,
    storage: Option<PortalStorage>,
    dev_gateway: Option<DevGateway>,
}

impl PortalBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PortalConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `storage` instead of the one named in the configuration.
    pub fn storage(mut self, storage: impl Into<PortalStorage>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    /// Signs in through `gateway` instead of the HTTP backend.
    ///
    /// Only accepted when the configuration's environment is development.
    pub fn dev_gateway(mut self, gateway: DevGateway) -> Self {
        self.dev_gateway = Some(gateway);
        self
    }

    /// Builds the portal and starts hydrating its session.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// - [`PorticoError::Config`] if the API base URL is invalid or a
    ///   development gateway was supplied outside development
    /// - [`PorticoError::Router`] if the configured login route is a
    ///   protected page
    pub fn build(self) -> Result<Portal, PorticoError> {
        let config = self.config;
        let backend = Backend::new(reqwest::Client::new(), &config.api_base_url)?;
        let router = Router::new(config.router.clone())?;

        let gateway = match self.dev_gateway {
            Some(_) if !config.environment.is_development() => {
                return Err(PorticoError::Config(format!(
                    "the development gateway cannot be used in {}",
                    config.environment
                )));
            }
            Some(dev) => PortalGateway::Dev(dev),
            None => PortalGateway::Http(HttpGateway::from_backend(backend.clone())),
        };

        let storage = self
            .storage
            .unwrap_or_else(|| PortalStorage::from_config(&config.storage));

        tracing::info!(
            environment = %config.environment,
            api = %backend.base(),
            storage = storage.kind(),
            "starting portal"
        );

        let session = SessionController::spawn(storage, gateway, config.session.clone());
        let api = ApiClient::from_backend(backend);

        Ok(Portal {
            config,
            session,
            router,
            api,
        })
    }
}

// ---------------------------------------------------------------------------
// Portal
// ---------------------------------------------------------------------------

/// A running portal client: one session, one router, one API client.
///
/// Cloning is cheap; clones share the session.
#[derive(Clone)]
pub struct Portal {
    config: PortalConfig,
    session: SessionController<PortalStorage, PortalGateway>,
    router: Router,
    api: ApiClient,
}

impl Portal {
    /// Creates a new builder.
    pub fn builder() -> PortalBuilder {
        PortalBuilder::new()
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// The session controller, for pages that watch the session directly.
    pub fn session(&self) -> &SessionController<PortalStorage, PortalGateway> {
        &self.session
    }

    pub fn snapshot(&self) -> Session {
        self.session.snapshot()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// A data source that honours this portal's environment.
    pub fn data_source(&self) -> DataSource {
        DataSource::new(self.api.clone(), self.config.environment)
    }

    /// Resolves `path` once the session is hydrated.
    ///
    /// Waiting first means a persisted token is always seen, so this never
    /// returns [`RouteDecision::Pending`](portico_router::RouteDecision::Pending).
    ///
    /// # Errors
    /// [`PorticoError::Router`] if no page lives at `path`.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, PorticoError> {
        self.session.wait_hydrated().await;
        Ok(self.router.resolve(path, &self.session.snapshot())?)
    }

    /// Signs in with the login form and returns where to go next.
    ///
    /// # Errors
    /// - [`PorticoError::MissingFields`] if the form is incomplete
    /// - [`PorticoError::Session`] if the login was refused or the backend
    ///   couldn't be reached; the message is also in the session's `error`
    pub async fn login(&self, form: LoginForm) -> Result<Route, PorticoError> {
        let credentials = form.into_credentials(&self.config.country_code)?;
        self.session.login(credentials).await?;
        Ok(self.router.landing())
    }

    /// Signs out and returns the login route.
    pub async fn logout(&self) -> Route {
        self.session.logout().await;
        self.config.router.login_route
    }

    /// The current token, waiting for hydration first.
    pub async fn token(&self) -> Option<Token> {
        self.session.wait_hydrated().await;
        self.session.token()
    }
}

#[cfg(test)]
mod tests {
    use portico_router::{RouteDecision, RouterConfig, RouterError};
    use portico_session::SessionError;

    use crate::config::Environment;

    use super::*;

    fn dev_config() -> PortalConfig {
        PortalConfig::default().environment(Environment::Development)
    }

    #[tokio::test]
    async fn test_build_dev_gateway_in_production_errors() {
        let result = Portal::builder()
            .dev_gateway(DevGateway::default())
            .build();
        assert!(matches!(result, Err(PorticoError::Config(ref m)) if m.contains("production")));
    }

    #[tokio::test]
    async fn test_build_invalid_base_url_errors() {
        let result = Portal::builder()
            .config(PortalConfig::default().api_base_url("not a url"))
            .build();
        assert!(matches!(result, Err(PorticoError::Config(_))));
    }

    #[tokio::test]
    async fn test_build_protected_login_route_errors() {
        let config = PortalConfig::default()
            .router(RouterConfig::default().login_route(Route::Profile));

        let result = Portal::builder().config(config).build();

        assert!(matches!(
            result,
            Err(PorticoError::Router(RouterError::ProtectedLoginRoute(Route::Profile)))
        ));
    }

    #[tokio::test]
    async fn test_navigate_waits_for_hydration() {
        let storage = MemoryStorage::with_entry("token", "persisted");
        let portal = Portal::builder()
            .config(dev_config())
            .storage(storage)
            .dev_gateway(DevGateway::default())
            .build()
            .unwrap();

        let nav = portal.navigate("/profile").await.unwrap();

        assert_eq!(nav.decision, RouteDecision::Allow);
    }

    #[tokio::test]
    async fn test_login_member_lands_on_home() {
        let portal = Portal::builder()
            .config(dev_config())
            .dev_gateway(DevGateway::default())
            .build()
            .unwrap();

        let landing = portal
            .login(LoginForm::new("900000002", "member123"))
            .await
            .unwrap();

        assert_eq!(landing, Route::Home);
        assert!(portal.token().await.is_some());
    }

    #[tokio::test]
    async fn test_login_admin_is_refused() {
        let portal = Portal::builder()
            .config(dev_config())
            .dev_gateway(DevGateway::default())
            .build()
            .unwrap();

        let result = portal.login(LoginForm::new("900000001", "admin123")).await;

        assert!(matches!(
            result,
            Err(PorticoError::Session(SessionError::AuthRejected(_)))
        ));
        assert_eq!(portal.token().await, None);
        assert!(portal.snapshot().error.is_some());
    }

    #[tokio::test]
    async fn test_login_empty_form_never_reaches_gateway() {
        let portal = Portal::builder()
            .config(dev_config())
            .dev_gateway(DevGateway::default())
            .build()
            .unwrap();

        let result = portal.login(LoginForm::new("", "")).await;

        assert!(matches!(result, Err(PorticoError::MissingFields)));
        assert_eq!(portal.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_logout_returns_login_route() {
        let portal = Portal::builder()
            .config(dev_config())
            .dev_gateway(DevGateway::default())
            .build()
            .unwrap();
        portal
            .login(LoginForm::new("900000002", "member123"))
            .await
            .unwrap();

        assert_eq!(portal.logout().await, Route::Login);
        let nav = portal.navigate("/").await.unwrap();
        assert_eq!(nav.decision.redirect_target(), Some("/auth/login"));
    }

    #[tokio::test]
    async fn test_unavailable_storage_still_signs_in() {
        let portal = Portal::builder()
            .config(dev_config())
            .storage(UnavailableStorage)
            .dev_gateway(DevGateway::default())
            .build()
            .unwrap();

        portal
            .login(LoginForm::new("900000002", "member123"))
            .await
            .unwrap();

        assert!(portal.navigate("/voting").await.unwrap().decision.is_allowed());
    }
}
