//! The session controller: owns the session and every change to it.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Loading the persisted token once at startup (hydration)
//! - Trading credentials for a token (login), refusing admin accounts
//! - Dropping the token locally and at the backend (logout)
//! - Publishing every change so pages can react
//!
//! # Concurrency note
//!
//! A `SessionController` is a handle: cloning it is cheap and every clone
//! talks to the same session. All state changes go through one
//! `tokio::sync::watch::Sender`, whose `send_modify` applies each change
//! atomically. Durable writes take `persist_lock` and publish the new
//! token while still holding it, so a concurrent login and logout can't
//! leave storage saying one thing and memory another.
//!
//! Two logins in flight at once are allowed. Whichever finishes last
//! wins. Forms are expected to disable their submit control while
//! [`Session::is_loading`] is set.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use portico_protocol::{Credentials, LoginResponse, Token};
use portico_storage::Storage;
use tokio::sync::{watch, Mutex};

use crate::{
    Durability, Gateway, GatewayError, Hydration, Rejection, Session,
    SessionConfig, SessionError, SessionPhase, SessionStore,
};

/// Owns the client session and drives its lifecycle.
///
/// ## Lifecycle
///
/// ```text
///  new() ──→ hydrate() ──→ [Authenticated] ⇄ [Unauthenticated]
///    │           │               ↑   login() / logout()   ↑
///    ▼           ▼               └────────────────────────┘
/// [Uninitialized] [Hydrating]
/// ```
pub struct SessionController<S: Storage, G: Gateway> {
    inner: Arc<Inner<S, G>>,
}

struct Inner<S: Storage, G: Gateway> {
    store: SessionStore<S>,
    gateway: G,
    config: SessionConfig,

    /// The single writer for session state. Receivers handed out by
    /// `subscribe()` observe every change.
    state: watch::Sender<Session>,

    /// Flipped by the first `hydrate()` call; later calls only wait.
    hydration_started: AtomicBool,

    /// Held across "write storage, then publish token".
    persist_lock: Mutex<()>,
}

// Written by hand: `#[derive(Clone)]` would demand `S: Clone, G: Clone`.
impl<S: Storage, G: Gateway> Clone for SessionController<S, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Storage, G: Gateway> SessionController<S, G> {
    /// Creates a controller without hydrating it.
    ///
    /// The session starts [`SessionPhase::Uninitialized`]. Call
    /// [`hydrate`](Self::hydrate) (or use [`spawn`](Self::spawn)) before
    /// routing on it.
    pub fn new(storage: S, gateway: G, config: SessionConfig) -> Self {
        let store = SessionStore::new(storage, config.token_key.clone());
        let (state, _) = watch::channel(Session::default());

        Self {
            inner: Arc::new(Inner {
                store,
                gateway,
                config,
                state,
                hydration_started: AtomicBool::new(false),
                persist_lock: Mutex::new(()),
            }),
        }
    }

    /// Creates a controller and starts hydrating it on the Tokio runtime.
    ///
    /// Returns immediately; the snapshot reports
    /// `is_hydrated() == false` until the load finishes. Must be called
    /// from within a Tokio runtime.
    pub fn spawn(storage: S, gateway: G, config: SessionConfig) -> Self {
        let controller = Self::new(storage, gateway, config);
        let hydrating = controller.clone();
        tokio::spawn(async move {
            hydrating.hydrate().await;
        });
        controller
    }

    // =====================================================================
    // Hydration
    // =====================================================================

    /// Loads the persisted token, exactly once per controller.
    ///
    /// The first call reads storage and marks the session hydrated,
    /// whether or not a token was found. Any later or concurrent call
    /// doesn't touch storage again; it just waits for the first one.
    ///
    /// If a login already set a token while the load was running, the
    /// fresher token is kept.
    pub async fn hydrate(&self) {
        if self.inner.hydration_started.swap(true, Ordering::AcqRel) {
            self.wait_hydrated().await;
            return;
        }

        self.inner
            .state
            .send_modify(|s| s.hydration = Hydration::InProgress);

        let _guard = self.inner.persist_lock.lock().await;
        let loaded = self.inner.store.load().await;
        let found = loaded.is_some();

        self.inner.state.send_modify(|s| {
            if s.token.is_none() {
                s.token = loaded;
            }
            s.hydration = Hydration::Complete;
        });

        tracing::info!(
            found_token = found,
            phase = %self.phase(),
            "session hydrated"
        );
    }

    /// Resolves once hydration has completed.
    ///
    /// Returns immediately if it already has. Never completes if nobody
    /// ever calls [`hydrate`](Self::hydrate).
    pub async fn wait_hydrated(&self) {
        let mut rx = self.inner.state.subscribe();
        // `wait_for` only errors if the sender is dropped, and `self`
        // keeps it alive.
        let _ = rx.wait_for(Session::is_hydrated).await;
    }

    // =====================================================================
    // Login / logout
    // =====================================================================

    /// Signs in with `credentials`.
    ///
    /// Sets `is_loading` and clears the previous error, asks the gateway,
    /// and on success persists and publishes the token. Accounts with an
    /// administrative role are refused here even though the gateway
    /// accepted them: their token is neither stored nor published.
    ///
    /// On any failure the session's `error` is set to
    /// [`SessionError::user_message`] and the token is left as it was.
    /// `is_loading` is cleared either way.
    ///
    /// # Errors
    /// - [`SessionError::AuthRejected`] — bad credentials or disallowed role
    /// - [`SessionError::Unreachable`] — gateway down or timed out
    pub async fn login(&self, credentials: Credentials) -> Result<(), SessionError> {
        self.inner.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        tracing::debug!(mobile_number = %credentials.mobile_number, "login started");
        let result = self.try_login(&credentials).await;

        self.inner.state.send_modify(|s| {
            if let Err(e) = &result {
                s.error = Some(e.user_message());
            }
            s.is_loading = false;
        });

        if let Err(e) = &result {
            tracing::info!(error = %e, "login failed");
        }
        result
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<(), SessionError> {
        let LoginResponse { token, actor } = self
            .call_gateway(self.inner.gateway.authenticate(credentials))
            .await?;

        if actor.role.is_administrative() {
            tracing::warn!(
                role = %actor.role,
                "refusing member session for administrative account"
            );
            return Err(SessionError::AuthRejected(Rejection::DisallowedRole(
                actor.role,
            )));
        }

        let durability = {
            let _guard = self.inner.persist_lock.lock().await;
            let durability = self.inner.store.save(&token).await;
            self.inner.state.send_modify(|s| s.token = Some(token));
            durability
        };

        tracing::info!(role = %actor.role, %durability, "signed in");
        Ok(())
    }

    /// Signs out. Never fails.
    ///
    /// If a token is held, the gateway is told about it first; a gateway
    /// failure is logged and otherwise ignored. Then the token is dropped
    /// from memory and from durable storage. `error` is left alone.
    /// Calling this while signed out just makes sure storage is clear.
    ///
    /// The persisted token is loaded first if hydration hasn't finished,
    /// so a token from a previous run is still revoked at the backend.
    pub async fn logout(&self) {
        self.hydrate().await;
        self.inner.state.send_modify(|s| s.is_loading = true);

        let token = self.inner.state.borrow().token.clone();
        if let Some(token) = &token {
            if let Err(e) = self
                .call_gateway(self.inner.gateway.invalidate(token))
                .await
            {
                tracing::warn!(error = %e, "gateway logout failed, clearing local session anyway");
            }
        }

        let durability: Durability = {
            let _guard = self.inner.persist_lock.lock().await;
            let durability = self.inner.store.clear().await;
            self.inner.state.send_modify(|s| {
                s.token = None;
                s.is_loading = false;
            });
            durability
        };

        tracing::info!(had_token = token.is_some(), %durability, "signed out");
    }

    /// Awaits a gateway call, applying the configured timeout.
    async fn call_gateway<T>(
        &self,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, SessionError> {
        let result = match self.inner.config.gateway_timeout() {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(GatewayError::Unreachable(timeout_message(limit))),
            },
            None => call.await,
        };
        result.map_err(SessionError::from)
    }

    // =====================================================================
    // Reads
    // =====================================================================

    /// Returns a copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Returns a receiver that sees every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Returns the current token, if signed in.
    pub fn token(&self) -> Option<Token> {
        self.inner.state.borrow().token.clone()
    }

    pub fn is_hydrated(&self) -> bool {
        self.inner.state.borrow().is_hydrated()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    /// Returns the message from the last failed login, if any.
    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Returns the session store, e.g. to inspect the storage backend.
    pub fn store(&self) -> &SessionStore<S> {
        &self.inner.store
    }
}

fn timeout_message(limit: Duration) -> String {
    format!("no response within {}s", limit.as_secs())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionController`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //! Full scenarios across hydration, login, and logout live in
    //! `tests/lifecycle.rs`; these cover the controller's internals.

    use portico_protocol::{Actor, Role};
    use portico_storage::MemoryStorage;

    use super::*;

    /// Answers every login with a fixed response after an optional delay.
    struct SlowGateway {
        delay: Duration,
    }

    impl Gateway for SlowGateway {
        async fn authenticate(
            &self,
            _credentials: &Credentials,
        ) -> Result<LoginResponse, GatewayError> {
            tokio::time::sleep(self.delay).await;
            Ok(LoginResponse {
                token: Token::new("slow-token").unwrap(),
                actor: Actor {
                    role: Role::User,
                    ..Actor::default()
                },
            })
        }

        async fn invalidate(&self, _token: &Token) -> Result<(), GatewayError> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }
    }

    fn controller(
        delay: Duration,
        timeout_secs: Option<u64>,
    ) -> SessionController<MemoryStorage, SlowGateway> {
        SessionController::new(
            MemoryStorage::new(),
            SlowGateway { delay },
            SessionConfig {
                gateway_timeout_secs: timeout_secs,
                ..SessionConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_clones_share_one_session() {
        let a = controller(Duration::ZERO, None);
        let b = a.clone();

        a.hydrate().await;

        assert!(b.is_hydrated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_times_out_as_unreachable() {
        let ctl = controller(Duration::from_secs(60), Some(5));
        ctl.hydrate().await;

        let result = ctl.login(Credentials::new("+249900000001", "pw")).await;

        assert!(matches!(result, Err(SessionError::Unreachable(ref m)) if m.contains("5s")));
        assert_eq!(ctl.token(), None);
        assert!(ctl.error().is_some());
        assert!(!ctl.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_within_timeout_succeeds() {
        let ctl = controller(Duration::from_secs(1), Some(5));
        ctl.hydrate().await;

        ctl.login(Credentials::new("+249900000001", "pw")).await.unwrap();

        assert_eq!(ctl.token().unwrap().as_str(), "slow-token");
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_timeout_still_clears_session() {
        let ctl = SessionController::new(
            MemoryStorage::new(),
            SlowGateway {
                delay: Duration::from_secs(60),
            },
            SessionConfig {
                gateway_timeout_secs: Some(5),
                ..SessionConfig::default()
            },
        );
        ctl.hydrate().await;
        // Sign in through a fast path: write the token as hydration would.
        ctl.inner
            .state
            .send_modify(|s| s.token = Some(Token::new("abc").unwrap()));

        ctl.logout().await;

        assert_eq!(ctl.token(), None);
        assert!(!ctl.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_loading_visible_while_login_in_flight() {
        let ctl = controller(Duration::from_secs(2), None);
        ctl.hydrate().await;
        let mut rx = ctl.subscribe();

        let login = {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.login(Credentials::new("+249900000001", "pw")).await })
        };

        rx.wait_for(|s| s.is_loading).await.unwrap();
        assert!(ctl.is_loading());

        login.await.unwrap().unwrap();
        assert!(!ctl.is_loading());
    }
}
