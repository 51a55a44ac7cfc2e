//! The seam between the session layer and the portal backend.
//!
//! The session layer doesn't speak HTTP. It defines the [`Gateway`]
//! trait: two async operations, "trade credentials for a token" and
//! "tell the backend this token is done". The real implementation
//! (`HttpGateway` in the `portico` crate) calls the REST API; tests use
//! a hand-written mock.

use std::future::Future;
use std::sync::Arc;

use portico_protocol::{Credentials, LoginResponse, Token};

use crate::GatewayError;

/// Issues and invalidates bearer tokens.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one gateway is shared by every clone of
///   the [`SessionController`](crate::SessionController), and hydration
///   runs on a spawned task.
/// - The returned futures are `Send` for the same reason.
///
/// # Example
///
/// ```rust
/// use portico_protocol::{Actor, Credentials, LoginResponse, Role, Token};
/// use portico_session::{Gateway, GatewayError};
///
/// /// Lets exactly one account in. Tests only.
/// struct OneAccount;
///
/// impl Gateway for OneAccount {
///     async fn authenticate(
///         &self,
///         credentials: &Credentials,
///     ) -> Result<LoginResponse, GatewayError> {
///         if credentials.password != "letmein" {
///             return Err(GatewayError::Rejected("wrong password".into()));
///         }
///         Ok(LoginResponse {
///             token: Token::new("t-1").unwrap(),
///             actor: Actor { role: Role::User, ..Actor::default() },
///         })
///     }
///
///     async fn invalidate(&self, _token: &Token) -> Result<(), GatewayError> {
///         Ok(())
///     }
/// }
/// ```
pub trait Gateway: Send + Sync + 'static {
    /// Exchanges credentials for a token and the account's metadata.
    ///
    /// # Returns
    /// - `Ok(LoginResponse)` — the backend accepted the credentials
    /// - `Err(GatewayError::Rejected)` — the backend refused them
    /// - `Err(GatewayError::Unreachable)` — the backend couldn't be asked
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, GatewayError>> + Send;

    /// Tells the backend the token is no longer in use.
    ///
    /// Best-effort from the caller's point of view: the controller logs a
    /// failure here and signs out locally anyway.
    fn invalidate(
        &self,
        token: &Token,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

impl<G: Gateway> Gateway for Arc<G> {
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, GatewayError>> + Send {
        (**self).authenticate(credentials)
    }

    fn invalidate(
        &self,
        token: &Token,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).invalidate(token)
    }
}
