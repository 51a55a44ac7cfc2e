//! An in-process gateway for development.
//!
//! [`DevGateway`] answers logins from a fixed account table and issues
//! random tokens, so the portal can be run and demoed without the real
//! backend. [`PortalBuilder`](crate::PortalBuilder) refuses it outside
//! [`Environment::Development`](crate::Environment::Development).

use std::collections::HashSet;
use std::sync::Mutex;

use portico_protocol::{Actor, Credentials, LoginResponse, Role, Token};
use portico_session::{Gateway, GatewayError};
use rand::Rng;

/// One account the development gateway knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevAccount {
    pub mobile_number: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

impl DevAccount {
    pub fn new(
        mobile_number: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            mobile_number: mobile_number.into(),
            password: password.into(),
            name: name.into(),
            role,
        }
    }
}

/// A [`Gateway`] backed by an in-memory account table.
#[derive(Debug)]
pub struct DevGateway {
    accounts: Vec<DevAccount>,
    /// Tokens handed out and not yet invalidated.
    issued: Mutex<HashSet<String>>,
}

impl DevGateway {
    pub fn new(accounts: Vec<DevAccount>) -> Self {
        Self {
            accounts,
            issued: Mutex::new(HashSet::new()),
        }
    }

    pub fn accounts(&self) -> &[DevAccount] {
        &self.accounts
    }

    /// Returns `true` if `token` was issued here and not invalidated.
    pub fn is_live(&self, token: &Token) -> bool {
        self.issued
            .lock()
            .map(|issued| issued.contains(token.as_str()))
            .unwrap_or(false)
    }

    fn find(&self, credentials: &Credentials) -> Option<&DevAccount> {
        self.accounts.iter().find(|account| {
            account.mobile_number == credentials.mobile_number
                && account.password == credentials.password
        })
    }
}

impl Default for DevGateway {
    /// The two sample accounts: an administrator (refused by the
    /// session layer) and an ordinary member.
    fn default() -> Self {
        Self::new(vec![
            DevAccount::new("+249900000001", "admin123", "مدير النظام", Role::Admin),
            DevAccount::new("+249900000002", "member123", "عضو تجريبي", Role::User),
        ])
    }
}

impl Gateway for DevGateway {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse, GatewayError> {
        let account = self
            .find(credentials)
            .ok_or_else(|| GatewayError::Rejected(String::new()))?;

        let raw = generate_token();
        let token = Token::new(raw.clone())
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;
        self.issued
            .lock()
            .map_err(|_| GatewayError::Unreachable("token table poisoned".into()))?
            .insert(raw);

        tracing::debug!(mobile_number = %account.mobile_number, role = %account.role, "dev login");
        Ok(LoginResponse {
            token,
            actor: Actor {
                name: Some(account.name.clone()),
                mobile_number: Some(account.mobile_number.clone()),
                role: account.role.clone(),
            },
        })
    }

    async fn invalidate(&self, token: &Token) -> Result<(), GatewayError> {
        let removed = self
            .issued
            .lock()
            .map_err(|_| GatewayError::Unreachable("token table poisoned".into()))?
            .remove(token.as_str());

        if removed {
            Ok(())
        } else {
            Err(GatewayError::Rejected("unknown token".into()))
        }
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
