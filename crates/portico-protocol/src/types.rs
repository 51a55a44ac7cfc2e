//! Wire types exchanged with the portal backend.
//!
//! Everything here is something that is serialized into a request body,
//! parsed out of a response body, or written to durable storage. The
//! JSON field names follow the backend (`mobileNumber`, not
//! `mobile_number`), so most types carry `#[serde(rename_all = ...)]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// An opaque bearer token issued by the backend.
///
/// A `Token` is never empty: the only ways to build one ([`Token::new`],
/// `TryFrom<String>`, and deserialization, which goes through `TryFrom`)
/// reject the empty string. Code holding an `Option<Token>` therefore
/// never has to ask "present but empty?".
///
/// `Debug` and `Display` print a redacted form so a token can be logged
/// with `%token` without leaking it. Use [`Token::as_str`] when the full
/// value is needed (the `Authorization` header, durable storage).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token(String);

impl Token {
    /// Wraps a raw token string.
    ///
    /// # Errors
    /// Returns [`ProtocolError::EmptyToken`] if `raw` is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, ProtocolError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ProtocolError::EmptyToken);
        }
        Ok(Self(raw))
    }

    /// Returns the full token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a form that is safe to log: the first four characters of
    /// long tokens, nothing of short ones.
    pub fn redacted(&self) -> String {
        if self.0.chars().count() > 8 {
            let prefix: String = self.0.chars().take(4).collect();
            format!("{prefix}…")
        } else {
            "…".to_string()
        }
    }
}

impl TryFrom<String> for Token {
    type Error = ProtocolError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.redacted())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// What a member types into the login form.
///
/// Both fields are opaque to the client; validating them is the
/// backend's job. Serialized as `{"mobileNumber": ..., "password": ...}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Full mobile number including the country code, e.g. `+249900000001`.
    pub mobile_number: String,
    pub password: String,
}

impl Credentials {
    pub fn new(mobile_number: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mobile_number: mobile_number.into(),
            password: password.into(),
        }
    }
}

// Hand-written so the password never ends up in a log line.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("mobile_number", &self.mobile_number)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Role / Actor
// ---------------------------------------------------------------------------

/// The role the backend assigns to an authenticated account.
///
/// Parsed case-insensitively. Roles this client doesn't know are kept
/// verbatim in [`Role::Other`] rather than failing the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Portal administrators. They use a separate console and may not
    /// hold a member session.
    Admin,

    /// Ordinary members. Also assumed when the backend omits the role.
    #[default]
    User,

    /// Any other role string.
    Other(String),
}

impl Role {
    /// Returns `true` for roles that are not allowed a member session.
    pub fn is_administrative(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "USER" => Self::User,
            _ => Self::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => "ADMIN".to_string(),
            Role::User => "USER".to_string(),
            Role::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("ADMIN"),
            Self::User => f.write_str("USER"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// Metadata about the account a token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,

    #[serde(default)]
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Body of a successful `POST /api/auth/login`.
///
/// The backend has used both `actor` and `user` for the account object;
/// either key is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: Token,
    #[serde(alias = "user")]
    pub actor: Actor,
}

/// The JSON body the backend sends with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// HTTP method of an [`Endpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A backend REST endpoint.
///
/// The variants carrying a `String` take an id that becomes one path
/// segment; callers building URLs should push [`Endpoint::segments`]
/// through a URL builder so the id is percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    Logout,
    Profile,
    Bulletins,
    Archive,
    Surveys,
    SurveyResponse(String),
    Voting,
    Vote(String),
    ActiveSubscriptions,
    PreviousSubscriptions,
    Subscribe,
    Reports,
}

impl Endpoint {
    /// The path segments after the base URL.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Login => vec!["api", "auth", "login"],
            Self::Register => vec!["api", "auth", "register"],
            Self::Logout => vec!["api", "auth", "logout"],
            Self::Profile => vec!["api", "users", "profile"],
            Self::Bulletins => vec!["api", "content", "bulletins"],
            Self::Archive => vec!["api", "content", "archive"],
            Self::Surveys => vec!["api", "content", "surveys"],
            Self::SurveyResponse(id) => {
                vec!["api", "content", "surveys", id.as_str(), "respond"]
            }
            Self::Voting => vec!["api", "content", "voting"],
            Self::Vote(id) => vec!["api", "content", "voting", id.as_str(), "vote"],
            Self::ActiveSubscriptions => {
                vec!["api", "content", "subscriptions", "active"]
            }
            Self::PreviousSubscriptions => {
                vec!["api", "content", "subscriptions", "previous"]
            }
            Self::Subscribe => vec!["api", "content", "subscriptions", "subscribe"],
            Self::Reports => vec!["api", "content", "reports"],
        }
    }

    /// The path as a string, ids unencoded. For logs and tests.
    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }

    pub fn method(&self) -> Method {
        match self {
            Self::Profile
            | Self::Bulletins
            | Self::Archive
            | Self::Surveys
            | Self::Voting
            | Self::ActiveSubscriptions
            | Self::PreviousSubscriptions => Method::Get,
            Self::Login
            | Self::Register
            | Self::Logout
            | Self::SurveyResponse(_)
            | Self::Vote(_)
            | Self::Subscribe
            | Self::Reports => Method::Post,
        }
    }

    /// Returns `true` if the endpoint expects `Authorization: Bearer`.
    pub fn requires_token(&self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// =========================================================================
// Tests
// =========================================================================
