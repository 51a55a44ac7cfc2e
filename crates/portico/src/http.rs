//! The HTTP gateway: login and logout against the REST backend.
//!
//! [`HttpGateway`] implements [`Gateway`] with `reqwest`. It is the only
//! place that knows how the backend's status codes map onto "the backend
//! said no" versus "the backend couldn't be asked":
//!
//! ```text
//! 2xx                      → Ok (body decoded as LoginResponse)
//! 400 401 403 404 422      → GatewayError::Rejected(backend message)
//! any other status         → GatewayError::Unreachable
//! connect / read / decode  → GatewayError::Unreachable
//! ```

use portico_protocol::{
    Codec, Credentials, Endpoint, ErrorBody, JsonCodec, LoginResponse, ProtocolError, Token,
};
use portico_session::{Gateway, GatewayError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;

use crate::PorticoError;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// A base URL plus a shared `reqwest` client.
///
/// Both [`HttpGateway`] and [`ApiClient`](crate::ApiClient) hold one; they
/// share the connection pool when built from the same portal.
#[derive(Debug, Clone)]
pub(crate) struct Backend {
    http: Client,
    base: Url,
}

impl Backend {
    pub(crate) fn new(http: Client, base_url: &str) -> Result<Self, PorticoError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(trimmed)
            .map_err(|e| PorticoError::Config(format!("invalid api base url {trimmed:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(PorticoError::Config(format!(
                "api base url {trimmed:?} cannot carry a path"
            )));
        }
        Ok(Self { http, base })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn base(&self) -> &Url {
        &self.base
    }

    /// The absolute URL of `endpoint`, ids percent-encoded.
    pub(crate) fn url(&self, endpoint: &Endpoint) -> Url {
        let mut url = self.base.clone();
        // `new` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(endpoint.segments());
        }
        url
    }
}

/// Attaches `value` as a JSON request body, encoded with [`JsonCodec`]
/// so requests and responses go through the same codec.
pub(crate) fn json_body<T: Serialize>(
    request: RequestBuilder,
    value: &T,
) -> Result<RequestBuilder, ProtocolError> {
    let bytes = JsonCodec.encode(value)?;
    Ok(request.header(CONTENT_TYPE, "application/json").body(bytes))
}

/// Reads a non-2xx body for its `message`, if it has one.
pub(crate) async fn error_message(response: Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    JsonCodec
        .decode::<ErrorBody>(&bytes)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
}

/// Statuses the backend uses to refuse a request it understood.
fn is_rejection(status: StatusCode) -> bool {
    matches!(status.as_u16(), 400 | 401 | 403 | 404 | 422)
}

async fn classify(response: Response) -> GatewayError {
    let status = response.status();
    let message = error_message(response).await;

    if is_rejection(status) {
        GatewayError::Rejected(message.unwrap_or_default())
    } else {
        GatewayError::Unreachable(match message {
            Some(message) => format!("backend returned {status}: {message}"),
            None => format!("backend returned {status}"),
        })
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Unreachable(err.to_string())
}

// ---------------------------------------------------------------------------
// HttpGateway
// ---------------------------------------------------------------------------

/// A [`Gateway`] that talks to the portal backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    backend: Backend,
}

impl HttpGateway {
    /// Creates a gateway for the backend at `base_url`.
    ///
    /// # Errors
    /// [`PorticoError::Config`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, PorticoError> {
        Ok(Self {
            backend: Backend::new(Client::new(), base_url)?,
        })
    }

    pub(crate) fn from_backend(backend: Backend) -> Self {
        Self { backend }
    }

    pub fn base_url(&self) -> &str {
        self.backend.base().as_str()
    }
}

impl Gateway for HttpGateway {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<LoginResponse, GatewayError> {
        let url = self.backend.url(&Endpoint::Login);
        tracing::debug!(%url, "posting credentials");

        let request = json_body(self.backend.http().post(url), credentials)
            .map_err(|e| GatewayError::Unreachable(format!("could not encode credentials: {e}")))?;
        let response = request
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(classify(response).await);
        }

        let bytes = response.bytes().await.map_err(transport)?;
        JsonCodec
            .decode::<LoginResponse>(&bytes)
            .map_err(|e| GatewayError::Unreachable(format!("unexpected login response: {e}")))
    }

    async fn invalidate(&self, token: &Token) -> Result<(), GatewayError> {
        let url = self.backend.url(&Endpoint::Logout);
        tracing::debug!(%url, %token, "invalidating token");

        let response = self
            .backend
            .http()
            .post(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(classify(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let gateway = HttpGateway::new("http://localhost:5000/").unwrap();
        let url = gateway.backend.url(&Endpoint::Login);
        assert_eq!(url.as_str(), "http://localhost:5000/api/auth/login");
    }

    #[test]
    fn test_new_keeps_base_path_prefix() {
        let backend = Backend::new(Client::new(), "https://example.org/portal/").unwrap();
        assert_eq!(
            backend.url(&Endpoint::Bulletins).as_str(),
            "https://example.org/portal/api/content/bulletins"
        );
    }

    #[test]
    fn test_url_percent_encodes_ids() {
        let backend = Backend::new(Client::new(), "http://localhost:5000").unwrap();
        let url = backend.url(&Endpoint::Vote("a b/c".into()));
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/content/voting/a%20b%2Fc/vote"
        );
    }

    #[test]
    fn test_new_rejects_relative_url() {
        assert!(matches!(
            HttpGateway::new("localhost"),
            Err(PorticoError::Config(_))
        ));
        assert!(matches!(
            HttpGateway::new("mailto:someone@example.org"),
            Err(PorticoError::Config(_))
        ));
    }

    #[test]
    fn test_json_body_encodes_with_codec() {
        let request = json_body(
            Client::new().post("http://localhost:5000/api/auth/login"),
            &Credentials::new("+249900000002", "member123"),
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(
            body,
            br#"{"mobileNumber":"+249900000002","password":"member123"}"#
        );
    }

    #[test]
    fn test_is_rejection_status_set() {
        for code in [400, 401, 403, 404, 422] {
            assert!(is_rejection(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [405, 429, 500, 502, 503] {
            assert!(!is_rejection(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }
}
