//! Data fetching for portal pages.
//!
//! Every page past the login screen loads its content the same way: send
//! the member's bearer token to one [`Endpoint`] and decode the JSON that
//! comes back. [`ApiClient`] does exactly that and nothing more; what the
//! content *means* is up to the page.

use portico_protocol::{Codec, Endpoint, JsonCodec, Method, Token};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Environment;
use crate::http::{error_message, json_body, Backend};
use crate::PorticoError;

/// Shown when a failed request carries no message of its own.
const DEFAULT_API_MESSAGE: &str = "حدث خطأ في الاتصال بالخادم";

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Authenticated JSON client for the content endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    backend: Backend,
}

impl ApiClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    /// [`PorticoError::Config`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, PorticoError> {
        Ok(Self {
            backend: Backend::new(reqwest::Client::new(), base_url)?,
        })
    }

    pub(crate) fn from_backend(backend: Backend) -> Self {
        Self { backend }
    }

    /// `GET`s `endpoint` with the member's token and decodes the body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        token: &Token,
    ) -> Result<T, PorticoError> {
        let request = self.request(Method::Get, endpoint, token);
        self.send(endpoint, request).await
    }

    /// `POST`s `body` as JSON to `endpoint` and decodes the reply.
    pub async fn post<B, T>(
        &self,
        endpoint: &Endpoint,
        token: &Token,
        body: &B,
    ) -> Result<T, PorticoError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let request = json_body(self.request(Method::Post, endpoint, token), body)?;
        self.send(endpoint, request).await
    }

    /// Fetches the document archive, optionally narrowed to one category.
    pub async fn archive<T: DeserializeOwned>(
        &self,
        token: &Token,
        category: Option<&str>,
    ) -> Result<T, PorticoError> {
        let endpoint = Endpoint::Archive;
        let mut request = self.request(Method::Get, &endpoint, token);
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        self.send(&endpoint, request).await
    }

    fn request(&self, method: Method, endpoint: &Endpoint, token: &Token) -> RequestBuilder {
        let url = self.backend.url(endpoint);
        let http = self.backend.http();
        let request = match method {
            Method::Get => http.get(url),
            Method::Post => http.post(url),
        };
        request.bearer_auth(token.as_str())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        request: RequestBuilder,
    ) -> Result<T, PorticoError> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%endpoint, %status, "api response");

        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let bytes = response.bytes().await?;
        Ok(JsonCodec.decode(&bytes)?)
    }
}

async fn api_error(response: Response) -> PorticoError {
    let status = response.status().as_u16();
    let message = error_message(response)
        .await
        .unwrap_or_else(|| DEFAULT_API_MESSAGE.to_string());
    PorticoError::Api { status, message }
}

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Fetches page data, falling back to sample data in development.
///
/// In [`Environment::Development`] a failed fetch is logged and replaced
/// by the caller's fallback, so pages can be worked on without a running
/// backend. In [`Environment::Production`] the error is returned as is.
#[derive(Debug, Clone)]
pub struct DataSource {
    api: ApiClient,
    environment: Environment,
}

impl DataSource {
    pub fn new(api: ApiClient, environment: Environment) -> Self {
        Self { api, environment }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// `GET`s `endpoint`, or returns `fallback()` if that fails in development.
    pub async fn fetch_or<T, F>(
        &self,
        endpoint: &Endpoint,
        token: &Token,
        fallback: F,
    ) -> Result<T, PorticoError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.api.get(endpoint, token).await {
            Ok(data) => Ok(data),
            Err(e) if self.environment.is_development() => {
                tracing::warn!(%endpoint, error = %e, "fetch failed, using sample data");
                Ok(fallback())
            }
            Err(e) => Err(e),
        }
    }
}
