//! HTTP transport behind the resource gateway.
//!
//! The gateway speaks in [`ApiRequest`]/[`ApiResponse`] pairs and never
//! touches `reqwest` directly, so tests can script the server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

pub use reqwest::{Method, StatusCode};

use crate::error::ClientError;

/// No response was received from the server.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create a transport error with a description of what went wrong.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "request timed out"
        } else if err.is_connect() {
            "could not connect"
        } else {
            "request failed"
        };
        Self::new(format!("{kind}: {err}"))
    }
}

/// One request to the API.
#[derive(Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the configured base URL, starting with `/`.
    pub path: String,
    /// Bearer credential, attached as `Authorization: Bearer <token>`.
    pub bearer: Option<SecretString>,
    /// JSON request body.
    pub body: Option<serde_json::Value>,
}

impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("bearer", &self.bearer.as_ref().map(|_| "[REDACTED]"))
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

impl ApiRequest {
    /// Build a request without body or credential.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a bearer credential.
    #[must_use]
    pub fn with_bearer(mut self, token: SecretString) -> Self {
        self.bearer = Some(token);
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Payload`] if `body` cannot be serialized.
    pub fn with_json<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// A response from the API: status code plus raw body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The server's explanation, from a JSON body's `message` or `error` field.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        ["message", "error"].iter().find_map(|key| {
            value
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
    }

    /// Turn a non-success status into the matching [`ClientError`].
    ///
    /// # Errors
    ///
    /// - 401 becomes [`ClientError::Auth`]
    /// - 403 and 404 become [`ClientError::NotFoundOrForbidden`]
    /// - other 4xx become [`ClientError::Rejected`]
    /// - anything else that is not 2xx becomes [`ClientError::Server`]
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        let status = self.status;
        if status.is_success() {
            return Ok(self);
        }

        let message = self.server_message();
        let fallback = || {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Auth(message.unwrap_or_else(fallback)),
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                ClientError::NotFoundOrForbidden(message.unwrap_or_else(fallback))
            }
            s if s.is_client_error() => ClientError::Rejected {
                status: s.as_u16(),
                message: message.unwrap_or_else(fallback),
            },
            s => ClientError::Server {
                status: s.as_u16(),
                message,
            },
        })
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Payload`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends API requests and returns whatever the server answered.
///
/// Implementations report a [`TransportError`] only when no response was
/// received; every HTTP status, including errors, is a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Create a transport for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wishlist-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL all paths are relative to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join a request path onto the base URL, keeping the base URL's own path.
    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, self.endpoint(&request.path));

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(status = status.as_u16(), "API response received");

        Ok(ApiResponse { status, body })
    }
}
