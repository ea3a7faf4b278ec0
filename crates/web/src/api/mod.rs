//! Agency REST API client.
//!
//! Wraps every call to the backend service. The backend owns authentication,
//! persistence and business rules; this client only moves JSON and classifies
//! failures.
//!
//! # API Reference
//!
//! - Base URL: `AGENCY_API_URL` (e.g. `http://localhost:5000/api/v1`)
//! - Authentication: `Authorization: Bearer <token>` on admin endpoints
//! - Timeout: fixed per client (10 seconds by default), no retries
//!
//! # Error classification
//!
//! | Outcome                    | Error                     |
//! |----------------------------|---------------------------|
//! | no response / timeout      | [`ApiError::Network`]     |
//! | HTTP 401                   | [`ApiError::Unauthorized`]|
//! | other non-2xx              | [`ApiError::Http`]        |
//! | 2xx with unexpected body   | [`ApiError::Decode`]      |

mod admin;
mod public;
mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use url::Url;

/// Default upper bound for a single API call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when calling the agency API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connection failure or timeout).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend rejected the credentials (HTTP 401).
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("session is no longer valid"))]
    Unauthorized { message: Option<String> },

    /// The backend answered with another non-success status.
    #[error("API error: {status} - {}", .message.as_deref().unwrap_or("request failed"))]
    Http { status: u16, message: Option<String> },

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A path segment was refused before any request was made.
    #[error("Invalid path segment: {0}")]
    InvalidPath(String),

    /// The client could not be built.
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Text suitable for showing to a user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Unable to reach the server. Please check your connection and try again."
                    .to_string()
            }
            Self::Unauthorized { .. } => "Session expired. Please login again.".to_string(),
            Self::Http {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Http { status, .. } => format!("Request failed (HTTP {status})."),
            Self::Decode(_) => "Unexpected response from the server.".to_string(),
            Self::InvalidPath(_) => "Not found.".to_string(),
            Self::Config(_) => "The API client is misconfigured.".to_string(),
        }
    }

    /// Reclassify a 401 from an endpoint that was called without a token.
    ///
    /// Such a 401 says nothing about the visitor's session, so it is kept as
    /// a plain HTTP failure.
    #[must_use]
    pub fn without_session(self) -> Self {
        match self {
            Self::Unauthorized { message } => Self::Http {
                status: StatusCode::UNAUTHORIZED.as_u16(),
                message,
            },
            other => other,
        }
    }

    /// Whether this error is an authorization failure.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Agency REST API client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the HTTP client fails to build.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("agency-web/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Base URL every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Path below the base URL built from individually escaped segments.
    ///
    /// `/` and `%` inside a value stay inside that segment, so caller-supplied
    /// values cannot climb to another endpoint. Empty and dot segments are
    /// refused outright.
    pub(crate) fn segment_path(&self, segments: &[&str]) -> Result<String, ApiError> {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(ApiError::InvalidPath(format!("{bad:?}")));
        }
        let mut url = Url::parse(&self.inner.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL: {e}")))?;
        let prefix = url.path().trim_end_matches('/').len();
        url.path_segments_mut()
            .map_err(|()| ApiError::Config("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        url.path()
            .get(prefix..)
            .map(str::to_owned)
            .ok_or_else(|| ApiError::Config("base URL path changed while extending".to_string()))
    }

    /// Issue a request and decode a JSON response.
    ///
    /// Attaches the bearer token when one is given. No retries.
    ///
    /// # Errors
    ///
    /// See the module-level error classification.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let mut builder = self.builder(method, path, token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(path, builder).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    /// Issue a request whose response body is not needed.
    pub(crate) async fn request_unit<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&SecretString>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut builder = self.builder(method, path, token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(path, builder).await.map(|_| ())
    }

    /// GET with query parameters and decode a JSON response.
    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let builder = self.builder(Method::GET, path, token).query(query);
        let response = self.send(path, builder).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    fn builder(&self, method: Method, path: &str, token: Option<&SecretString>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let builder = self
            .inner
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and turn every non-success outcome into an `ApiError`.
    async fn send(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!(path, error = %e, timeout = e.is_timeout(), "API request failed - backend may be down");
            ApiError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;
        tracing::warn!(path, status = status.as_u16(), message = ?message, "API error response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized { message });
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull the `error` (or `message`) field out of an error response body.
async fn error_message(response: reqwest::Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let parsed: ErrorBody = serde_json::from_str(&body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .filter(|message| !message.trim().is_empty())
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:5000/api/v1/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api/v1");
    }

    #[test]
    fn test_user_messages() {
        let err = ApiError::Http {
            status: 400,
            message: Some("Email is required".to_string()),
        };
        assert_eq!(err.user_message(), "Email is required");

        let err = ApiError::Http {
            status: 503,
            message: None,
        };
        assert_eq!(err.user_message(), "Request failed (HTTP 503).");

        let err = ApiError::Unauthorized { message: None };
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Session expired. Please login again.");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "API error: 500 - request failed");

        let err = ApiError::Unauthorized {
            message: Some("Invalid token".to_string()),
        };
        assert_eq!(err.to_string(), "Unauthorized: Invalid token");
    }
}
