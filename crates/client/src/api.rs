//! REST API client for the bulk action backend.
//!
//! Wraps `GET /bulk-action` and `GET /bulk-action/{actionId}` using
//! [`reqwest`].

use bulkwatch_core::BulkAction;
use reqwest::{StatusCode, Url};

/// HTTP client for the backend's bulk action endpoints.
#[derive(Clone)]
pub struct BackendApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the initial REST fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (network, DNS, TLS, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The configured base URL cannot be joined with the endpoint path.
    #[error("Invalid backend URL '{0}'")]
    InvalidUrl(String),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend has no bulk action with this public identifier.
    #[error("Bulk action '{0}' not found")]
    NotFound(String),
}

impl BackendApi {
    /// Create a client for the backend at `base_url`, e.g. `http://host:4000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (for shared timeouts and connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every bulk action (`GET /bulk-action`).
    pub async fn list_actions(&self) -> Result<Vec<BulkAction>, FetchError> {
        let url = self.endpoint(&["bulk-action"])?;
        tracing::debug!(%url, "Fetching bulk actions");

        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    /// Fetch one bulk action by its public identifier
    /// (`GET /bulk-action/{actionId}`).
    pub async fn get_action(&self, action_id: &str) -> Result<BulkAction, FetchError> {
        let url = self.endpoint(&["bulk-action", action_id])?;
        tracing::debug!(%url, action_id, "Fetching bulk action");

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(action_id.to_string()));
        }
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        endpoint_url(&self.base_url, segments)
            .ok_or_else(|| FetchError::InvalidUrl(self.base_url.clone()))
    }

    /// Ensure the response has a success status code, returning a
    /// [`FetchError::Api`] with the status and body text otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, FetchError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Append path segments to `base_url`, percent-encoding each one.
///
/// Returns `None` when `base_url` is not an absolute hierarchical URL.
pub(crate) fn endpoint_url(base_url: &str, segments: &[&str]) -> Option<Url> {
    let mut url = Url::parse(base_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}
