//! reqwest-backed transport

use async_trait::async_trait;

use super::Transport;
use crate::error::{ApiError, Result};
use crate::types::{ApiRequest, ApiResponse, ClientConfig};
use crate::utils::join_url;

/// Transport that sends descriptors over HTTP with `reqwest`.
///
/// The underlying client keeps a cookie store, so the http-only refresh cookie set by
/// the login endpoint is sent back to the refresh endpoint automatically.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from client settings
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` if the config is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::invalid_config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(config.base_url.clone(), http_client))
    }

    /// Use an existing `reqwest::Client`
    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    /// Base URL paths are joined onto
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = join_url(&self.base_url, request.url());

        let mut builder = self
            .http_client
            .request(request.method().clone(), &url)
            .header(reqwest::header::ACCEPT, "application/json");

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(url = %url, error = %e, "request failed before a response");
            ApiError::from(e)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            tracing::debug!(url = %request.url(), status, "non-success response");
            return Err(match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(body) => ApiError::status(status, request.url(), Some(body)),
                Err(_) => ApiError::status_text(status, request.url(), &text),
            });
        }

        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                ApiError::json_decode(format!("{} returned non-JSON body: {e}", request.url()))
            })?
        };

        Ok(ApiResponse::new(status, body))
    }
}
