//! `ApiClient`: the authenticated request pipeline
//!
//! Every request goes through the same three stages:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        ApiClient                          │
//! │                                                           │
//! │  ApiRequest ──► interceptors ──► Transport ──► 2xx ──► Ok │
//! │                 (bearer first)       │                    │
//! │                                      ▼ error              │
//! │                             RefreshCoordinator            │
//! │                        401? refresh once, replay          │
//! │                        else propagate                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers never see a recoverable 401: the pipeline refreshes the token, replays the
//! request and hands back the replay's result. An irrecoverable failure surfaces as a
//! single error.
//!
//! # Example: Basic Usage
//!
//! ```no_run
//! use gymdesk_client::{ApiClient, ClientConfig};
//! use gymdesk_client::auth::InMemoryTokenStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> gymdesk_client::Result<()> {
//! let config = ClientConfig::builder().base_url("http://localhost:3000").build();
//! let client = ApiClient::builder(config)
//!     .token_store(Arc::new(InMemoryTokenStore::with_token("tok1")))
//!     .build()?;
//!
//! let profile: serde_json::Value = client.get("/api/gym/profile").await?.data()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::auth::{InMemoryTokenStore, SharedTokenStore};
use crate::callbacks::SharedRequestInterceptor;
use crate::error::Result;
use crate::interceptor::BearerTokenInterceptor;
use crate::refresh::RefreshCoordinator;
use crate::transport::{ReqwestTransport, SharedTransport};
use crate::types::{ApiRequest, ApiResponse, ClientConfig};

struct ClientInner {
    config: ClientConfig,
    transport: SharedTransport,
    token_store: SharedTokenStore,
    interceptors: Vec<SharedRequestInterceptor>,
    coordinator: RefreshCoordinator,
}

/// Authenticated client for the Gymdesk backend.
///
/// Cheap to clone; clones share the transport, token store and refresh state, so a
/// burst of failures across clones still produces a single refresh call.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    config: ClientConfig,
    token_store: Option<SharedTokenStore>,
    transport: Option<SharedTransport>,
    interceptors: Vec<SharedRequestInterceptor>,
}

impl ApiClientBuilder {
    /// Create a builder
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            token_store: None,
            transport: None,
            interceptors: Vec::new(),
        }
    }

    /// Token store to read from and write refreshed tokens into
    /// (default: an empty [`InMemoryTokenStore`])
    #[must_use]
    pub fn token_store(mut self, token_store: SharedTokenStore) -> Self {
        self.token_store = Some(token_store);
        self
    }

    /// Custom transport (default: [`ReqwestTransport`] built from the config)
    #[must_use]
    pub fn transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Extra pre-request hook, run after the bearer interceptor
    #[must_use]
    pub fn interceptor(mut self, interceptor: SharedRequestInterceptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` if the config is invalid or the default
    /// transport cannot be built.
    pub fn build(self) -> Result<ApiClient> {
        self.config.validate()?;

        let transport: SharedTransport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };
        let token_store = self
            .token_store
            .unwrap_or_else(|| Arc::new(InMemoryTokenStore::new()));

        let mut interceptors: Vec<SharedRequestInterceptor> =
            vec![Arc::new(BearerTokenInterceptor::new(token_store.clone()))];
        interceptors.extend(self.interceptors);

        let coordinator = RefreshCoordinator::new(
            transport.clone(),
            token_store.clone(),
            self.config.exempt_routes.clone(),
            self.config.refresh_path.clone(),
            self.config.refresh_timeout,
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                transport,
                token_store,
                interceptors,
                coordinator,
            }),
        })
    }
}

impl ApiClient {
    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    /// Client with the reqwest transport and an empty in-memory token store
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` if the config is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Client configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Underlying transport
    #[must_use]
    pub fn transport(&self) -> &SharedTransport {
        &self.inner.transport
    }

    /// Token store the pipeline reads from
    #[must_use]
    pub fn token_store(&self) -> &SharedTokenStore {
        &self.inner.token_store
    }

    /// Refresh coordinator, for introspection
    #[must_use]
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    /// Send a request through the full pipeline
    ///
    /// # Errors
    ///
    /// Returns the transport error for non-recoverable failures, the refresh error if a
    /// needed refresh fails, or the replay's error if the replay fails.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        for interceptor in &self.inner.interceptors {
            interceptor.intercept(&mut request);
        }
        tracing::trace!(method = %request.method(), url = %request.url(), "sending request");

        match self.inner.transport.send(&request).await {
            Ok(response) => Ok(response),
            Err(error) => self.inner.coordinator.recover(request, error).await,
        }
    }

    /// `GET url`
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn get(&self, url: &str) -> Result<ApiResponse> {
        self.execute(ApiRequest::get(url)).await
    }

    /// `POST url` with an optional JSON body
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn post(&self, url: &str, body: Option<serde_json::Value>) -> Result<ApiResponse> {
        let request = ApiRequest::post(url);
        let request = match body {
            Some(body) => request.json_value(body),
            None => request,
        };
        self.execute(request).await
    }

    /// `PUT url` with a JSON body
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn put(&self, url: &str, body: serde_json::Value) -> Result<ApiResponse> {
        self.execute(ApiRequest::put(url).json_value(body)).await
    }

    /// `PATCH url` with a JSON body
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn patch(&self, url: &str, body: serde_json::Value) -> Result<ApiResponse> {
        self.execute(ApiRequest::patch(url).json_value(body)).await
    }

    /// `DELETE url`
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn delete(&self, url: &str) -> Result<ApiResponse> {
        self.execute(ApiRequest::delete(url)).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .field("interceptors", &self.inner.interceptors.len())
            .field("coordinator", &self.inner.coordinator)
            .finish_non_exhaustive()
    }
}
