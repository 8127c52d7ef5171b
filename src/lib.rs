//! # Gymdesk API Client
//!
//! Authenticated HTTP client for the Gymdesk gym-management backend.
//! Async/await, strong typing, tokio-based.
//!
//! Every request carries the current bearer token. When the backend answers 401 the
//! client refreshes the token once (no matter how many requests failed together),
//! replays the failed requests with the new token, and signs the session out if the
//! refresh itself fails.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gymdesk_client::auth::{AuthSession, Role};
//! use gymdesk_client::{ClientConfig, api};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:3000")
//!         .build();
//!     let session = AuthSession::connect(config)?;
//!
//!     if !session.restore().await {
//!         let grant =
//!             api::auth::login(session.client(), Role::Gym, "owner@gym.test", "hunter2").await?;
//!         session.login(grant.access_token, grant.user);
//!     }
//!
//!     let page = api::gym::list_clients(session.client(), 1, "").await?;
//!     println!("{:?}", page.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Features
//!
//! ### 1. Refresh and replay with [`ApiClient`]
//!
//! The client runs each request through its interceptors, sends it, and hands any
//! failure to the [`RefreshCoordinator`]. A 401 on a non-auth route triggers one
//! shared refresh; concurrent 401s queue behind it and are replayed with the same
//! new token.
//!
//! ```no_run
//! # use gymdesk_client::{ApiClient, ClientConfig};
//! # async fn example() -> gymdesk_client::Result<()> {
//! let client = ApiClient::new(ClientConfig::from_env()?)?;
//! let (a, b) = tokio::join!(
//!     client.get("/api/gym/clients"),
//!     client.get("/api/gym/trainers"),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. Custom token storage with [`TokenStore`]
//!
//! The pipeline reads the token on every request and writes refreshed tokens back, so
//! any store works: in memory, an OS keychain, a shared session.
//!
//! ### 3. Pre-request hooks with [`RequestInterceptor`]
//!
//! ```no_run
//! # use gymdesk_client::{ApiClient, ApiRequest, ClientConfig, FnRequestInterceptor};
//! # use std::sync::Arc;
//! # fn example() -> gymdesk_client::Result<()> {
//! let client = ApiClient::builder(ClientConfig::from_env()?)
//!     .interceptor(Arc::new(FnRequestInterceptor::new(|request: &mut ApiRequest| {
//!         request.set_header("X-Dashboard", "web");
//!     })))
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`types`]: Request and response descriptors, configuration, ids and payloads
//! - [`client`]: The request pipeline
//! - [`refresh`]: Single-flight refresh coordinator and exempt routes
//! - [`auth`]: Access token, token stores and the login session
//! - [`api`]: Typed wrappers over the backend's endpoints
//! - [`transport`]: HTTP layer
//! - [`error`]: Error types and handling
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Tokens are never logged; events carry a short SHA-256 fingerprint instead.
//! To see logs, attach a tracing subscriber in your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, ApiError>`](Result):
//!
//! ```no_run
//! # use gymdesk_client::{ApiClient, ApiError, ClientConfig};
//! # async fn example(client: ApiClient) {
//! match client.get("/api/gym/profile").await {
//!     Ok(response) => { /* ... */ }
//!     Err(e) if e.is_unauthorized() => {
//!         eprintln!("session expired, please log in again");
//!     }
//!     Err(e) => {
//!         eprintln!("Error: {}", e);
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod auth;
pub mod callbacks;
pub mod client;
pub mod error;
pub mod interceptor;
pub mod refresh;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use auth::{AccessToken, AuthSession, AuthUser, InMemoryTokenStore, Role, TokenStore};
pub use callbacks::{FnRequestInterceptor, RequestInterceptor, SharedRequestInterceptor};
pub use client::{ApiClient, ApiClientBuilder};
pub use error::{ApiError, Result};
pub use interceptor::BearerTokenInterceptor;
pub use refresh::{AuthExemptRoutes, RefreshCoordinator, RefreshedSession, request_refresh};
pub use transport::{ReqwestTransport, SharedTransport, Transport};
pub use types::{
    ApiEnvelope, ApiRequest, ApiResponse, ClientConfig, ClientConfigBuilder, ClientId, GymId,
    Method, TrainerId,
};

/// Version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
