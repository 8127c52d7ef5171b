//! Client configuration

use std::time::Duration;
use typed_builder::TypedBuilder;

use crate::error::{ApiError, Result};
use crate::refresh::AuthExemptRoutes;

/// Default path of the refresh-token endpoint
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh-token";

/// Default path of the logout endpoint
pub const DEFAULT_LOGOUT_PATH: &str = "/api/auth/logout";

/// Environment variable holding the API base URL
pub const ENV_API_URL: &str = "GYMDESK_API_URL";

/// Environment variable overriding the refresh timeout, in seconds
pub const ENV_REFRESH_TIMEOUT: &str = "GYMDESK_REFRESH_TIMEOUT_SECS";

/// Environment variable overriding the per-request timeout, in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "GYMDESK_REQUEST_TIMEOUT_SECS";

// ============================================================================
// Client Config
// ============================================================================

/// Settings for [`ApiClient`](crate::ApiClient)
///
/// ```
/// use gymdesk_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .base_url("http://localhost:3000")
///     .refresh_timeout(Duration::from_secs(5))
///     .build();
///
/// assert_eq!(config.refresh_path, "/api/auth/refresh-token");
/// ```
#[derive(Debug, Clone, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for ClientConfig"),
    builder_type(doc = "Builder for ClientConfig", vis = "pub"),
    build_method(doc = "Build the ClientConfig")
)]
pub struct ClientConfig {
    /// Scheme and host the request paths are joined onto
    #[builder(setter(into))]
    pub base_url: String,

    /// Path of the refresh-token endpoint
    #[builder(default = DEFAULT_REFRESH_PATH.to_string(), setter(into))]
    pub refresh_path: String,

    /// Path of the logout endpoint
    #[builder(default = DEFAULT_LOGOUT_PATH.to_string(), setter(into))]
    pub logout_path: String,

    /// URL substrings whose 401s never start a refresh
    #[builder(default)]
    pub exempt_routes: AuthExemptRoutes,

    /// Upper bound on one refresh call; expiry counts as a failed refresh
    #[builder(default = ClientConfig::DEFAULT_REFRESH_TIMEOUT)]
    pub refresh_timeout: Duration,

    /// Upper bound on any single request
    #[builder(default = ClientConfig::DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,

    /// `User-Agent` header sent by the reqwest transport
    #[builder(default = format!("gymdesk-client/{}", crate::VERSION), setter(into))]
    pub user_agent: String,
}

impl ClientConfig {
    /// Default refresh timeout (10 seconds)
    pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default request timeout (30 seconds)
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Build a config from `GYMDESK_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` if `GYMDESK_API_URL` is unset or a timeout
    /// variable is not a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::invalid_config(format!("{ENV_API_URL} is not set")))?;

        let seconds = |key: &str, default: Duration| -> Result<Duration> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                    ApiError::invalid_config(format!("{key} must be whole seconds, got {raw:?}"))
                }),
            }
        };

        Ok(Self::builder()
            .base_url(base_url.trim())
            .refresh_timeout(seconds(ENV_REFRESH_TIMEOUT, Self::DEFAULT_REFRESH_TIMEOUT)?)
            .request_timeout(seconds(ENV_REQUEST_TIMEOUT, Self::DEFAULT_REQUEST_TIMEOUT)?)
            .build())
    }

    /// Check that the config can drive a client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` on an empty or non-HTTP base URL or a zero
    /// refresh timeout.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApiError::invalid_config(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.refresh_timeout.is_zero() {
            return Err(ApiError::invalid_config("refresh_timeout must be non-zero"));
        }
        Ok(())
    }
}
