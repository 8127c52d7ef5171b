//! Error types for the Gymdesk API client

use thiserror::Error;

use crate::utils::truncate_for_display;

/// Longest response excerpt quoted in an error message
const MAX_BODY_EXCERPT: usize = 200;

/// Main error type for the Gymdesk API client
///
/// The type is `Clone` because a failed token refresh is delivered, as the same
/// value, to every request that was queued behind it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Server answered with a non-success status code
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Request path or URL
        url: String,
        /// Server-provided message, or a truncated body excerpt
        message: String,
        /// Parsed JSON body, if the server sent one
        body: Option<serde_json::Value>,
    },

    /// Request never produced a response (DNS, connect, TLS, reset, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Request or token refresh took too long
    #[error("Timeout: {0}")]
    Timeout(String),

    /// JSON decode error when reading a response
    #[error("JSON decode error: {0}")]
    JsonDecode(String),

    /// Response parsed but did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The task driving a token refresh was dropped before it settled
    #[error("Token refresh aborted before completion")]
    RefreshAborted,
}

/// Result type alias for Gymdesk client operations
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create a status error, pulling the server's `message` field out of a JSON body
    pub fn status(status: u16, url: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .map(ToString::to_string)
            .unwrap_or_else(|| match &body {
                Some(value) => truncate_for_display(&value.to_string(), MAX_BODY_EXCERPT),
                None => "no response body".to_string(),
            });

        Self::Status {
            status,
            url: url.into(),
            message,
            body,
        }
    }

    /// Create a status error from a non-JSON body
    pub fn status_text(status: u16, url: impl Into<String>, text: &str) -> Self {
        let message = if text.trim().is_empty() {
            "no response body".to_string()
        } else {
            truncate_for_display(text.trim(), MAX_BODY_EXCERPT)
        };

        Self::Status {
            status,
            url: url.into(),
            message,
            body: None,
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a JSON decode error
    pub fn json_decode(msg: impl Into<String>) -> Self {
        Self::JsonDecode(msg.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status carried by this error, if the server responded at all
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 401 response
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// True for a 404 response
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Message the server attached to a failed response
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonDecode(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::JsonDecode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
