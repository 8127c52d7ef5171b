//! Transport layer for sending request descriptors
//!
//! The pipeline only needs one capability from the wire: send a descriptor and get
//! a 2xx response back, or an error. Non-2xx statuses are errors
//! ([`ApiError::Status`](crate::ApiError::Status)) so the refresh coordinator can
//! inspect them. Descriptors are borrowed, which lets the caller re-send the same
//! request after a token refresh.

pub mod http;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{ApiRequest, ApiResponse};

/// Transport trait for talking to the Gymdesk backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request
    ///
    /// # Errors
    /// Returns `ApiError::Status` for non-2xx responses, and network, timeout or
    /// decode errors when no usable response was received.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        (**self).send(request).await
    }
}

/// Type alias for a shared transport.
pub type SharedTransport = Arc<dyn Transport>;

pub use http::ReqwestTransport;
