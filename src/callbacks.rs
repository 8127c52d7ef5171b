//! Trait-based pre-request hooks.
//!
//! Every request passes through the client's interceptors, in registration order,
//! right before it reaches the transport. Implement [`RequestInterceptor`] on your
//! own type or wrap a closure in [`FnRequestInterceptor`].
//!
//! # Example: Implementing `RequestInterceptor`
//!
//! ```no_run
//! use gymdesk_client::callbacks::RequestInterceptor;
//! use gymdesk_client::types::ApiRequest;
//!
//! struct TenantHeader {
//!     gym_slug: String,
//! }
//!
//! impl RequestInterceptor for TenantHeader {
//!     fn intercept(&self, request: &mut ApiRequest) {
//!         request.set_header("X-Gym", self.gym_slug.clone());
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::types::ApiRequest;

// ============================================================================
// Request Interceptor Trait
// ============================================================================

/// Hook run on every outgoing request.
///
/// Interceptors only mutate the descriptor; they cannot fail and cannot short-circuit
/// the request.
pub trait RequestInterceptor: Send + Sync {
    /// Mutate `request` before it is sent
    fn intercept(&self, request: &mut ApiRequest);
}

// Blanket implementation for boxed trait objects
impl RequestInterceptor for Box<dyn RequestInterceptor> {
    fn intercept(&self, request: &mut ApiRequest) {
        (**self).intercept(request);
    }
}

impl<T: RequestInterceptor + ?Sized> RequestInterceptor for Arc<T> {
    fn intercept(&self, request: &mut ApiRequest) {
        (**self).intercept(request);
    }
}

/// Type alias for a shared request interceptor.
pub type SharedRequestInterceptor = Arc<dyn RequestInterceptor>;

// ============================================================================
// Closure-based wrapper
// ============================================================================

/// Wrapper to convert a closure into a `RequestInterceptor`.
///
/// # Example
///
/// ```no_run
/// use gymdesk_client::callbacks::{FnRequestInterceptor, SharedRequestInterceptor};
/// use std::sync::Arc;
///
/// let interceptor = FnRequestInterceptor::new(|request| {
///     request.set_header("X-Client", "dashboard");
/// });
///
/// let shared: SharedRequestInterceptor = Arc::new(interceptor);
/// ```
pub struct FnRequestInterceptor<F>
where
    F: Fn(&mut ApiRequest) + Send + Sync,
{
    func: F,
}

impl<F> FnRequestInterceptor<F>
where
    F: Fn(&mut ApiRequest) + Send + Sync,
{
    /// Create a new function-based interceptor.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> RequestInterceptor for FnRequestInterceptor<F>
where
    F: Fn(&mut ApiRequest) + Send + Sync,
{
    fn intercept(&self, request: &mut ApiRequest) {
        (self.func)(request);
    }
}
