//! Bearer-token request interceptor

use crate::auth::SharedTokenStore;
use crate::callbacks::RequestInterceptor;
use crate::types::ApiRequest;

/// Stamps `Authorization: Bearer <token>` on every outgoing request.
///
/// Holds the token store itself rather than a token value, so the header always
/// reflects the token current at send time. Without a token the request goes out
/// unauthenticated and the server decides.
#[derive(Clone)]
pub struct BearerTokenInterceptor {
    token_store: SharedTokenStore,
}

impl BearerTokenInterceptor {
    /// Create an interceptor reading from `token_store`
    #[must_use]
    pub fn new(token_store: SharedTokenStore) -> Self {
        Self { token_store }
    }
}

impl RequestInterceptor for BearerTokenInterceptor {
    fn intercept(&self, request: &mut ApiRequest) {
        if let Some(token) = self.token_store.get_access_token() {
            request.set_bearer(&token);
        }
    }
}

impl std::fmt::Debug for BearerTokenInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenInterceptor")
            .field("token_store", &"<store>")
            .finish()
    }
}
