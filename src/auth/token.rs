//! Access token value type and the token store seam

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Opaque bearer credential sent with every authenticated request
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Short SHA-256 fingerprint, safe to put in logs
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        digest[..6].iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Expiry read from the `exp` claim, when the token is a JWT.
    ///
    /// The signature is not checked; this is only a hint for scheduling.
    #[must_use]
    pub fn expires_at(&self) -> Option<u64> {
        #[derive(Deserialize)]
        struct Claims {
            exp: Option<u64>,
        }

        let payload = self.0.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice::<Claims>(&bytes).ok()?.exp
    }

    /// Time left before the `exp` claim, if known and still in the future
    #[must_use]
    pub fn remaining_validity(&self) -> Option<Duration> {
        let expires_at = self.expires_at()?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        (expires_at > now).then(|| Duration::from_secs(expires_at - now))
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessToken").field(&self.fingerprint()).finish()
    }
}

impl From<String> for AccessToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccessToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Holder of the current access token.
///
/// Owned by the session layer and injected into the request pipeline. Reads are
/// synchronous and happen at send time, so the pipeline never caches a stale token.
pub trait TokenStore: Send + Sync {
    /// Current token, if any
    fn get_access_token(&self) -> Option<AccessToken>;

    /// Install a fresh token, or clear it with `None`
    fn set_access_token(&self, token: Option<AccessToken>);
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn get_access_token(&self) -> Option<AccessToken> {
        (**self).get_access_token()
    }

    fn set_access_token(&self, token: Option<AccessToken>) {
        (**self).set_access_token(token);
    }
}

/// Type alias for a shared token store.
pub type SharedTokenStore = Arc<dyn TokenStore>;

/// Token store backed by a lock, for clients that have no session layer
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<AccessToken>>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `token`
    #[must_use]
    pub fn with_token(token: impl Into<AccessToken>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get_access_token(&self) -> Option<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_access_token(&self, token: Option<AccessToken>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }
}
