//! Login session: token, signed-in user, and the calls that change them

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

use super::token::{AccessToken, TokenStore};
use crate::client::ApiClient;
use crate::error::Result;
use crate::types::ClientConfig;

/// Dashboard role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Gym owner
    Gym,
    /// Trainer employed by a gym
    Trainer,
    /// Gym member
    Client,
    /// Platform operator
    SuperAdmin,
}

impl Role {
    /// Path segment used by role-scoped endpoints, e.g. `/api/{role}/auth/login`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gym => "gym",
            Self::Trainer => "trainer",
            Self::Client => "client",
            Self::SuperAdmin => "super-admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "gym" => Ok(Self::Gym),
            "trainer" => Ok(Self::Trainer),
            "client" => Ok(Self::Client),
            "super-admin" => Ok(Self::SuperAdmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Account id
    pub id: String,
    /// Login email
    pub email: String,
    /// Dashboard role
    pub role: Role,
}

/// Result of checking the session against a set of allowed roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Startup restore has not finished yet
    Loading,
    /// Nobody is signed in
    Anonymous,
    /// Signed in, but with a role outside the allowed set
    Forbidden,
    /// Signed in with an allowed role
    Allowed,
}

// ============================================================================
// Session store
// ============================================================================

#[derive(Debug)]
struct SessionState {
    token: Option<AccessToken>,
    user: Option<AuthUser>,
    loading: bool,
}

/// Token store that also tracks the signed-in user.
///
/// Clearing the token through [`TokenStore::set_access_token`] (what a failed refresh
/// does) clears the user too, so the session reads as signed out.
#[derive(Debug)]
pub struct SessionStore {
    state: RwLock<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            state: RwLock::new(SessionState {
                token: None,
                user: None,
                loading: true,
            }),
        }
    }
}

impl SessionStore {
    /// Create an empty store in the loading state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signed-in user
    #[must_use]
    pub fn user(&self) -> Option<AuthUser> {
        self.read().user.clone()
    }

    /// Whether startup restore is still pending
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    fn install(&self, token: AccessToken, user: Option<AuthUser>) {
        let mut state = self.write();
        state.token = Some(token);
        if user.is_some() {
            state.user = user;
        }
        state.loading = false;
    }

    fn clear(&self) {
        let mut state = self.write();
        state.token = None;
        state.user = None;
    }

    fn finish_loading(&self) {
        self.write().loading = false;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for SessionStore {
    fn get_access_token(&self) -> Option<AccessToken> {
        self.read().token.clone()
    }

    fn set_access_token(&self, token: Option<AccessToken>) {
        match token {
            Some(token) => self.write().token = Some(token),
            None => self.clear(),
        }
    }
}

// ============================================================================
// Auth session
// ============================================================================

/// A signed-in (or signing-in) dashboard session.
///
/// Owns the [`SessionStore`] and an [`ApiClient`] wired to it, so every request made
/// through [`client`](Self::client) carries this session's token and refreshes it.
///
/// ```no_run
/// use gymdesk_client::auth::AuthSession;
/// use gymdesk_client::ClientConfig;
///
/// # async fn example() -> gymdesk_client::Result<()> {
/// let session = AuthSession::connect(ClientConfig::from_env()?)?;
/// if !session.restore().await {
///     println!("please log in");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    store: Arc<SessionStore>,
    client: ApiClient,
}

impl AuthSession {
    /// Build a session and its reqwest-backed client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` if the config is invalid.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let store = Arc::new(SessionStore::new());
        let client = ApiClient::builder(config)
            .token_store(store.clone())
            .build()?;
        Ok(Self { store, client })
    }

    /// Wrap an already-built client that uses `store` as its token store
    #[must_use]
    pub fn from_parts(store: Arc<SessionStore>, client: ApiClient) -> Self {
        Self { store, client }
    }

    /// Client whose requests carry this session's token
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Session store
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Install the token and user returned by a login call
    pub fn login(&self, token: impl Into<AccessToken>, user: AuthUser) {
        let token = token.into();
        tracing::info!(user = %user.id, role = %user.role, token = %token.fingerprint(), "signed in");
        self.store.install(token, Some(user));
    }

    /// Sign out on the server, then clear local state.
    ///
    /// A failed logout call is logged and otherwise ignored; local state is cleared
    /// either way.
    pub async fn logout(&self) {
        let path = self.client.config().logout_path.clone();
        if let Err(e) = self.client.post(&path, None).await {
            tracing::warn!(error = %e, "logout call failed");
        }
        self.store.clear();
        tracing::info!("signed out");
    }

    /// Silently restore a session at startup using the refresh cookie.
    ///
    /// Shares the client's refresh turn, so a restore racing a 401 storm makes one
    /// refresh call between them. Returns `true` if a token was obtained. Any
    /// failure leaves the session signed out. Loading ends in every case.
    pub async fn restore(&self) -> bool {
        let restored = match self.client.coordinator().refresh_session().await {
            Ok(session) => {
                tracing::info!(
                    token = %session.access_token.fingerprint(),
                    valid_for_secs = session.access_token.remaining_validity().map(|d| d.as_secs()),
                    "session restored"
                );
                self.store.install(session.access_token, session.user);
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "no session to restore");
                self.store.clear();
                false
            }
        };
        self.store.finish_loading();
        restored
    }

    /// Signed-in user
    #[must_use]
    pub fn user(&self) -> Option<AuthUser> {
        self.store.user()
    }

    /// Current access token
    #[must_use]
    pub fn access_token(&self) -> Option<AccessToken> {
        self.store.get_access_token()
    }

    /// Whether startup restore is still pending
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Whether a user is signed in with a token
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some() && self.user().is_some()
    }

    /// Route guard: may the current session see a page restricted to `allowed`?
    #[must_use]
    pub fn authorize(&self, allowed: &[Role]) -> Access {
        if self.is_loading() {
            return Access::Loading;
        }
        match self.user() {
            None => Access::Anonymous,
            Some(user) if allowed.contains(&user.role) => Access::Allowed,
            Some(_) => Access::Forbidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AuthUser {
        AuthUser {
            id: "u1".to_string(),
            email: "owner@irontemple.test".to_string(),
            role: Role::Gym,
        }
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            r#""super-admin""#
        );
        assert_eq!("trainer".parse::<Role>().unwrap(), Role::Trainer);
        assert!("coach".parse::<Role>().is_err());
        assert_eq!(Role::Client.to_string(), "client");
    }

    #[test]
    fn test_store_starts_loading_and_empty() {
        let store = SessionStore::new();
        assert!(store.is_loading());
        assert!(store.get_access_token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn test_clearing_token_signs_user_out() {
        let store = SessionStore::new();
        store.install(AccessToken::new("tok1"), Some(owner()));

        store.set_access_token(Some(AccessToken::new("tok2")));
        assert_eq!(store.user(), Some(owner()));

        store.set_access_token(None);
        assert!(store.user().is_none());
        assert!(store.get_access_token().is_none());
    }

    #[test]
    fn test_authorize_guard() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:3000")
            .build();
        let session = AuthSession::connect(config).unwrap();

        assert_eq!(session.authorize(&[Role::Gym]), Access::Loading);

        session.store.finish_loading();
        assert_eq!(session.authorize(&[Role::Gym]), Access::Anonymous);

        session.login("tok1", owner());
        assert!(session.is_authenticated());
        assert_eq!(session.authorize(&[Role::Gym, Role::Trainer]), Access::Allowed);
        assert_eq!(session.authorize(&[Role::SuperAdmin]), Access::Forbidden);
    }
}
