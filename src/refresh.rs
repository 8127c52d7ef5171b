//! Single-flight token refresh with queued replay
//!
//! When a request fails with 401 the coordinator refreshes the access token once and
//! replays the request with the new token. Requests that fail while that refresh is
//! running do not start their own; they wait in a FIFO queue and are replayed (or
//! rejected) when it settles.
//!
//! ```text
//!            401 ──► exempt route? ──yes──► propagate
//!                        │ no
//!                    retried? ──────yes──► propagate
//!                        │ no
//!            sent with an older token? ─yes──► replay with the stored token
//!                        │ no
//!              ┌── refreshing? ──┐
//!           yes│                 │no
//!        enqueue & wait     lead: GET refresh endpoint (with timeout)
//!              │                 │
//!              │        ok ──► store token, resolve queue, replay
//!              │        err ─► reject queue, clear token, propagate
//!              └──► replay with the token the leader obtained
//! ```
//!
//! State transitions happen under one `std::sync::Mutex` that is never held across
//! an `.await`. Draining the queue and clearing the flag happen in the same critical
//! section, so no waiter can slip in between and be stranded.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::auth::{AccessToken, AuthUser, SharedTokenStore};
use crate::error::{ApiError, Result};
use crate::transport::Transport;
use crate::types::{AUTHORIZATION, ApiEnvelope, ApiRequest, ApiResponse, SessionGrant};

/// URL substrings of the auth endpoints themselves
pub const DEFAULT_EXEMPT_PATTERNS: [&str; 4] = [
    "/auth/login",
    "/auth/refresh-token",
    "/auth/logout",
    "/auth/forgot-password/initiate",
];

// ============================================================================
// Exempt routes
// ============================================================================

/// Routes whose 401 responses are returned as-is instead of triggering a refresh.
///
/// Matching is by substring, so `/auth/login` covers `/api/gym/auth/login` and
/// `/api/super-admin/auth/login` alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthExemptRoutes {
    patterns: Vec<String>,
}

impl Default for AuthExemptRoutes {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_EXEMPT_PATTERNS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl AuthExemptRoutes {
    /// Use exactly `patterns`
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Add a pattern to the set
    #[must_use]
    pub fn with(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Whether `url` contains any exempt pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| url.contains(p.as_str()))
    }

    /// Configured patterns
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

// ============================================================================
// Refresh endpoint call
// ============================================================================

/// Token and account returned by a successful refresh
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshedSession {
    /// New bearer token
    pub access_token: AccessToken,
    /// Account the token belongs to, when the server includes it
    pub user: Option<AuthUser>,
}

/// Call the refresh endpoint once.
///
/// The request carries no bearer token; the server authenticates it with the
/// http-only refresh cookie.
///
/// # Errors
///
/// Returns the transport's error for a failed call, or `ApiError::InvalidResponse`
/// when a 2xx envelope has no `data.accessToken`.
pub async fn request_refresh(
    transport: &dyn Transport,
    refresh_path: &str,
) -> Result<RefreshedSession> {
    let response = transport.send(&ApiRequest::get(refresh_path)).await?;
    let envelope: ApiEnvelope<SessionGrant> = response.envelope()?;

    let grant = envelope
        .data
        .ok_or_else(|| ApiError::invalid_response("refresh response has no data"))?;
    let access_token = grant
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::invalid_response("refresh response has no accessToken"))?;

    Ok(RefreshedSession {
        access_token: AccessToken::new(access_token),
        user: grant.user,
    })
}

// ============================================================================
// Refresh state
// ============================================================================

/// A request parked behind the in-flight refresh.
///
/// The one-shot channel is both halves of the entry: `Ok(session)` resolves it and
/// `Err(error)` rejects it.
struct PendingRequest {
    settle: oneshot::Sender<Result<RefreshedSession>>,
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    queue: Vec<PendingRequest>,
}

/// What a failing request does once it is known to need a refresh
enum Turn<'a> {
    Lead(RefreshGuard<'a>),
    Wait(oneshot::Receiver<Result<RefreshedSession>>),
}

/// Owned by the task running the refresh call.
///
/// Settling drains the queue and clears the flag in one critical section. If the
/// leading task is dropped before settling, `Drop` rejects every waiter with
/// `RefreshAborted` and clears the flag.
struct RefreshGuard<'a> {
    state: &'a Mutex<RefreshState>,
    settled: bool,
}

impl RefreshGuard<'_> {
    fn settle(mut self, outcome: &Result<RefreshedSession>) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: &Result<RefreshedSession>) {
        self.settled = true;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let waiters = std::mem::take(&mut state.queue);
        let count = waiters.len();
        for waiter in waiters {
            // A waiter whose caller gave up has dropped its receiver
            let _ = waiter.settle.send(outcome.clone());
        }
        state.refreshing = false;
        drop(state);

        tracing::debug!(
            waiters = count,
            ok = outcome.is_ok(),
            "token refresh settled"
        );
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("token refresh dropped before completion, rejecting waiters");
            self.finish(&Err(ApiError::RefreshAborted));
        }
    }
}

// ============================================================================
// Refresh Coordinator
// ============================================================================

/// Turns recoverable 401s into one shared refresh plus a replay per request.
///
/// One coordinator exists per client; it is created with the client and owns the
/// refresh flag and queue.
pub struct RefreshCoordinator {
    transport: std::sync::Arc<dyn Transport>,
    token_store: SharedTokenStore,
    exempt_routes: AuthExemptRoutes,
    refresh_path: String,
    refresh_timeout: Duration,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    /// Create a coordinator
    pub fn new(
        transport: std::sync::Arc<dyn Transport>,
        token_store: SharedTokenStore,
        exempt_routes: AuthExemptRoutes,
        refresh_path: impl Into<String>,
        refresh_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            token_store,
            exempt_routes,
            refresh_path: refresh_path.into(),
            refresh_timeout,
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// Whether a refresh call is currently in flight
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.lock_state().refreshing
    }

    /// Number of requests waiting on the in-flight refresh
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock_state().queue.len()
    }

    /// Exempt routes in effect
    #[must_use]
    pub fn exempt_routes(&self) -> &AuthExemptRoutes {
        &self.exempt_routes
    }

    /// Recover from a failed request if the failure is a recoverable 401.
    ///
    /// `request` is the descriptor exactly as it was sent. Non-401 errors, 401s on
    /// exempt routes and 401s on already-retried requests come back unchanged. A
    /// request whose bearer is older than the stored token is replayed with the
    /// stored token without another refresh.
    ///
    /// # Errors
    ///
    /// The error passed in when no recovery applies, the refresh error when the
    /// refresh fails, or the replay's own error.
    pub async fn recover(&self, mut request: ApiRequest, error: ApiError) -> Result<ApiResponse> {
        if !error.is_unauthorized() {
            return Err(error);
        }
        if self.exempt_routes.matches(request.url()) {
            tracing::debug!(url = %request.url(), "401 on auth route, not refreshing");
            return Err(error);
        }
        if request.is_retried() {
            tracing::debug!(url = %request.url(), "401 after replay, giving up");
            return Err(error);
        }
        request.mark_retried();

        if let Some(current) = self.newer_token_than(&request) {
            tracing::debug!(url = %request.url(), "401 for a superseded token, replaying");
            return self.replay(request, &current).await;
        }

        tracing::debug!(url = %request.url(), "401 received, refreshing access token");
        let session = self.refresh_session().await?;
        self.replay(request, &session.access_token).await
    }

    /// Refresh the session, sharing the call with any refresh already in flight.
    ///
    /// The refresh path of [`recover`](Self::recover), exposed for callers that
    /// need a token without a failed request, such as a startup session restore.
    /// The token store is updated (or cleared on failure) before this returns.
    ///
    /// # Errors
    ///
    /// The refresh error, `ApiError::Timeout` if the call exceeds the refresh
    /// timeout, or `ApiError::RefreshAborted` if the task running it was dropped.
    pub async fn refresh_session(&self) -> Result<RefreshedSession> {
        match self.take_turn() {
            Turn::Wait(receiver) => {
                tracing::debug!("refresh in flight, queueing");
                receiver.await.map_err(|_| ApiError::RefreshAborted)?
            }
            Turn::Lead(guard) => self.refresh(guard).await,
        }
    }

    /// The stored token, if `request` went out stamped with a different one
    fn newer_token_than(&self, request: &ApiRequest) -> Option<AccessToken> {
        let sent = request.header_value(AUTHORIZATION)?;
        let current = self.token_store.get_access_token()?;
        (current.authorization_header() != sent).then_some(current)
    }

    /// Enqueue behind an in-flight refresh, or become the one that runs it
    fn take_turn(&self) -> Turn<'_> {
        let mut state = self.lock_state();
        if state.refreshing {
            let (settle, receiver) = oneshot::channel();
            state.queue.push(PendingRequest { settle });
            Turn::Wait(receiver)
        } else {
            state.refreshing = true;
            Turn::Lead(RefreshGuard {
                state: &self.state,
                settled: false,
            })
        }
    }

    async fn refresh(&self, guard: RefreshGuard<'_>) -> Result<RefreshedSession> {
        let outcome = match tokio::time::timeout(
            self.refresh_timeout,
            request_refresh(self.transport.as_ref(), &self.refresh_path),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = u64::try_from(self.refresh_timeout.as_millis()).unwrap_or(u64::MAX),
                    "token refresh timed out"
                );
                Err(ApiError::timeout(format!(
                    "token refresh did not complete within {:?}",
                    self.refresh_timeout
                )))
            }
        };

        match outcome {
            Ok(session) => {
                tracing::info!(token = %session.access_token.fingerprint(), "access token refreshed");
                self.token_store
                    .set_access_token(Some(session.access_token.clone()));
                let outcome = Ok(session);
                guard.settle(&outcome);
                outcome
            }
            Err(error) => {
                tracing::warn!(error = %error, "token refresh failed, clearing session token");
                let outcome = Err(error);
                guard.settle(&outcome);
                self.token_store.set_access_token(None);
                outcome
            }
        }
    }

    async fn replay(&self, mut request: ApiRequest, token: &AccessToken) -> Result<ApiResponse> {
        request.set_bearer(token);
        tracing::debug!(url = %request.url(), "replaying request with refreshed token");
        self.transport.send(&request).await
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("exempt_routes", &self.exempt_routes)
            .field("refresh_path", &self.refresh_path)
            .field("refresh_timeout", &self.refresh_timeout)
            .field("refreshing", &self.is_refreshing())
            .field("pending", &self.pending_count())
            .finish()
    }
}
