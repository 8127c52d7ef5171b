//! Integration tests for refresh-and-replay: single flight, exempt routes, loop
//! protection, token install and clear, timeouts and cancellation
//!
//! The backend is an in-process [`MockBackend`] that only accepts `Bearer tok2`, so
//! every request sent with `tok1` fails with 401 until a refresh installs `tok2`.

mod common;

use common::{MockBackend, REFRESH_PATH, RecordingStore, RefreshReply, client, client_with};
use gymdesk_client::auth::{AccessToken, TokenStore};
use gymdesk_client::types::AUTHORIZATION;
use gymdesk_client::{ApiError, ApiRequest, ClientConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

const CLIENTS: &str = "/api/gym/clients";
const TRAINERS: &str = "/api/gym/trainers";
const PROFILE: &str = "/api/gym/profile";

fn bearer(token: &str) -> Option<String> {
    Some(format!("Bearer {token}"))
}

// ============================================================================
// Storms: many 401s, one refresh
// ============================================================================

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let backend = Arc::new(MockBackend::new(RefreshReply::Token("tok2")));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    let (clients, trainers, profile) = tokio::join!(
        client.get(CLIENTS),
        client.get(TRAINERS),
        client.get(PROFILE)
    );

    assert_eq!(clients.unwrap().body["data"]["url"], CLIENTS);
    assert_eq!(trainers.unwrap().body["data"]["url"], TRAINERS);
    assert_eq!(profile.unwrap().body["data"]["url"], PROFILE);

    assert_eq!(backend.refresh_calls(), 1);
    for url in [CLIENTS, TRAINERS, PROFILE] {
        assert_eq!(
            backend.auth_headers_for(url),
            vec![bearer("tok1"), bearer("tok2")],
            "{url} should be sent once with the stale token and replayed once"
        );
    }
    assert_eq!(store.writes(), vec![Some(AccessToken::new("tok2"))]);
    assert!(!client.coordinator().is_refreshing());
}

#[tokio::test]
async fn test_failed_refresh_rejects_every_request() {
    let backend = Arc::new(MockBackend::new(RefreshReply::Status(500)));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    let (clients, trainers, profile) = tokio::join!(
        client.get(CLIENTS),
        client.get(TRAINERS),
        client.get(PROFILE)
    );

    for result in [clients, trainers, profile] {
        let err = result.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.server_message(), Some("refresh failed"));
    }

    assert_eq!(backend.refresh_calls(), 1);
    for url in [CLIENTS, TRAINERS, PROFILE] {
        assert_eq!(backend.calls_to(url), 1, "{url} must not be replayed");
    }
    assert_eq!(store.writes(), vec![None]);
    assert!(store.get_access_token().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_storm_across_threads_refreshes_once() {
    let backend = Arc::new(
        MockBackend::new(RefreshReply::Token("tok2")).refresh_delay(Duration::from_millis(200)),
    );
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move { client.get(&format!("{CLIENTS}/c{i}")).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(store.writes().len(), 1);
    assert_eq!(client.coordinator().pending_count(), 0);
}

// ============================================================================
// Exempt routes and loop protection
// ============================================================================

#[tokio::test]
async fn test_exempt_route_401_propagates_without_refresh() {
    let backend = Arc::new(MockBackend::new(RefreshReply::Token("tok2")).logout_status(401));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    let err = client.post("/api/auth/logout", None).await.unwrap_err();
    assert!(err.is_unauthorized());

    let err = client
        .post(
            "/api/gym/auth/login",
            Some(serde_json::json!({ "email": "a@b.test", "password": "wrong" })),
        )
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("jwt expired"));

    assert_eq!(backend.refresh_calls(), 0);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_custom_exempt_route_is_honored() {
    let backend = Arc::new(MockBackend::new(RefreshReply::Token("tok2")));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let config = ClientConfig::builder()
        .base_url("http://localhost:3000")
        .exempt_routes(gymdesk_client::AuthExemptRoutes::default().with("/trainers"))
        .build();
    let client = client_with(config, backend.clone(), store);

    assert!(client.get(TRAINERS).await.unwrap_err().is_unauthorized());
    assert_eq!(backend.refresh_calls(), 0);
}

#[tokio::test]
async fn test_replay_401_is_terminal() {
    let backend =
        Arc::new(MockBackend::new(RefreshReply::Token("tok2")).always_unauthorized(PROFILE));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    let err = client.get(PROFILE).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(
        backend.auth_headers_for(PROFILE),
        vec![bearer("tok1"), bearer("tok2")]
    );
    // The refresh itself succeeded, so the new token stays installed
    assert_eq!(store.get_access_token(), Some(AccessToken::new("tok2")));
}

// ============================================================================
// Token install and clear
// ============================================================================

#[tokio::test]
async fn test_refreshed_token_is_used_by_later_requests() {
    let backend = Arc::new(MockBackend::new(RefreshReply::Token("tok2")));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    client.get(PROFILE).await.unwrap();
    client.get(CLIENTS).await.unwrap();

    assert_eq!(backend.auth_headers_for(CLIENTS), vec![bearer("tok2")]);
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(store.writes().len(), 1);
}

#[tokio::test]
async fn test_late_401_for_old_token_replays_without_refresh() {
    let backend = Arc::new(MockBackend::new(RefreshReply::Token("tok2")));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    client.get(PROFILE).await.unwrap();
    assert_eq!(backend.refresh_calls(), 1);

    // A response to a request stamped before that refresh arrives afterwards
    let late = ApiRequest::get(CLIENTS).header(AUTHORIZATION, "Bearer tok1");
    let response = client
        .coordinator()
        .recover(late, ApiError::status(401, CLIENTS, None))
        .await
        .unwrap();

    assert_eq!(response.body["data"]["url"], CLIENTS);
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(backend.auth_headers_for(CLIENTS), vec![bearer("tok2")]);
    assert_eq!(store.writes().len(), 1);
}

#[tokio::test]
async fn test_refresh_call_carries_no_bearer() {
    let backend = Arc::new(MockBackend::new(RefreshReply::Token("tok2")));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store);

    client.get(PROFILE).await.unwrap();

    assert_eq!(backend.auth_headers_for(REFRESH_PATH), vec![None]);
}

#[tokio::test]
async fn test_refresh_without_access_token_signs_out() {
    let backend = Arc::new(MockBackend::new(RefreshReply::NoToken));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    let err = client.get(PROFILE).await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidResponse(_)));
    assert_eq!(store.writes(), vec![None]);
    assert_eq!(backend.calls_to(PROFILE), 1);
}

#[tokio::test]
async fn test_new_storm_after_failure_refreshes_again() {
    let backend = Arc::new(MockBackend::new(RefreshReply::Status(503)));
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    assert!(client.get(PROFILE).await.is_err());
    assert!(!client.coordinator().is_refreshing());

    store.set_access_token(Some(AccessToken::new("tok1")));
    assert!(client.get(PROFILE).await.is_err());

    assert_eq!(backend.refresh_calls(), 2);
}

// ============================================================================
// Timeouts and cancellation
// ============================================================================

#[tokio::test]
async fn test_refresh_timeout_fails_the_storm() {
    let backend = Arc::new(
        MockBackend::new(RefreshReply::Token("tok2")).refresh_delay(Duration::from_secs(10)),
    );
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let config = ClientConfig::builder()
        .base_url("http://localhost:3000")
        .refresh_timeout(Duration::from_millis(100))
        .build();
    let client = client_with(config, backend.clone(), store.clone());

    let start = Instant::now();
    let (first, second) = tokio::join!(client.get(CLIENTS), client.get(TRAINERS));
    let elapsed = start.elapsed();

    // Without the timeout this would take ~10s
    assert!(
        elapsed < Duration::from_secs(2),
        "Refresh timeout failed! Took {:?}",
        elapsed
    );
    assert!(matches!(first.unwrap_err(), ApiError::Timeout(_)));
    assert!(matches!(second.unwrap_err(), ApiError::Timeout(_)));
    assert_eq!(store.writes(), vec![None]);
    assert!(!client.coordinator().is_refreshing());
}

#[tokio::test]
async fn test_refresh_within_timeout_succeeds() {
    let backend = Arc::new(
        MockBackend::new(RefreshReply::Token("tok2")).refresh_delay(Duration::from_millis(50)),
    );
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let config = ClientConfig::builder()
        .base_url("http://localhost:3000")
        .refresh_timeout(Duration::from_millis(500))
        .build();
    let client = client_with(config, backend, store);

    assert!(client.get(PROFILE).await.is_ok());
}

#[tokio::test]
async fn test_aborted_leader_rejects_waiters() {
    let backend = Arc::new(
        MockBackend::new(RefreshReply::Token("tok2")).refresh_delay(Duration::from_secs(10)),
    );
    let store = Arc::new(RecordingStore::with_token("tok1"));
    let client = client(backend.clone(), store.clone());

    let leader = {
        let client = client.clone();
        tokio::spawn(async move { client.get(CLIENTS).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.coordinator().is_refreshing());

    let waiter = {
        let client = client.clone();
        tokio::spawn(async move { client.get(TRAINERS).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.coordinator().pending_count(), 1);

    leader.abort();
    assert!(leader.await.unwrap_err().is_cancelled());

    let err = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter should be released when the leader is dropped")
        .unwrap()
        .unwrap_err();
    assert_eq!(err, ApiError::RefreshAborted);

    assert!(!client.coordinator().is_refreshing());
    assert!(store.writes().is_empty());
    assert_eq!(store.get_access_token(), Some(AccessToken::new("tok1")));
}
