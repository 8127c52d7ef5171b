//! Integration tests for the reqwest transport against a local HTTP server
//!
//! These cover what the in-process mocks cannot: real headers, query strings, the
//! cookie jar carrying the refresh cookie, and error bodies that are not JSON.

use gymdesk_client::auth::{InMemoryTokenStore, Role, TokenStore};
use gymdesk_client::{AccessToken, ApiClient, ApiError, ClientConfig, api};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, store: Arc<InMemoryTokenStore>) -> ApiClient {
    let config = ClientConfig::builder().base_url(server.uri()).build();
    ApiClient::builder(config).token_store(store).build().unwrap()
}

#[tokio::test]
async fn test_bearer_and_query_reach_the_server() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/gym/clients"))
        .and(header("authorization", "Bearer tok1"))
        .and(query_param("page", "2"))
        .and(query_param("search", "ann"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "clients": [], "totalPages": 2, "currentPage": 2, "totalClients": 11 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(InMemoryTokenStore::with_token("tok1")));
    let page = api::gym::list_clients(&client, 2, "ann").await?;

    assert_eq!(page.data.map(|p| p.total_clients), Some(11));
    Ok(())
}

#[tokio::test]
async fn test_401_refreshes_and_replays_over_http() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/gym/profile"))
        .and(header("authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "accessToken": "tok2" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/gym/profile"))
        .and(header("authorization", "Bearer tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "gymName": "Iron Temple" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::with_token("tok1"));
    let client = client_for(&server, store.clone());

    let profile = api::gym::get_profile(&client).await?;

    assert_eq!(profile.gym_name.as_deref(), Some("Iron Temple"));
    assert_eq!(store.get_access_token(), Some(AccessToken::new("tok2")));
    Ok(())
}

#[tokio::test]
async fn test_login_cookie_is_sent_to_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/gym/auth/login"))
        .and(body_json(json!({
            "email": "owner@irontemple.test",
            "password": "hunter2",
            "role": "gym"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refreshToken=r1; Path=/; HttpOnly")
                .set_body_json(json!({
                    "success": true,
                    "data": {
                        "accessToken": "tok1",
                        "id": "u1",
                        "email": "owner@irontemple.test",
                        "role": "gym"
                    }
                })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/refresh-token"))
        .and(header("cookie", "refreshToken=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "accessToken": "tok2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(InMemoryTokenStore::new()));
    let grant = api::auth::login(&client, Role::Gym, "owner@irontemple.test", "hunter2")
        .await
        .unwrap();
    assert_eq!(grant.access_token, AccessToken::new("tok1"));
    assert_eq!(grant.user.role, Role::Gym);

    let refreshed = gymdesk_client::request_refresh(
        client.transport().as_ref(),
        &client.config().refresh_path,
    )
    .await
    .unwrap();
    assert_eq!(refreshed.access_token, AccessToken::new("tok2"));
}

#[tokio::test]
async fn test_wrong_password_is_not_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/trainer/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(InMemoryTokenStore::new()));
    let err = api::auth::login(&client, Role::Trainer, "coach@irontemple.test", "nope")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/super-admin/gyms/g1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(InMemoryTokenStore::with_token("tok1")));
    let err = client.get("/api/super-admin/gyms/g1").await.unwrap_err();

    match err {
        ApiError::Status {
            status,
            message,
            body,
            ..
        } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
            assert!(body.is_none());
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/gym/trainers/t1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(InMemoryTokenStore::with_token("tok1")));
    let response = client.delete("/api/gym/trainers/t1").await.unwrap();

    assert_eq!(response.status, 204);
    assert!(response.body.is_null());
}

#[tokio::test]
async fn test_missing_membership_over_http_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/client/membership/latest"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "none" })))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(InMemoryTokenStore::with_token("tok1")));
    assert!(api::member::latest_membership(&client).await.unwrap().is_none());
}
