//! Scripted in-process backend shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use gymdesk_client::auth::{AccessToken, TokenStore};
use gymdesk_client::types::AUTHORIZATION;
use gymdesk_client::{ApiClient, ApiError, ApiRequest, ApiResponse, ClientConfig, Transport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const REFRESH_PATH: &str = "/api/auth/refresh-token";

/// How the refresh endpoint answers
#[derive(Debug, Clone)]
pub enum RefreshReply {
    /// 200 with `{ data: { accessToken, user } }`
    Token(&'static str),
    /// Non-2xx with a JSON message
    Status(u16),
    /// 200 whose `data` has no `accessToken`
    NoToken,
}

/// Backend that accepts exactly one bearer token and records every call.
///
/// Any request not carrying `Bearer {valid_token}` gets a 401, as do URLs listed in
/// `always_unauthorized` regardless of token.
pub struct MockBackend {
    pub valid_token: Mutex<String>,
    pub refresh_reply: RefreshReply,
    pub refresh_delay: Duration,
    pub always_unauthorized: Vec<&'static str>,
    pub logout_status: u16,
    pub refresh_calls: AtomicUsize,
    pub log: Mutex<Vec<(String, Option<String>)>>,
}

impl MockBackend {
    pub fn new(refresh_reply: RefreshReply) -> Self {
        Self {
            valid_token: Mutex::new("tok2".to_string()),
            refresh_reply,
            refresh_delay: Duration::from_millis(50),
            always_unauthorized: Vec::new(),
            logout_status: 200,
            refresh_calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn always_unauthorized(mut self, url: &'static str) -> Self {
        self.always_unauthorized.push(url);
        self
    }

    pub fn logout_status(mut self, status: u16) -> Self {
        self.logout_status = status;
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Authorization headers seen on calls to `url`, in order
    pub fn auth_headers_for(&self, url: &str) -> Vec<Option<String>> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, auth)| auth.clone())
            .collect()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.auth_headers_for(url).len()
    }

    async fn refresh(&self) -> Result<ApiResponse, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.refresh_delay).await;

        match &self.refresh_reply {
            RefreshReply::Token(token) => Ok(ApiResponse::new(
                200,
                serde_json::json!({
                    "success": true,
                    "data": {
                        "accessToken": token,
                        "user": { "id": "u1", "email": "owner@irontemple.test", "role": "gym" }
                    }
                }),
            )),
            RefreshReply::Status(status) => Err(ApiError::status(
                *status,
                REFRESH_PATH,
                Some(serde_json::json!({ "message": "refresh failed" })),
            )),
            RefreshReply::NoToken => Ok(ApiResponse::new(
                200,
                serde_json::json!({ "success": true, "data": {} }),
            )),
        }
    }
}

#[async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = request.url().to_string();
        let auth = request.header_value(AUTHORIZATION).map(ToString::to_string);
        self.log.lock().unwrap().push((url.clone(), auth.clone()));

        if url == REFRESH_PATH {
            return self.refresh().await;
        }
        if url.ends_with("/auth/logout") {
            return if self.logout_status == 200 {
                Ok(ApiResponse::new(200, serde_json::json!({ "success": true })))
            } else {
                Err(ApiError::status(self.logout_status, &url, None))
            };
        }

        let expected = format!("Bearer {}", self.valid_token.lock().unwrap());
        let forced = self.always_unauthorized.contains(&url.as_str());
        if forced || auth.as_deref() != Some(expected.as_str()) {
            return Err(ApiError::status(
                401,
                &url,
                Some(serde_json::json!({ "message": "jwt expired" })),
            ));
        }

        Ok(ApiResponse::new(
            200,
            serde_json::json!({ "success": true, "data": { "url": url } }),
        ))
    }
}

/// Token store that records every write
#[derive(Default)]
pub struct RecordingStore {
    current: Mutex<Option<AccessToken>>,
    pub writes: Mutex<Vec<Option<AccessToken>>>,
}

impl RecordingStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            current: Mutex::new(Some(AccessToken::new(token))),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<Option<AccessToken>> {
        self.writes.lock().unwrap().clone()
    }
}

impl TokenStore for RecordingStore {
    fn get_access_token(&self) -> Option<AccessToken> {
        self.current.lock().unwrap().clone()
    }

    fn set_access_token(&self, token: Option<AccessToken>) {
        self.writes.lock().unwrap().push(token.clone());
        *self.current.lock().unwrap() = token;
    }
}

/// Route client logs to the test output; set `RUST_LOG=gymdesk_client=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn config() -> ClientConfig {
    ClientConfig::builder()
        .base_url("http://localhost:3000")
        .build()
}

pub fn client(backend: Arc<MockBackend>, store: Arc<RecordingStore>) -> ApiClient {
    client_with(config(), backend, store)
}

pub fn client_with(
    config: ClientConfig,
    backend: Arc<MockBackend>,
    store: Arc<RecordingStore>,
) -> ApiClient {
    init_tracing();
    ApiClient::builder(config)
        .transport(backend)
        .token_store(store)
        .build()
        .unwrap()
}
