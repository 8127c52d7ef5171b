//! Request descriptors and responses passed through the pipeline

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use super::envelope::ApiEnvelope;
use crate::auth::AccessToken;
use crate::error::{ApiError, Result};

pub use reqwest::Method;

/// Name of the header carrying the bearer credential
pub const AUTHORIZATION: &str = "Authorization";

/// A request that can be sent, inspected, and re-sent.
///
/// Descriptors are plain values: interceptors mutate them before sending and the
/// refresh coordinator replays the same descriptor with a new token. Header names
/// are case-insensitive and stored lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    body: Option<serde_json::Value>,
    retried: bool,
}

impl ApiRequest {
    /// Create a request for `method` and a path relative to the base URL
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
            retried: false,
        }
    }

    /// `GET` request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// `POST` request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// `PUT` request
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// `PATCH` request
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// `DELETE` request
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Returns `ApiError::JsonDecode` if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach an already-built JSON body
    #[must_use]
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set a header, replacing any previous value
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set a header in place, replacing a value set under any casing of `name`
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let mut name = name.into();
        name.make_ascii_lowercase();
        self.headers.insert(name, value.into());
    }

    /// Stamp `Authorization: Bearer <token>`
    pub fn set_bearer(&mut self, token: &AccessToken) {
        self.set_header(AUTHORIZATION, token.authorization_header());
    }

    /// HTTP method
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path or absolute URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query parameters in insertion order
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Headers set on this request, keyed by lowercased name
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Value of one header, matched case-insensitively
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// JSON body, if any
    #[must_use]
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Whether this descriptor has already been through a refresh-and-replay cycle
    #[must_use]
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Mark the descriptor so a second 401 is treated as terminal
    pub fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// A successful (2xx) response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body; `Null` for empty bodies
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Create a response
    #[must_use]
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Decode the whole body
    ///
    /// # Errors
    ///
    /// Returns `ApiError::JsonDecode` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Decode the body as a `{ data, message, success }` envelope
    ///
    /// # Errors
    ///
    /// Returns `ApiError::JsonDecode` if the body does not match.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<ApiEnvelope<T>> {
        self.json()
    }

    /// Decode and unwrap the envelope's `data` field
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidResponse` if `data` is missing or null.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        self.envelope::<T>()?
            .data
            .ok_or_else(|| ApiError::invalid_response("response envelope has no data"))
    }
}
