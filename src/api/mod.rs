//! Typed wrappers over the dashboard's REST endpoints
//!
//! Each function takes the [`ApiClient`](crate::ApiClient) it should go through, so
//! every call gets bearer stamping and refresh-and-replay for free. Payloads are
//! unwrapped from the `{ data: ... }` envelope unless the endpoint only acknowledges
//! the action, in which case the envelope itself is returned.

pub mod auth;
pub mod gym;
pub mod member;
pub mod super_admin;

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::types::{ApiEnvelope, ApiResponse};

/// Envelope with no typed payload, returned by action endpoints
pub type Ack = ApiEnvelope<serde_json::Value>;

pub(crate) fn ack(response: &ApiResponse) -> Result<Ack> {
    response.envelope()
}

pub(crate) fn data<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    response.data()
}
