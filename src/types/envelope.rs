//! Response envelope shared by every backend endpoint

use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;

/// `{ "success": bool, "message": string, "data": T }`
///
/// Every field is optional on the wire; endpoints that only acknowledge an action
/// send no `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Server-side success flag
    #[serde(default)]
    pub success: Option<bool>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Payload
    pub data: Option<T>,
}

/// Payload of the login and refresh-token endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    /// New bearer token; absence is treated as a failed refresh
    #[serde(default)]
    pub access_token: Option<String>,
    /// Account the token belongs to
    #[serde(default)]
    pub user: Option<AuthUser>,
}
