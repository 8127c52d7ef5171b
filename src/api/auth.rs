//! Login, password reset and gym sign-up
//!
//! All of these are called before a session exists. The login and
//! forgot-password-initiate routes are auth-exempt, so a 401 from them (wrong
//! password, unknown email) comes straight back instead of triggering a refresh.

use serde::Deserialize;

use super::{Ack, ack};
use crate::auth::{AccessToken, AuthUser, Role};
use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::types::ApiRequest;
use crate::utils::join_url;

/// Token and account returned by a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    /// Bearer token for the new session
    pub access_token: AccessToken,
    /// Signed-in account
    pub user: AuthUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    access_token: String,
    id: String,
    email: String,
    role: Role,
}

/// Whether a Google redirect should sign in or create an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoogleMode {
    /// Sign in an existing account
    Login,
    /// Create a new account
    Signup,
}

impl GoogleMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }
}

/// `POST /api/{role}/auth/login`
///
/// # Errors
///
/// Returns the server's error (401 for bad credentials), or
/// `ApiError::InvalidResponse` if the response lacks a token.
pub async fn login(
    client: &ApiClient,
    role: Role,
    email: &str,
    password: &str,
) -> Result<LoginGrant> {
    let request = ApiRequest::post(format!("/api/{role}/auth/login")).json_value(
        serde_json::json!({ "email": email, "password": password, "role": role }),
    );
    let data: LoginData = client
        .execute(request)
        .await?
        .envelope::<LoginData>()?
        .data
        .ok_or_else(|| ApiError::invalid_response("login response has no data"))?;

    Ok(LoginGrant {
        access_token: AccessToken::new(data.access_token),
        user: AuthUser {
            id: data.id,
            email: data.email,
            role: data.role,
        },
    })
}

/// `POST /api/{role}/auth/forgot-password/initiate`: email a one-time code
///
/// # Errors
///
/// Returns the server's error.
pub async fn initiate_forgot_password(client: &ApiClient, role: Role, email: &str) -> Result<Ack> {
    let request = ApiRequest::post(format!("/api/{role}/auth/forgot-password/initiate"))
        .json_value(serde_json::json!({ "email": email }));
    ack(&client.execute(request).await?)
}

/// `POST /api/{role}/auth/forgot-password/verify`: check the one-time code
///
/// # Errors
///
/// Returns the server's error.
pub async fn verify_forgot_password(
    client: &ApiClient,
    role: Role,
    email: &str,
    otp: &str,
) -> Result<Ack> {
    let request = ApiRequest::post(format!("/api/{role}/auth/forgot-password/verify"))
        .json_value(serde_json::json!({ "email": email, "otp": otp }));
    ack(&client.execute(request).await?)
}

/// `POST /api/{role}/auth/resetPassword`: set a new password
///
/// # Errors
///
/// Returns the server's error.
pub async fn reset_password(
    client: &ApiClient,
    role: Role,
    email: &str,
    otp: &str,
    password: &str,
) -> Result<Ack> {
    let request = ApiRequest::post(format!("/api/{role}/auth/resetPassword")).json_value(
        serde_json::json!({ "email": email, "password": password, "otp": otp }),
    );
    ack(&client.execute(request).await?)
}

/// `POST /api/gym/auth/signup/initiate`
///
/// # Errors
///
/// Returns the server's error.
pub async fn initiate_gym_signup(client: &ApiClient, email: &str) -> Result<Ack> {
    let request = ApiRequest::post("/api/gym/auth/signup/initiate")
        .json_value(serde_json::json!({ "email": email }));
    ack(&client.execute(request).await?)
}

/// `POST /api/gym/auth/signup/complete`
///
/// # Errors
///
/// Returns the server's error.
pub async fn complete_gym_signup(
    client: &ApiClient,
    email: &str,
    password: &str,
    otp: &str,
) -> Result<Ack> {
    let request = ApiRequest::post("/api/gym/auth/signup/complete").json_value(
        serde_json::json!({ "email": email, "password": password, "otp": otp }),
    );
    ack(&client.execute(request).await?)
}

/// URL to send a browser to for Google sign-in
#[must_use]
pub fn google_login_url(base_url: &str, role: Role, mode: GoogleMode) -> String {
    format!(
        "{}?role={role}&mode={}",
        join_url(base_url, "/api/auth/google"),
        mode.as_str()
    )
}
