//! Member (client role) self-service endpoints

use super::data;
use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{ApiRequest, GymId, GymProfile, MemberProfile, Membership};

const PROFILE: &str = "/api/client/profile";

/// `GET /api/client/profile`
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn get_profile(client: &ApiClient) -> Result<MemberProfile> {
    data(&client.get(PROFILE).await?)
}

/// `PATCH /api/client/profile`
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn update_profile(client: &ApiClient, update: &MemberProfile) -> Result<MemberProfile> {
    data(&client.execute(ApiRequest::patch(PROFILE).json(update)?).await?)
}

/// `GET /api/client/membership/latest`
///
/// `Ok(None)` when the member has never held a plan (the server answers 404).
///
/// # Errors
///
/// Returns any other server error.
pub async fn latest_membership(client: &ApiClient) -> Result<Option<Membership>> {
    match client.get("/api/client/membership/latest").await {
        Ok(response) => data(&response).map(Some),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// `GET /api/gym/view/{id}`: the member's gym as shown on their dashboard
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn view_gym(client: &ApiClient, gym_id: &GymId) -> Result<GymProfile> {
    data(&client.get(&format!("/api/gym/view/{gym_id}")).await?)
}
