//! Platform operator endpoints: branding profile and gym review

use super::{Ack, ack, data};
use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{ApiRequest, Gym, GymId, GymStatusUpdate, GymsPage, SuperAdminProfile};

const PROFILE: &str = "/api/super-admin/profile";
const GYMS: &str = "/api/super-admin/gyms";

/// Page size used when the caller has no preference
pub const DEFAULT_GYMS_PAGE_SIZE: u32 = 10;

/// `GET /api/super-admin/profile`
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn get_profile(client: &ApiClient) -> Result<SuperAdminProfile> {
    data(&client.get(PROFILE).await?)
}

/// `PATCH /api/super-admin/profile`
///
/// The endpoint answers with an acknowledgement, not the updated profile.
///
/// # Errors
///
/// Returns the server's error.
pub async fn update_profile(client: &ApiClient, update: &SuperAdminProfile) -> Result<Ack> {
    ack(&client.execute(ApiRequest::patch(PROFILE).json(update)?).await?)
}

/// `GET /api/super-admin/gyms?page=&limit=&search=`
///
/// An empty `search` is left off the query string.
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn list_gyms(client: &ApiClient, page: u32, limit: u32, search: &str) -> Result<GymsPage> {
    let mut request = ApiRequest::get(GYMS)
        .query("page", page)
        .query("limit", limit);
    if !search.is_empty() {
        request = request.query("search", search);
    }
    data(&client.execute(request).await?)
}

/// `GET /api/super-admin/gyms/{id}`
///
/// # Errors
///
/// Returns the server's error (404 for an unknown id).
pub async fn get_gym(client: &ApiClient, id: &GymId) -> Result<Gym> {
    data(&client.get(&format!("{GYMS}/{id}")).await?)
}

/// `PATCH /api/super-admin/gyms/{id}`: approve, reject or change billing state
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn update_gym_status(
    client: &ApiClient,
    id: &GymId,
    update: &GymStatusUpdate,
) -> Result<Gym> {
    let request = ApiRequest::patch(format!("{GYMS}/{id}")).json(update)?;
    data(&client.execute(request).await?)
}
