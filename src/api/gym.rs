//! Gym owner endpoints: profile, clients and trainers

use super::{Ack, ack, data};
use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{
    ApiEnvelope, ApiRequest, ClientId, ClientRecord, ClientsPage, GymProfile, TrainerId,
    TrainersPage,
};

const PROFILE: &str = "/api/gym/profile";
const CLIENTS: &str = "/api/gym/clients";
const TRAINERS: &str = "/api/gym/trainers";

fn client_url(id: &ClientId) -> String {
    format!("{CLIENTS}/{id}")
}

fn trainer_url(id: &TrainerId) -> String {
    format!("{TRAINERS}/{id}")
}

// ============================================================================
// Profile
// ============================================================================

/// `GET /api/gym/profile`
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn get_profile(client: &ApiClient) -> Result<GymProfile> {
    data(&client.get(PROFILE).await?)
}

/// `PATCH /api/gym/profile` with the fields set in `update`
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn update_profile(client: &ApiClient, update: &GymProfile) -> Result<GymProfile> {
    data(&client.execute(ApiRequest::patch(PROFILE).json(update)?).await?)
}

// ============================================================================
// Clients
// ============================================================================

/// `GET /api/gym/clients?page=&search=`
///
/// Returns the whole envelope so callers can show the server's message alongside
/// the page.
///
/// # Errors
///
/// Returns the server's error.
pub async fn list_clients(
    client: &ApiClient,
    page: u32,
    search: &str,
) -> Result<ApiEnvelope<ClientsPage>> {
    let request = ApiRequest::get(CLIENTS)
        .query("page", page)
        .query("search", search);
    client.execute(request).await?.envelope()
}

/// `GET /api/gym/clients/{id}`
///
/// # Errors
///
/// Returns the server's error (404 for an unknown id).
pub async fn get_client(client: &ApiClient, id: &ClientId) -> Result<ClientRecord> {
    data(&client.get(&client_url(id)).await?)
}

/// `POST /api/gym/clients`
///
/// # Errors
///
/// Returns the server's error.
pub async fn add_client(client: &ApiClient, record: &ClientRecord) -> Result<Ack> {
    ack(&client.execute(ApiRequest::post(CLIENTS).json(record)?).await?)
}

/// `PUT /api/gym/clients/{id}`
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn update_client(
    client: &ApiClient,
    id: &ClientId,
    update: &ClientRecord,
) -> Result<ClientRecord> {
    let request = ApiRequest::put(client_url(id)).json(update)?;
    data(&client.execute(request).await?)
}

/// `DELETE /api/gym/clients/{id}` (soft delete)
///
/// # Errors
///
/// Returns the server's error.
pub async fn delete_client(client: &ApiClient, id: &ClientId) -> Result<Ack> {
    ack(&client.delete(&client_url(id)).await?)
}

/// `POST /api/gym/clients/{id}/send-welcome`
///
/// # Errors
///
/// Returns the server's error.
pub async fn send_client_welcome(client: &ApiClient, id: &ClientId) -> Result<Ack> {
    let url = format!("{}/send-welcome", client_url(id));
    ack(&client.post(&url, None).await?)
}

// ============================================================================
// Trainers
// ============================================================================

/// `GET /api/gym/trainers?page=&search=`
///
/// # Errors
///
/// Returns the server's error or `ApiError::InvalidResponse` on a payload mismatch.
pub async fn list_trainers(client: &ApiClient, page: u32, search: &str) -> Result<TrainersPage> {
    let request = ApiRequest::get(TRAINERS)
        .query("page", page)
        .query("search", search);
    data(&client.execute(request).await?)
}

/// `DELETE /api/gym/trainers/{id}` (soft delete)
///
/// # Errors
///
/// Returns the server's error.
pub async fn delete_trainer(client: &ApiClient, id: &TrainerId) -> Result<Ack> {
    ack(&client.delete(&trainer_url(id)).await?)
}

/// `POST /api/gym/trainers/{id}/send-welcome`
///
/// # Errors
///
/// Returns the server's error.
pub async fn send_trainer_welcome(client: &ApiClient, id: &TrainerId) -> Result<Ack> {
    let url = format!("{}/send-welcome", trainer_url(id));
    ack(&client.post(&url, None).await?)
}
