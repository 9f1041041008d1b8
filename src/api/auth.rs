//! Login and registration against the backend's auth endpoints.
//!
//! On success the returned user/token pair is committed to the session
//! store. Validation failures carry the backend's user-facing message
//! (`{detail}`) verbatim.

use tracing::info;

use crate::api::client::{ApiClient, Auth};
use crate::api::error::ApiError;
use crate::api::models::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use crate::session::SessionStore;

pub async fn login(
    api: &ApiClient,
    session: &SessionStore,
    request: &LoginRequest,
) -> Result<UserProfile, ApiError> {
    let response: AuthResponse = api.post_json("/api/auth/login", request, Auth::Public).await?;
    establish(session, response)
}

pub async fn register(
    api: &ApiClient,
    session: &SessionStore,
    request: &RegisterRequest,
) -> Result<UserProfile, ApiError> {
    let response: AuthResponse = api
        .post_json("/api/auth/register", request, Auth::Public)
        .await?;
    establish(session, response)
}

fn establish(session: &SessionStore, response: AuthResponse) -> Result<UserProfile, ApiError> {
    session
        .commit(&response.user, &response.access_token)
        .map_err(|err| ApiError::Storage(err.to_string()))?;
    info!(email = %response.user.email, "Session established");
    Ok(response.user)
}
