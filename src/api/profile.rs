//! Profile endpoint.

use axum::{extract::State, Json};

use super::{success, ApiResult};
use crate::models::{ProfileUpdateRequest, User};
use crate::AppState;

/// PUT /api/profile - Change the display name.
pub async fn update_profile(
    State(state): State<AppState>,
    Json(request): Json<ProfileUpdateRequest>,
) -> ApiResult<User> {
    let user = state.session.update_profile(&request.name).await?;
    success(user)
}
