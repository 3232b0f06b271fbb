//! Cookbook actions.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{parse_id, success, ApiResult, Deleted, FavoriteToggled};
use crate::errors::AppError;
use crate::models::{Cookbook, CookbookInput};
use crate::AppState;

/// POST /api/cookbooks - Add a cookbook to the collection.
pub async fn create_cookbook(
    State(state): State<AppState>,
    Json(request): Json<CookbookInput>,
) -> ApiResult<Cookbook> {
    request.validate()?;

    let cookbook = state.cookbooks.add(request.normalized()).await?;
    tracing::info!(id = cookbook.id, "Cookbook added");
    success(cookbook)
}

/// PUT /api/cookbooks/{id} - Replace every editable field of a cookbook.
pub async fn update_cookbook(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CookbookInput>,
) -> ApiResult<Cookbook> {
    let id = parse_id(&id)?;
    request.validate()?;

    let existing = state
        .cookbooks
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Cookbook {} not found", id)))?;

    let cookbook = state
        .cookbooks
        .update(existing.with_changes(request.normalized()))
        .await?;
    success(cookbook)
}

/// DELETE /api/cookbooks/{id} - Delete a cookbook.
pub async fn delete_cookbook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;

    state.cookbooks.remove(id).await?;
    success(Deleted { id })
}

/// POST /api/cookbooks/{id}/favorite - Flip the favorite flag.
pub async fn toggle_cookbook_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<FavoriteToggled> {
    let id = parse_id(&id)?;

    let is_favorite = state.cookbooks.toggle_favorite(id).await?;
    success(FavoriteToggled { id, is_favorite })
}
