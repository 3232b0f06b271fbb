//! Recipe actions.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{parse_id, success, ApiResult, Deleted, FavoriteToggled};
use crate::errors::AppError;
use crate::models::{Recipe, RecipeInput};
use crate::AppState;

/// POST /api/recipes - Save a new recipe.
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(request): Json<RecipeInput>,
) -> ApiResult<Recipe> {
    request.validate()?;

    let recipe = state.recipes.add(request.normalized()).await?;
    tracing::info!(id = recipe.id, "Recipe added");
    success(recipe)
}

/// PUT /api/recipes/{id} - Replace every editable field of a recipe.
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RecipeInput>,
) -> ApiResult<Recipe> {
    let id = parse_id(&id)?;
    request.validate()?;

    let existing = state
        .recipes
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Recipe {} not found", id)))?;

    let recipe = state
        .recipes
        .update(existing.with_changes(request.normalized()))
        .await?;
    success(recipe)
}

/// DELETE /api/recipes/{id} - Delete a recipe.
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;

    state.recipes.remove(id).await?;
    success(Deleted { id })
}

/// POST /api/recipes/{id}/favorite - Flip the favorite flag.
pub async fn toggle_recipe_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<FavoriteToggled> {
    let id = parse_id(&id)?;

    let is_favorite = state.recipes.toggle_favorite(id).await?;
    success(FavoriteToggled { id, is_favorite })
}
