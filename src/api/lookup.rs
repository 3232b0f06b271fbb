//! ISBN lookup endpoint.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::lookup::{is_plausible_isbn, normalize_isbn};
use crate::models::BookMetadata;
use crate::AppState;

/// GET /api/lookup/{isbn} - Prefill data for a new cookbook.
pub async fn lookup_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> ApiResult<BookMetadata> {
    let isbn = normalize_isbn(&isbn);
    if !is_plausible_isbn(&isbn) {
        return Err(AppError::Validation(format!("{} is not an ISBN", isbn)));
    }

    match state.lookup.lookup(&isbn).await {
        Some(book) => success(book),
        None => Err(AppError::NotFound(format!("No book found for ISBN {}", isbn))),
    }
}
