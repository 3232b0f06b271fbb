//! Account endpoints: sign in, register, sign out and the current session.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::AppState;

/// The signed-in identity as the client sees it. Tokens never leave the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionView {
    pub fn of(state: &AppState) -> Self {
        let session = state.session.current();
        Self {
            signed_in: session.is_some(),
            expires_at: session.as_ref().map(|s| s.expires_at),
            user: session.map(|s| s.user),
        }
    }
}

/// POST /api/auth/login - Sign in with email and password.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionView> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    state.session.sign_in(email, &request.password).await?;
    state.collections_ready().await;

    success(SessionView::of(&state))
}

/// POST /api/auth/register - Create an account, signing in when the backend allows it.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<SessionView> {
    let name = request.name.trim();
    let email = request.email.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    let user = state.session.sign_up(email, &request.password, name).await?;

    // Projects that require email confirmation return the user without a session
    if state.session.is_signed_in() {
        state.collections_ready().await;
        return success(SessionView::of(&state));
    }
    success(SessionView {
        signed_in: false,
        user: Some(user),
        expires_at: None,
    })
}

/// POST /api/auth/logout - End the session.
pub async fn logout(State(state): State<AppState>) -> ApiResult<SessionView> {
    state.session.sign_out().await?;
    success(SessionView::of(&state))
}

/// GET /api/auth/session - Who is signed in, if anyone.
pub async fn current_session(State(state): State<AppState>) -> ApiResult<SessionView> {
    success(SessionView::of(&state))
}
