//! Route guard.
//!
//! Every authenticated route passes through [`require_session`]. Pages bounce to the
//! login page; API calls get a 401 envelope.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

/// Where signed-out visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Which kind of route a guard protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Page,
    Api,
}

impl Surface {
    /// Response for a request that arrived without a session.
    pub fn reject(self) -> Response {
        match self {
            Surface::Page => {
                (StatusCode::SEE_OTHER, [(header::LOCATION, LOGIN_PATH)]).into_response()
            }
            Surface::Api => AppError::Unauthorized("Sign in required".to_string()).into_response(),
        }
    }
}

/// Guard for authenticated pages.
pub async fn page_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    require_session(&state, Surface::Page, request, next).await
}

/// Guard for authenticated API actions.
pub async fn api_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    require_session(&state, Surface::Api, request, next).await
}

async fn require_session(state: &AppState, surface: Surface, request: Request, next: Next) -> Response {
    // An expired token is exchanged here so handlers never send a stale one
    state.session.ensure_fresh().await;

    if !state.session.is_signed_in() {
        tracing::debug!(path = %request.uri().path(), "Rejected request without a session");
        return surface.reject();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Router};
    use tower::ServiceExt;

    use crate::config::Config;

    /// State whose backend is never reached: nobody is signed in.
    fn signed_out_state() -> AppState {
        let config = Config {
            backend_url: "http://127.0.0.1:9".to_string(),
            backend_key: "anon-key".to_string(),
            session_db_path: "unused.sqlite".into(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            open_library_url: "http://127.0.0.1:9".to_string(),
            google_books_url: "http://127.0.0.1:9".to_string(),
            http_timeout: Duration::from_secs(1),
            log_level: "warn".to_string(),
        };
        AppState::new(config, None).unwrap()
    }

    fn get_request(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_page_rejection_redirects_to_login() {
        let response = Surface::Page.reject();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
    }

    #[test]
    fn test_api_rejection_is_unauthorized() {
        let response = Surface::Api.reject();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_guard_layers_on_router() {
        let state = signed_out_state();
        let pages = Router::new()
            .route("/favorites", get(|| async { "favorites" }))
            .route_layer(middleware::from_fn_with_state(state.clone(), page_guard))
            .with_state(state.clone());
        let api = Router::new()
            .route("/api/recipes", get(|| async { "recipes" }))
            .route_layer(middleware::from_fn_with_state(state.clone(), api_guard))
            .with_state(state);

        let response = pages.oneshot(get_request("/favorites")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = api.oneshot(get_request("/api/recipes")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
