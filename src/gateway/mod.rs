//! Remote data gateway for the hosted auth/database backend.
//!
//! Speaks the GoTrue-style `/auth/v1` endpoints and the PostgREST-style `/rest/v1`
//! table endpoints. Auth state lives in a `watch` channel so that every sign-in,
//! sign-out, token refresh and profile update is observed atomically by subscribers.

mod auth;
mod tables;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tokio::sync::watch;

use crate::errors::AppError;
use crate::models::{Session, User};

/// Header carrying the public API key.
pub const API_KEY_HEADER: &str = "apikey";

/// What caused the latest auth state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChange {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

impl AuthChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthChange::InitialSession => "INITIAL_SESSION",
            AuthChange::SignedIn => "SIGNED_IN",
            AuthChange::SignedOut => "SIGNED_OUT",
            AuthChange::TokenRefreshed => "TOKEN_REFRESHED",
            AuthChange::UserUpdated => "USER_UPDATED",
        }
    }
}

/// Latest auth notification: the change and the session it produced.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub change: AuthChange,
    pub session: Option<Session>,
}

/// HTTP client for the hosted backend.
pub struct RestGateway {
    http: Client,
    base_url: String,
    api_key: String,
    auth: watch::Sender<AuthState>,
}

impl RestGateway {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let (auth, _) = watch::channel(AuthState {
            change: AuthChange::InitialSession,
            session: None,
        });

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            auth,
        })
    }

    /// Subscribe to auth state changes for as long as the receiver lives.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.auth.subscribe()
    }

    /// The session the gateway currently authenticates with.
    pub fn session(&self) -> Option<Session> {
        self.auth.borrow().session.clone()
    }

    /// Install a session obtained outside a sign-in call (e.g. restored from disk).
    pub fn adopt_session(&self, session: Session) {
        self.publish(AuthChange::InitialSession, Some(session));
    }

    /// Swap the user of the active session after a profile re-read.
    pub fn replace_user(&self, user: User) {
        let Some(mut session) = self.session() else {
            return;
        };
        session.user = user;
        self.publish(AuthChange::UserUpdated, Some(session));
    }

    /// Drop the active session locally without contacting the backend.
    pub fn forget_session(&self) {
        self.publish(AuthChange::SignedOut, None);
    }

    fn publish(&self, change: AuthChange, session: Option<Session>) {
        tracing::debug!(event = change.as_str(), "Auth state changed");
        self.auth.send_replace(AuthState { change, session });
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the API key and bearer token (the session's, else the API key itself).
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .auth
            .borrow()
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.api_key.clone());

        request
            .header(API_KEY_HEADER, &self.api_key)
            .bearer_auth(bearer)
    }
}

/// Error body shapes used by the auth and table endpoints.
#[derive(Debug, Default, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn a non-success response into `AppError::Backend`.
async fn check(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: RemoteErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .message
        .or(body.msg)
        .or(body.error_description)
        .or(body.error)
        .unwrap_or_else(|| format!("Backend responded with {}", status));

    tracing::warn!(status = status.as_u16(), "Backend error: {}", message);
    Err(AppError::Backend {
        status: status.as_u16(),
        message,
    })
}
