//! Session store.
//!
//! Holds the current authenticated identity. The value is owned by the gateway's auth
//! `watch` channel; this store reads it, drives the auth calls, and mirrors every
//! change into the persisted session row for the lifetime of the process.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use crate::db::SessionRepository;
use crate::errors::AppError;
use crate::gateway::{AuthState, RestGateway};
use crate::models::{Session, User};

pub struct SessionStore {
    gateway: Arc<RestGateway>,
    repo: Option<SessionRepository>,
    state: watch::Receiver<AuthState>,
}

impl SessionStore {
    /// Create the store and start mirroring auth changes into `repo`.
    ///
    /// Must be called from within a tokio runtime when `repo` is set.
    pub fn new(gateway: Arc<RestGateway>, repo: Option<SessionRepository>) -> Self {
        if let Some(repo) = repo.clone() {
            tokio::spawn(persist_changes(gateway.subscribe(), repo));
        }

        Self {
            state: gateway.subscribe(),
            gateway,
            repo,
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().session.as_ref().map(|s| s.user.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().session.is_some()
    }

    /// Receive every future session change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.gateway.subscribe()
    }

    /// Resume the persisted session, if there is one and the backend still accepts it.
    ///
    /// Failures are logged and leave the client signed out.
    pub async fn restore(&self) {
        let Some(repo) = &self.repo else {
            return;
        };

        let stored = match repo.load().await {
            Ok(Some(session)) => session,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Failed to read persisted session: {}", e);
                return;
            }
        };

        let restored = if stored.is_expired(Utc::now()) {
            // Publishes TOKEN_REFRESHED on success
            self.gateway
                .refresh_session(&stored.refresh_token)
                .await
                .map(|_| ())
        } else {
            self.gateway
                .get_user(&stored.access_token)
                .await
                .map(|user| {
                    self.gateway.adopt_session(Session { user, ..stored });
                })
        };

        match restored {
            Ok(()) => tracing::info!("Restored persisted session"),
            Err(e) => {
                tracing::warn!("Persisted session rejected: {}", e);
                if let Err(e) = repo.clear().await {
                    tracing::warn!("Failed to clear persisted session: {}", e);
                }
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        self.gateway.sign_in_with_password(email, password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User, AppError> {
        self.gateway.sign_up(email, password, name).await
    }

    /// Sign out. Transport failures are returned and the session is kept.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.gateway.sign_out().await
    }

    /// Re-read the identity behind the current token.
    ///
    /// On failure the current value is kept and the error is only logged.
    pub async fn refresh(&self) -> Option<User> {
        let session = self.current()?;

        match self.gateway.get_user(&session.access_token).await {
            Ok(user) => {
                self.gateway.replace_user(user.clone());
                Some(user)
            }
            Err(e) => {
                tracing::warn!("Failed to refresh user: {}", e);
                Some(session.user)
            }
        }
    }

    /// Exchange an expired access token before it is used.
    ///
    /// A rejected refresh token ends the session locally.
    pub async fn ensure_fresh(&self) {
        let Some(session) = self.current() else {
            return;
        };
        if !session.is_expired(Utc::now()) {
            return;
        }

        if let Err(e) = self.gateway.refresh_session(&session.refresh_token).await {
            tracing::warn!("Token refresh failed, signing out locally: {}", e);
            self.gateway.forget_session();
        }
    }

    /// Change the display name stored in the user metadata, then re-read the identity.
    pub async fn update_profile(&self, name: &str) -> Result<User, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        let updated = self.gateway.update_user_name(name).await?;
        Ok(self.refresh().await.unwrap_or(updated))
    }
}

/// Mirror every auth change into the persisted row. Latest value wins.
async fn persist_changes(mut changes: watch::Receiver<AuthState>, repo: SessionRepository) {
    while changes.changed().await.is_ok() {
        let state = changes.borrow_and_update().clone();
        let result = match &state.session {
            Some(session) => repo.save(session).await,
            None => repo.clear().await,
        };
        if let Err(e) = result {
            tracing::warn!(event = state.change.as_str(), "Failed to persist session: {}", e);
        }
    }
}
