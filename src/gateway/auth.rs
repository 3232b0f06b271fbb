//! Auth endpoints: password sign-in, sign-up, refresh, user read/update, sign-out.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{check, AuthChange, RestGateway};
use crate::errors::AppError;
use crate::models::{Session, User};

/// Token lifetime assumed when the backend omits both expiry fields.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

impl RemoteUser {
    /// Accounts without an email are not treated as signed in.
    fn into_user(self) -> Result<User, AppError> {
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::Decode(format!("User {} has no email", self.id)))?;
        let metadata = self.user_metadata.unwrap_or_default();

        Ok(User {
            id: self.id,
            email,
            name: metadata.name.or(metadata.full_name),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: RemoteUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Result<Session, AppError> {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(|| {
                now + ChronoDuration::seconds(self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS))
            });

        Ok(Session {
            user: self.user.into_user()?,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        })
    }
}

/// Sign-up answers with a session when email confirmation is off, else with the user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Wrapped { user: RemoteUser },
    User(RemoteUser),
}

impl RestGateway {
    /// Sign in with an email/password pair and make the result the active session.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        let response = self
            .http
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header(super::API_KEY_HEADER, &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let token: TokenResponse = check(response).await?.json().await?;
        let session = token.into_session(Utc::now())?;

        tracing::info!(user_id = %session.user.id, "Signed in");
        self.publish(AuthChange::SignedIn, Some(session.clone()));
        Ok(session)
    }

    /// Register an account; the display name is stored as user metadata.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User, AppError> {
        let response = self
            .http
            .post(self.url("/auth/v1/signup"))
            .header(super::API_KEY_HEADER, &self.api_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await?;

        let body: SignUpResponse = check(response).await?.json().await?;
        match body {
            SignUpResponse::Session(token) => {
                let session = token.into_session(Utc::now())?;
                let user = session.user.clone();
                tracing::info!(user_id = %user.id, "Registered and signed in");
                self.publish(AuthChange::SignedIn, Some(session));
                Ok(user)
            }
            SignUpResponse::Wrapped { user } | SignUpResponse::User(user) => {
                let user = user.into_user()?;
                tracing::info!(user_id = %user.id, "Registered");
                Ok(user)
            }
        }
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AppError> {
        let response = self
            .http
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .header(super::API_KEY_HEADER, &self.api_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let token: TokenResponse = check(response).await?.json().await?;
        let session = token.into_session(Utc::now())?;

        self.publish(AuthChange::TokenRefreshed, Some(session.clone()));
        Ok(session)
    }

    /// Read the identity behind an access token.
    pub async fn get_user(&self, access_token: &str) -> Result<User, AppError> {
        let response = self
            .http
            .get(self.url("/auth/v1/user"))
            .header(super::API_KEY_HEADER, &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let user: RemoteUser = check(response).await?.json().await?;
        user.into_user()
    }

    /// Replace the display name in the user metadata of the active session.
    pub async fn update_user_name(&self, name: &str) -> Result<User, AppError> {
        let Some(mut session) = self.session() else {
            return Err(AppError::Unauthorized("Not signed in".to_string()));
        };

        let response = self
            .authorized(self.http.put(self.url("/auth/v1/user")))
            .json(&json!({ "data": { "name": name } }))
            .send()
            .await?;

        let user = check(response).await?.json::<RemoteUser>().await?.into_user()?;
        session.user = user.clone();
        self.publish(AuthChange::UserUpdated, Some(session));
        Ok(user)
    }

    /// Invalidate the token on the backend and drop the local session.
    ///
    /// A token the backend no longer knows (401/404) still counts as signed out;
    /// a transport failure keeps the session.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        if self.session().is_some() {
            let response = self
                .authorized(self.http.post(self.url("/auth/v1/logout")))
                .send()
                .await?;

            match check(response).await {
                Ok(_) => {}
                Err(AppError::Backend { status, .. }) if status == 401 || status == 404 => {}
                Err(e) => return Err(e),
            }
        }

        tracing::info!("Signed out");
        self.publish(AuthChange::SignedOut, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_prefers_absolute_expiry() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "user": {
                "id": "7f0c1a9e-3d1b-4c57-9a52-2b3f4c5d6e7f",
                "email": "kari@example.com",
                "user_metadata": { "full_name": "Kari N" }
            }
        }))
        .unwrap();

        let session = token.into_session(Utc::now()).unwrap();
        assert_eq!(session.expires_at.timestamp(), 1_900_000_000);
        assert_eq!(session.user.name.as_deref(), Some("Kari N"));
    }

    #[test]
    fn test_user_without_email_is_rejected() {
        let user: RemoteUser = serde_json::from_value(json!({
            "id": "7f0c1a9e-3d1b-4c57-9a52-2b3f4c5d6e7f",
            "email": ""
        }))
        .unwrap();
        assert!(matches!(user.into_user(), Err(AppError::Decode(_))));
    }

    #[test]
    fn test_sign_up_response_variants() {
        let wrapped: SignUpResponse = serde_json::from_value(json!({
            "user": { "id": "7f0c1a9e-3d1b-4c57-9a52-2b3f4c5d6e7f", "email": "a@b.no" }
        }))
        .unwrap();
        assert!(matches!(wrapped, SignUpResponse::Wrapped { .. }));

        let bare: SignUpResponse = serde_json::from_value(json!({
            "id": "7f0c1a9e-3d1b-4c57-9a52-2b3f4c5d6e7f", "email": "a@b.no"
        }))
        .unwrap();
        assert!(matches!(bare, SignUpResponse::User(_)));
    }
}
