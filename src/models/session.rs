//! Session and account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    /// Name shown in greetings: display name, else the local part of the email.
    pub fn greeting_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// An authenticated session and its token lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Request body for signing in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for registering a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for editing the profile.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateRequest {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_name_falls_back_to_email() {
        let mut user = User {
            id: Uuid::nil(),
            email: "kari@example.com".to_string(),
            name: None,
        };
        assert_eq!(user.greeting_name(), "kari");

        user.name = Some("Kari Nordmann".to_string());
        assert_eq!(user.greeting_name(), "Kari Nordmann");
    }

    #[test]
    fn test_tokens_are_not_serialized() {
        let session = Session {
            user: User {
                id: Uuid::nil(),
                email: "kari@example.com".to_string(),
                name: None,
            },
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            expires_at: Utc::now(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret"));
    }
}
