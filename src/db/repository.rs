//! Persisted session row.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Session, User};

/// Reads and writes the single persisted session row.
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the persisted session, if any.
    pub async fn load(&self) -> Result<Option<Session>, AppError> {
        let row = sqlx::query(
            "SELECT user_id, email, name, access_token, refresh_token, expires_at FROM auth_session WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    /// Store `session`, replacing whatever was there.
    pub async fn save(&self, session: &Session) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO auth_session (id, user_id, email, name, access_token, refresh_token, expires_at, updated_at)
               VALUES (1, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   user_id = excluded.user_id,
                   email = excluded.email,
                   name = excluded.name,
                   access_token = excluded.access_token,
                   refresh_token = excluded.refresh_token,
                   expires_at = excluded.expires_at,
                   updated_at = excluded.updated_at"#,
        )
        .bind(session.user.id.to_string())
        .bind(&session.user.email)
        .bind(&session.user.name)
        .bind(&session.access_token)
        .bind(&session.refresh_token)
        .bind(session.expires_at.to_rfc3339())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Forget the persisted session.
    pub async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM auth_session WHERE id = 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn session_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Session, AppError> {
    let user_id: String = row.try_get("user_id")?;
    let expires_at: String = row.try_get("expires_at")?;

    let id = Uuid::parse_str(&user_id)
        .map_err(|e| AppError::Database(format!("Corrupt session user id: {}", e)))?;
    let expires_at = DateTime::parse_from_rfc3339(&expires_at)
        .map_err(|e| AppError::Database(format!("Corrupt session expiry: {}", e)))?
        .with_timezone(&Utc);

    Ok(Session {
        user: User {
            id,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
        },
        access_token: row.try_get("access_token")?,
        refresh_token: row.try_get("refresh_token")?,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    fn sample_session() -> Session {
        Session {
            user: User {
                id: Uuid::new_v4(),
                email: "kari@example.com".to_string(),
                name: Some("Kari".to_string()),
            },
            access_token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            expires_at: DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("session.sqlite"))
            .await
            .unwrap();
        let repo = SessionRepository::new(pool);

        assert!(repo.load().await.unwrap().is_none());

        let mut session = sample_session();
        repo.save(&session).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(session.clone()));

        session.access_token = "access-2".to_string();
        session.user.name = None;
        repo.save(&session).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(session));

        repo.clear().await.unwrap();
        assert!(repo.load().await.unwrap().is_none());
    }
}
