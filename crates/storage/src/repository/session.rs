use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Session, User};

pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (session_id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING session_id, user_id, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(session)
    }

    /// Resolve a bearer token to its user, ignoring expired sessions
    pub async fn find_user(&self, session_id: Uuid, now: DateTime<Utc>) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.user_id, u.username, u.is_admin, u.is_runner, u.created_at
            FROM sessions s
            INNER JOIN users u ON u.user_id = s.user_id
            WHERE s.session_id = $1 AND s.expires_at > $2
            "#,
        )
        .bind(session_id)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    pub async fn delete(&self, session_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
