use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A login. `session_id` doubles as the bearer token.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
