use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub is_runner: bool,
    pub created_at: DateTime<Utc>,
}

/// Login lookup row. Kept apart from [`User`] so the hash never travels
/// further than the credential check.
#[derive(Clone, FromRow)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub password_hash: String,
}
