use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::{
        session::SessionResponse,
        user::{AuthResponse, LoginRequest, RegisterRequest},
    },
    error::{Result, StorageError},
    models::User,
    repository::{attempt::AttemptRepository, session::SessionRepository, user::UserRepository},
    services::passwords,
};
use uuid::Uuid;

use crate::error::WebError;
use crate::state::SessionSettings;

/// Create an account and log it in
pub async fn register(
    pool: &PgPool,
    request: &RegisterRequest,
    settings: SessionSettings,
) -> std::result::Result<AuthResponse, WebError> {
    let password = request.password.clone();
    let password_hash = blocking(move || passwords::hash_password(&password)).await?;
    let user = UserRepository::new(pool)
        .create(&request.username, &password_hash)
        .await?;

    tracing::info!(user_id = %user.user_id, "Registered new user");

    Ok(open_session(pool, user.user_id, settings).await?)
}

/// Check credentials and open a session. `None` when they do not match.
pub async fn login(
    pool: &PgPool,
    request: &LoginRequest,
    settings: SessionSettings,
) -> std::result::Result<Option<AuthResponse>, WebError> {
    let Some(credentials) = UserRepository::new(pool)
        .find_credentials(&request.username)
        .await?
    else {
        return Ok(None);
    };

    let password = request.password.clone();
    let encoded = credentials.password_hash;
    if !blocking(move || passwords::verify_password(&encoded, &password)).await? {
        return Ok(None);
    }

    Ok(Some(
        open_session(pool, credentials.user_id, settings).await?,
    ))
}

/// Runs argon2 work on the blocking pool.
async fn blocking<T, F>(work: F) -> std::result::Result<T, WebError>
where
    F: FnOnce() -> std::result::Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| WebError::InternalServerError(format!("password task failed: {}", e)))?
        .map_err(WebError::from)
}

pub async fn logout(pool: &PgPool, session_id: Uuid) -> Result<()> {
    SessionRepository::new(pool).delete(session_id).await
}

/// The caller together with every attempt they own
pub async fn session_view(pool: &PgPool, user: User) -> Result<SessionResponse> {
    let attempts = AttemptRepository::new(pool)
        .list_for_user(user.user_id)
        .await?;

    Ok(SessionResponse::new(user, &attempts, Utc::now()))
}

async fn open_session(
    pool: &PgPool,
    user_id: Uuid,
    settings: SessionSettings,
) -> Result<AuthResponse> {
    let session = SessionRepository::new(pool)
        .create(user_id, Utc::now() + settings.ttl)
        .await?;

    Ok(AuthResponse {
        user_id,
        token: session.session_id,
    })
}
