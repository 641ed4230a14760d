use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        session::SessionResponse,
        user::{AuthResponse, LoginRequest, RegisterRequest},
    },
};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::CurrentUser;
use crate::state::SessionSettings;

use super::services;

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and logged in", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already taken")
    ),
    tag = "session"
)]
pub async fn register(
    State(db): State<Database>,
    State(settings): State<SessionSettings>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let auth = services::register(db.pool(), &req, settings).await?;

    Ok((StatusCode::CREATED, Json(auth)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid username or password")
    ),
    tag = "session"
)]
pub async fn login(
    State(db): State<Database>,
    State(settings): State<SessionSettings>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    match services::login(db.pool(), &req, settings).await? {
        Some(auth) => Ok(Json(auth).into_response()),
        None => {
            tracing::warn!("Failed login attempt");
            Err(WebError::Unauthorized)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/logout",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "session"
)]
pub async fn logout(
    State(db): State<Database>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, WebError> {
    let token = current.token.ok_or(WebError::Unauthorized)?;

    services::logout(db.pool(), token).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/info",
    security(
        (),
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current user with attempts, or null when anonymous", body = SessionResponse)
    ),
    tag = "session"
)]
pub async fn get_session(
    State(db): State<Database>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Option<SessionResponse>>, WebError> {
    let Some(user) = current.user else {
        return Ok(Json(None));
    };

    let session = services::session_view(db.pool(), user).await?;

    Ok(Json(Some(session)))
}
