use axum::{
    Json,
    extract::{Path, State},
};
use storage::{
    Database,
    dto::{task::AdminTaskResponse, user::UserResponse},
};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

/// Anything that is not a UUID cannot name an existing user.
fn parse_user_id(raw: &str) -> Result<Uuid, WebError> {
    Uuid::parse_str(raw).map_err(|_| WebError::NotFound)
}

#[utoipa::path(
    get,
    path = "/api/admin/tasks",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All tasks including closed ones", body = Vec<AdminTaskResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required")
    ),
    tag = "admin"
)]
pub async fn list_admin_tasks(
    State(db): State<Database>,
) -> Result<Json<Vec<AdminTaskResponse>>, WebError> {
    Ok(Json(services::list_tasks(db.pool()).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/tasks/{id}/open",
    params(("id" = String, Path, description = "Task id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Task opened", body = AdminTaskResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Task not found")
    ),
    tag = "admin"
)]
pub async fn open_task(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<AdminTaskResponse>, WebError> {
    Ok(Json(services::set_open(db.pool(), &id, true).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/tasks/{id}/close",
    params(("id" = String, Path, description = "Task id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Task closed", body = AdminTaskResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Task not found")
    ),
    tag = "admin"
)]
pub async fn close_task(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<AdminTaskResponse>, WebError> {
    Ok(Json(services::set_open(db.pool(), &id, false).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/tasks/{id}/freeze",
    params(("id" = String, Path, description = "Task id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Task freezed", body = AdminTaskResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Task not found")
    ),
    tag = "admin"
)]
pub async fn freeze_task(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<AdminTaskResponse>, WebError> {
    Ok(Json(services::set_freezed(db.pool(), &id, true).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/tasks/{id}/unfreeze",
    params(("id" = String, Path, description = "Task id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Task unfreezed", body = AdminTaskResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Task not found")
    ),
    tag = "admin"
)]
pub async fn unfreeze_task(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<AdminTaskResponse>, WebError> {
    Ok(Json(services::set_freezed(db.pool(), &id, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Administrator role required")
    ),
    tag = "admin"
)]
pub async fn list_users(State(db): State<Database>) -> Result<Json<Vec<UserResponse>>, WebError> {
    Ok(Json(services::list_users(db.pool()).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/runner",
    params(("id" = String, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User tagged as runner", body = UserResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin"
)]
pub async fn set_runner(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, WebError> {
    let user_id = parse_user_id(&id)?;
    Ok(Json(services::set_runner(db.pool(), user_id, true).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/not-runner",
    params(("id" = String, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Runner tag removed", body = UserResponse),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "User not found")
    ),
    tag = "admin"
)]
pub async fn unset_runner(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, WebError> {
    let user_id = parse_user_id(&id)?;
    Ok(Json(services::set_runner(db.pool(), user_id, false).await?))
}
