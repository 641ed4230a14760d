use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        session::AttemptResponse,
        task::{SubmitFlagRequest, SubmitFlagResponse, TaskDetailResponse, TaskSummaryResponse},
    },
};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::CurrentUser;

use super::services;

#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Visible tasks with their rankings", body = Vec<TaskSummaryResponse>)
    ),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(db): State<Database>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<TaskSummaryResponse>>, WebError> {
    let tasks = services::list_tasks(db.pool(), current.is_admin()).await?;

    Ok(Json(tasks))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task id")
    ),
    responses(
        (status = 200, description = "Task found", body = TaskDetailResponse),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(db): State<Database>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let task = services::get_task(db.pool(), &id, current.is_admin()).await?;

    Ok(Json(task).into_response())
}

#[utoipa::path(
    post,
    path = "/api/tasks/{id}/start",
    params(
        ("id" = String, Path, description = "Task id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Attempt started", body = AttemptResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Task is not open"),
        (status = 404, description = "Task not found"),
        (status = 409, description = "Attempt already exists")
    ),
    tag = "tasks"
)]
pub async fn start_attempt(
    State(db): State<Database>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let user = current.require()?;

    let attempt = services::start_attempt(db.pool(), user, &id).await?;

    Ok((StatusCode::CREATED, Json(attempt)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/tasks/{id}/submit",
    params(
        ("id" = String, Path, description = "Task id")
    ),
    request_body = SubmitFlagRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Flag checked", body = SubmitFlagResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Nothing to submit to, or already solved"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn submit_flag(
    State(db): State<Database>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<SubmitFlagRequest>,
) -> Result<Json<SubmitFlagResponse>, WebError> {
    req.validate()?;
    let user = current.require()?;

    let result = services::submit_flag(db.pool(), user, &id, &req.flag).await?;

    Ok(Json(result))
}
