use sqlx::PgPool;
use storage::{
    dto::{task::AdminTaskResponse, user::UserResponse},
    error::Result,
    repository::{task::TaskRepository, user::UserRepository},
};
use uuid::Uuid;

/// List every task including closed ones
pub async fn list_tasks(pool: &PgPool) -> Result<Vec<AdminTaskResponse>> {
    let tasks = TaskRepository::new(pool).list().await?;
    Ok(tasks.into_iter().map(AdminTaskResponse::from).collect())
}

/// Open or close a task. Existing attempts are left alone.
pub async fn set_open(pool: &PgPool, task_id: &str, is_open: bool) -> Result<AdminTaskResponse> {
    let task = TaskRepository::new(pool).set_open(task_id, is_open).await?;
    tracing::info!(task = %task.name, is_open, "Task visibility changed");
    Ok(AdminTaskResponse::from(task))
}

/// Freeze or unfreeze a task. Only affects submission eligibility from now on.
pub async fn set_freezed(
    pool: &PgPool,
    task_id: &str,
    is_freezed: bool,
) -> Result<AdminTaskResponse> {
    let task = TaskRepository::new(pool)
        .set_freezed(task_id, is_freezed)
        .await?;
    tracing::info!(task = %task.name, is_freezed, "Task freeze changed");
    Ok(AdminTaskResponse::from(task))
}

pub async fn list_users(pool: &PgPool) -> Result<Vec<UserResponse>> {
    let users = UserRepository::new(pool).list().await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

/// Toggle the runner tag. Rankings pick it up on their next read.
pub async fn set_runner(pool: &PgPool, user_id: Uuid, is_runner: bool) -> Result<UserResponse> {
    let user = UserRepository::new(pool)
        .set_runner(user_id, is_runner)
        .await?;
    tracing::info!(user_id = %user.user_id, is_runner, "Runner flag changed");
    Ok(UserResponse::from(user))
}
