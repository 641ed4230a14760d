use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::{
        session::AttemptResponse,
        task::{SubmitFlagResponse, TaskDetailResponse, TaskSummaryResponse},
    },
    error::{Result, StorageError},
    models::User,
    repository::{attempt::AttemptRepository, ranking::RankingRepository, task::TaskRepository},
    services::{
        lifecycle::{SubmitOutcome, format_elapsed},
        ranking,
    },
};

/// List visible tasks, each with its live ranking
pub async fn list_tasks(pool: &PgPool, include_closed: bool) -> Result<Vec<TaskSummaryResponse>> {
    let repo = TaskRepository::new(pool);
    let tasks = if include_closed {
        repo.list().await?
    } else {
        repo.list_open().await?
    };

    let task_ids: Vec<String> = tasks.iter().map(|t| t.task_id.clone()).collect();
    let solves = RankingRepository::new(pool)
        .solves_for_tasks(&task_ids)
        .await?;
    let mut rankings = ranking::rank_by_task(solves);

    Ok(tasks
        .into_iter()
        .map(|task| {
            let ranked = rankings.remove(&task.task_id).unwrap_or_default();
            TaskSummaryResponse::new(task, ranked)
        })
        .collect())
}

/// Get one task with its ranking. Closed tasks only exist for admins.
pub async fn get_task(
    pool: &PgPool,
    task_id: &str,
    include_closed: bool,
) -> Result<TaskDetailResponse> {
    let task = TaskRepository::new(pool).find_by_id(task_id).await?;
    if !task.is_open && !include_closed {
        return Err(StorageError::NotFound);
    }

    let solves = RankingRepository::new(pool)
        .solves_for_task(&task.task_id)
        .await?;

    Ok(TaskDetailResponse::new(task, ranking::rank(solves)))
}

/// Start the caller's timer on a task
pub async fn start_attempt(pool: &PgPool, actor: &User, task_id: &str) -> Result<AttemptResponse> {
    let task = TaskRepository::new(pool).find_by_id(task_id).await?;
    let now = Utc::now();

    let attempt = AttemptRepository::new(pool).start(actor, &task, now).await?;

    tracing::info!(
        user_id = %actor.user_id,
        task = %task.name,
        "Attempt started"
    );

    Ok(AttemptResponse::new(&attempt, now))
}

/// Submit a flag for the caller's attempt on a task
pub async fn submit_flag(
    pool: &PgPool,
    user: &User,
    task_id: &str,
    flag: &str,
) -> Result<SubmitFlagResponse> {
    let task = TaskRepository::new(pool).find_by_id(task_id).await?;

    let outcome = AttemptRepository::new(pool)
        .submit(user.user_id, &task, flag, Utc::now())
        .await?;

    match &outcome {
        SubmitOutcome::Incorrect => {
            tracing::debug!(user_id = %user.user_id, task = %task.name, "Incorrect flag");
        }
        SubmitOutcome::Finished(attempt) => {
            let elapsed = attempt.elapsed().map(format_elapsed).unwrap_or_default();
            tracing::info!(
                user_id = %user.user_id,
                task = %task.name,
                elapsed = %elapsed,
                "Attempt finished"
            );
        }
        SubmitOutcome::UntimedSolve(_) => {
            tracing::info!(
                user_id = %user.user_id,
                task = %task.name,
                "Untimed solve on freezed task"
            );
        }
    }

    Ok(SubmitFlagResponse {
        solved: outcome.solved(),
    })
}
