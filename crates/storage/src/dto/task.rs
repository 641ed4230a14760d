use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::common::{elapsed_seconds, epoch_seconds};
use crate::models::Task;
use crate::services::ranking::RankedSolve;

/// One row of a task's speedrun ranking
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SolveResponse {
    pub rank: usize,
    pub user_id: Uuid,
    pub username: String,
    pub is_runner: bool,
    pub start_at: f64,
    pub finish_at: f64,
    pub elapsed: f64,
}

impl From<RankedSolve> for SolveResponse {
    fn from(ranked: RankedSolve) -> Self {
        Self {
            rank: ranked.rank,
            user_id: ranked.solve.user_id,
            username: ranked.solve.username,
            is_runner: ranked.solve.is_runner,
            start_at: epoch_seconds(ranked.solve.start_at),
            finish_at: epoch_seconds(ranked.solve.finish_at),
            elapsed: elapsed_seconds(ranked.elapsed),
        }
    }
}

fn solve_responses(ranking: Vec<RankedSolve>) -> Vec<SolveResponse> {
    ranking.into_iter().map(SolveResponse::from).collect()
}

/// Task entry of the public task list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskSummaryResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub author: String,
    pub solves: Vec<SolveResponse>,
}

impl TaskSummaryResponse {
    pub fn new(task: Task, ranking: Vec<RankedSolve>) -> Self {
        Self {
            id: task.task_id,
            name: task.name,
            category: task.category,
            author: task.author,
            solves: solve_responses(ranking),
        }
    }
}

/// Full task view with its ranking
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskDetailResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub author: String,
    pub description: Option<String>,
    pub is_freezed: bool,
    pub has_attachment: bool,
    pub solves: Vec<SolveResponse>,
}

impl TaskDetailResponse {
    pub fn new(task: Task, ranking: Vec<RankedSolve>) -> Self {
        Self {
            id: task.task_id,
            name: task.name,
            category: task.category,
            author: task.author,
            description: task.description,
            is_freezed: task.is_freezed,
            has_attachment: task.has_attachment,
            solves: solve_responses(ranking),
        }
    }
}

/// Task as managed by administrators
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminTaskResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub author: String,
    pub description: Option<String>,
    pub has_attachment: bool,
    pub is_open: bool,
    pub is_freezed: bool,
}

impl From<Task> for AdminTaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.task_id,
            name: task.name,
            category: task.category,
            author: task.author,
            description: task.description,
            has_attachment: task.has_attachment,
            is_open: task.is_open,
            is_freezed: task.is_freezed,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitFlagRequest {
    #[validate(length(max = 512, message = "Flag must be at most 512 characters"))]
    pub flag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitFlagResponse {
    pub solved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Solve, derive_task_id};
    use crate::services::ranking::rank;
    use chrono::{TimeZone, Utc};

    fn task() -> Task {
        Task {
            task_id: derive_task_id("heap"),
            name: "heap".to_string(),
            category: "pwn".to_string(),
            author: "ptr-yudai".to_string(),
            description: Some("<p>nc localhost 9999</p>".to_string()),
            flag: "RTACON{do_not_leak}".to_string(),
            has_attachment: true,
            is_open: true,
            is_freezed: false,
        }
    }

    fn solve(user: u128, start_ms: i64, finish_ms: i64, is_runner: bool) -> Solve {
        Solve {
            task_id: derive_task_id("heap"),
            user_id: Uuid::from_u128(user),
            username: format!("user{}", user),
            is_runner,
            start_at: Utc.timestamp_millis_opt(start_ms).unwrap(),
            finish_at: Utc.timestamp_millis_opt(finish_ms).unwrap(),
        }
    }

    #[test]
    fn test_flag_never_serialized() {
        let ranking = rank(vec![solve(1, 1_000_000, 1_042_370, false)]);
        let detail = serde_json::to_string(&TaskDetailResponse::new(task(), ranking)).unwrap();
        let summary = serde_json::to_string(&TaskSummaryResponse::new(task(), Vec::new())).unwrap();
        let admin = serde_json::to_string(&AdminTaskResponse::from(task())).unwrap();

        for body in [detail, summary, admin] {
            assert!(!body.contains("RTACON{do_not_leak}"));
            assert!(!body.contains("\"flag\""));
        }
    }

    #[test]
    fn test_detail_carries_ranked_solves_in_seconds() {
        let ranking = rank(vec![
            solve(1, 1_000_000, 1_042_370, false),
            solve(2, 1_000_000, 1_010_000, true),
        ]);
        let detail = TaskDetailResponse::new(task(), ranking);

        assert!(detail.has_attachment);
        assert!(!detail.is_freezed);
        assert_eq!(detail.solves.len(), 2);
        assert_eq!(detail.solves[0].rank, 1);
        assert_eq!(detail.solves[0].username, "user2");
        assert!(detail.solves[0].is_runner);
        assert_eq!(detail.solves[0].elapsed, 10.0);
        assert_eq!(detail.solves[1].start_at, 1000.0);
        assert_eq!(detail.solves[1].finish_at, 1042.37);
        assert_eq!(detail.solves[1].elapsed, 42.37);
    }

    #[test]
    fn test_submit_request_validation() {
        let ok = SubmitFlagRequest { flag: "RTACON{x}".into() };
        let too_long = SubmitFlagRequest { flag: "x".repeat(513) };
        assert!(ok.validate().is_ok());
        assert!(too_long.validate().is_err());
    }
}
