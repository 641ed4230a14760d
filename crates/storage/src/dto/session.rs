use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{elapsed_seconds, epoch_seconds};
use crate::models::{Attempt, User};

/// An attempt as seen by its owner.
///
/// `start_at` is null for an untimed solve. `elapsed` is authoritative once
/// `finish_at` is set; while running it is an advisory snapshot taken when the
/// response was built.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttemptResponse {
    pub user_id: Uuid,
    pub task_id: String,
    pub start_at: Option<f64>,
    pub finish_at: Option<f64>,
    pub elapsed: Option<f64>,
}

impl AttemptResponse {
    pub fn new(attempt: &Attempt, now: DateTime<Utc>) -> Self {
        Self {
            user_id: attempt.user_id,
            task_id: attempt.task_id.clone(),
            start_at: attempt.start_at.map(epoch_seconds),
            finish_at: attempt.finish_at.map(epoch_seconds),
            elapsed: attempt.elapsed_at(now).map(elapsed_seconds),
        }
    }
}

/// The logged-in user together with all of their attempts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub is_runner: bool,
    pub attempts: Vec<AttemptResponse>,
}

impl SessionResponse {
    pub fn new(user: User, attempts: &[Attempt], now: DateTime<Utc>) -> Self {
        Self {
            id: user.user_id,
            username: user.username,
            is_admin: user.is_admin,
            is_runner: user.is_runner,
            attempts: attempts
                .iter()
                .map(|attempt| AttemptResponse::new(attempt, now))
                .collect(),
        }
    }
}
