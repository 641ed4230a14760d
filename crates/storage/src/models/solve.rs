use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A timed, finished attempt joined with the solver's display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Solve {
    pub task_id: String,
    pub user_id: Uuid,
    pub username: String,
    pub is_runner: bool,
    pub start_at: DateTime<Utc>,
    pub finish_at: DateTime<Utc>,
}

impl Solve {
    pub fn elapsed(&self) -> Duration {
        self.finish_at - self.start_at
    }
}
