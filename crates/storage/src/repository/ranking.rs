use sqlx::PgPool;

use crate::error::Result;
use crate::models::Solve;

const SOLVE_SELECT: &str = r#"
    SELECT a.task_id, a.user_id, u.username, u.is_runner, a.start_at, a.finish_at
    FROM attempts a
    INNER JOIN users u ON u.user_id = a.user_id
    WHERE a.finish_at IS NOT NULL
      AND a.start_at IS NOT NULL
"#;

/// Reads solve snapshots. Each call is a single statement, so the rows come
/// from one consistent view and always carry a `finish_at`.
pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn solves_for_task(&self, task_id: &str) -> Result<Vec<Solve>> {
        let solves = sqlx::query_as::<_, Solve>(&format!("{SOLVE_SELECT} AND a.task_id = $1"))
            .bind(task_id)
            .fetch_all(self.pool)
            .await?;

        Ok(solves)
    }

    pub async fn solves_for_tasks(&self, task_ids: &[String]) -> Result<Vec<Solve>> {
        let solves =
            sqlx::query_as::<_, Solve>(&format!("{SOLVE_SELECT} AND a.task_id = ANY($1)"))
                .bind(task_ids)
                .fetch_all(self.pool)
                .await?;

        Ok(solves)
    }
}
