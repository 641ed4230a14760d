use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Attempt, Task, User};
use crate::services::lifecycle::{self, LifecycleError, SubmitOutcome};

const ATTEMPT_COLUMNS: &str = "user_id, task_id, start_at, finish_at";

/// Applies lifecycle transitions. The rules live in
/// [`crate::services::lifecycle`]; this repository makes each transition
/// atomic per (user, task).
pub struct AttemptRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AttemptRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Attempt>> {
        let attempts = sqlx::query_as::<_, Attempt>(&format!(
            r#"
            SELECT {ATTEMPT_COLUMNS}
            FROM attempts
            WHERE user_id = $1
            ORDER BY COALESCE(start_at, finish_at)
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(attempts)
    }

    pub async fn find(&self, user_id: Uuid, task_id: &str) -> Result<Option<Attempt>> {
        let attempt = sqlx::query_as::<_, Attempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE user_id = $1 AND task_id = $2"
        ))
        .bind(user_id)
        .bind(task_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(attempt)
    }

    /// Start the actor's timer on `task`.
    ///
    /// Concurrent starts for the same pair race on the primary key; the loser
    /// gets `InvalidState` and the winner's row is never overwritten.
    pub async fn start(&self, actor: &User, task: &Task, now: DateTime<Utc>) -> Result<Attempt> {
        let existing = self.find(actor.user_id, &task.task_id).await?;
        let attempt = lifecycle::start(actor, task, existing.as_ref(), now)?;

        let inserted = sqlx::query_as::<_, Attempt>(&format!(
            r#"
            INSERT INTO attempts (user_id, task_id, start_at, finish_at)
            VALUES ($1, $2, $3, NULL)
            ON CONFLICT (user_id, task_id) DO NOTHING
            RETURNING {ATTEMPT_COLUMNS}
            "#
        ))
        .bind(attempt.user_id)
        .bind(&attempt.task_id)
        .bind(attempt.start_at)
        .fetch_optional(self.pool)
        .await?;

        inserted.ok_or_else(|| {
            tracing::debug!(
                user_id = %attempt.user_id,
                task_id = %attempt.task_id,
                "Concurrent start lost the insert race"
            );
            StorageError::from(LifecycleError::InvalidState(
                "an attempt already exists for this task".to_string(),
            ))
        })
    }

    /// Submit a flag for (user, task) inside one transaction.
    ///
    /// The attempt row is locked while the outcome is decided, and the write
    /// only succeeds against an unfinished row, so a running attempt is
    /// finalized exactly once.
    pub async fn submit(
        &self,
        user_id: Uuid,
        task: &Task,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Attempt>(&format!(
            r#"
            SELECT {ATTEMPT_COLUMNS}
            FROM attempts
            WHERE user_id = $1 AND task_id = $2
            FOR UPDATE
            "#
        ))
        .bind(user_id)
        .bind(&task.task_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = lifecycle::submit(user_id, task, existing.as_ref(), candidate, now)?;

        match &outcome {
            SubmitOutcome::Incorrect => {}
            SubmitOutcome::Finished(attempt) => finish(&mut tx, attempt).await?,
            SubmitOutcome::UntimedSolve(attempt) => record_untimed(&mut tx, attempt).await?,
        }

        tx.commit().await?;

        Ok(outcome)
    }
}

async fn finish(tx: &mut Transaction<'_, Postgres>, attempt: &Attempt) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE attempts
        SET finish_at = $3
        WHERE user_id = $1 AND task_id = $2 AND finish_at IS NULL
        "#,
    )
    .bind(attempt.user_id)
    .bind(&attempt.task_id)
    .bind(attempt.finish_at)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() != 1 {
        tracing::debug!(task_id = %attempt.task_id, "Attempt was finalized concurrently");
        return Err(LifecycleError::NotPermitted("task already solved".to_string()).into());
    }

    Ok(())
}

async fn record_untimed(tx: &mut Transaction<'_, Postgres>, attempt: &Attempt) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO attempts (user_id, task_id, start_at, finish_at)
        VALUES ($1, $2, NULL, $3)
        ON CONFLICT (user_id, task_id) DO NOTHING
        "#,
    )
    .bind(attempt.user_id)
    .bind(&attempt.task_id)
    .bind(attempt.finish_at)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() != 1 {
        tracing::debug!(task_id = %attempt.task_id, "Attempt appeared while recording untimed solve");
        return Err(LifecycleError::NotPermitted(
            "attempt changed while submitting".to_string(),
        )
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ranking::RankingRepository;
    use crate::test_support::{self, FLAG};

    const CONTENDERS: usize = 8;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_starts_have_one_winner() {
        let Some(db) = test_support::database().await else {
            return;
        };
        let user = test_support::user(&db).await;
        let task = test_support::task(&db, true, false).await;

        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let pool = db.pool().clone();
                let (user, task) = (user.clone(), task.clone());
                tokio::spawn(async move {
                    AttemptRepository::new(&pool)
                        .start(&user, &task, Utc::now())
                        .await
                })
            })
            .collect();

        let mut started = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(attempt) => {
                    started += 1;
                    assert!(attempt.is_running());
                }
                Err(StorageError::Lifecycle(LifecycleError::InvalidState(_))) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(started, 1);

        let stored = AttemptRepository::new(db.pool())
            .find(user.user_id, &task.task_id)
            .await
            .unwrap();
        assert!(stored.is_some_and(|a| a.is_running()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_correct_submissions_finalize_once() {
        let Some(db) = test_support::database().await else {
            return;
        };
        let user = test_support::user(&db).await;
        let task = test_support::task(&db, true, false).await;
        let repo = AttemptRepository::new(db.pool());
        let started = repo.start(&user, &task, Utc::now()).await.unwrap();

        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let pool = db.pool().clone();
                let task = task.clone();
                let user_id = user.user_id;
                tokio::spawn(async move {
                    AttemptRepository::new(&pool)
                        .submit(user_id, &task, FLAG, Utc::now())
                        .await
                })
            })
            .collect();

        let mut finished = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(SubmitOutcome::Finished(attempt)) => finished.push(attempt),
                Ok(other) => panic!("unexpected outcome: {other:?}"),
                Err(StorageError::Lifecycle(LifecycleError::NotPermitted(_))) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(finished.len(), 1);

        let stored = repo.find(user.user_id, &task.task_id).await.unwrap().unwrap();
        assert!(stored.is_finished());
        assert_eq!(stored.start_at, started.start_at);
        let drift = stored.finish_at.unwrap() - finished[0].finish_at.unwrap();
        assert!(drift.num_milliseconds().abs() < 1);

        let solves = RankingRepository::new(db.pool())
            .solves_for_task(&task.task_id)
            .await
            .unwrap();
        assert_eq!(solves.len(), 1);
        assert_eq!(solves[0].user_id, user.user_id);
    }

    #[tokio::test]
    async fn test_wrong_flag_leaves_attempt_running() {
        let Some(db) = test_support::database().await else {
            return;
        };
        let user = test_support::user(&db).await;
        let task = test_support::task(&db, true, false).await;
        let repo = AttemptRepository::new(db.pool());
        repo.start(&user, &task, Utc::now()).await.unwrap();

        let outcome = repo
            .submit(user.user_id, &task, "RTACON{nope}", Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Incorrect);

        let stored = repo.find(user.user_id, &task.task_id).await.unwrap().unwrap();
        assert!(stored.is_running());
    }

    #[tokio::test]
    async fn test_untimed_solve_is_terminal_and_unranked() {
        let Some(db) = test_support::database().await else {
            return;
        };
        let direct = test_support::user(&db).await;
        let timed = test_support::user(&db).await;
        let task = test_support::task(&db, true, true).await;
        let repo = AttemptRepository::new(db.pool());

        repo.start(&timed, &task, Utc::now()).await.unwrap();
        let outcome = repo
            .submit(timed.user_id, &task, FLAG, Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Finished(_)));

        let outcome = repo
            .submit(direct.user_id, &task, FLAG, Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::UntimedSolve(_)));

        assert!(matches!(
            repo.start(&direct, &task, Utc::now()).await,
            Err(StorageError::Lifecycle(LifecycleError::InvalidState(_)))
        ));
        assert!(matches!(
            repo.submit(direct.user_id, &task, FLAG, Utc::now()).await,
            Err(StorageError::Lifecycle(LifecycleError::NotPermitted(_)))
        ));

        let solves = RankingRepository::new(db.pool())
            .solves_for_task(&task.task_id)
            .await
            .unwrap();
        let solvers: Vec<_> = solves.iter().map(|s| s.user_id).collect();
        assert_eq!(solvers, vec![timed.user_id]);

        let mine = repo.list_for_user(direct.user_id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine[0].is_finished() && !mine[0].is_timed());
    }
}
