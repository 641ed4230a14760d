use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::error::{Result, StorageError};
use crate::models::Task;

const TASK_COLUMNS: &str =
    "task_id, name, category, author, description, flag, has_attachment, is_open, is_freezed";

/// Fields a task manifest provides. Operational flags are never part of it.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    pub task_id: String,
    pub name: String,
    pub category: String,
    pub author: String,
    pub description: Option<String>,
    pub flag: String,
    pub has_attachment: bool,
}

pub struct TaskRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every task, grouped by category
    pub async fn list(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY category, name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn list_open(&self) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE is_open ORDER BY category, name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn find_by_id(&self, task_id: &str) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = $1"
        ))
        .bind(task_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(task)
    }

    pub async fn set_open(&self, task_id: &str, is_open: bool) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET is_open = $2 WHERE task_id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(task_id)
        .bind(is_open)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(task)
    }

    pub async fn set_freezed(&self, task_id: &str, is_freezed: bool) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET is_freezed = $2 WHERE task_id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(task_id)
        .bind(is_freezed)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(task)
    }

    /// Insert or refresh tasks from their manifests in one transaction, so a
    /// failing definition leaves the table untouched. A new task starts closed
    /// and not freezed; an existing one keeps its flags.
    ///
    /// Returns each stored task with `true` when it was newly created.
    pub async fn upsert_all(&self, definitions: &[TaskDefinition]) -> Result<Vec<(Task, bool)>> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(definitions.len());

        for definition in definitions {
            let row = upsert(&mut tx, definition).await?;
            tracing::debug!(task = %row.task.name, created = row.created, "Task upserted");
            stored.push((row.task, row.created));
        }

        tx.commit().await?;

        Ok(stored)
    }
}

#[derive(FromRow)]
struct UpsertedTask {
    #[sqlx(flatten)]
    task: Task,
    created: bool,
}

async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    definition: &TaskDefinition,
) -> Result<UpsertedTask> {
    // xmax is zero only for a row this statement inserted
    let row = sqlx::query_as::<_, UpsertedTask>(&format!(
        r#"
        INSERT INTO tasks (task_id, name, category, author, description, flag, has_attachment)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (task_id)
        DO UPDATE SET
            category = EXCLUDED.category,
            author = EXCLUDED.author,
            description = EXCLUDED.description,
            flag = EXCLUDED.flag,
            has_attachment = EXCLUDED.has_attachment
        RETURNING {TASK_COLUMNS}, (xmax = 0) AS created
        "#
    ))
    .bind(&definition.task_id)
    .bind(&definition.name)
    .bind(&definition.category)
    .bind(&definition.author)
    .bind(&definition.description)
    .bind(&definition.flag)
    .bind(definition.has_attachment)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| StorageError::from(e).on_unique_violation("Task name already in use"))?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, definition, unique_name};

    #[tokio::test]
    async fn test_upsert_reports_creation_and_keeps_flags() {
        let Some(db) = test_support::database().await else {
            return;
        };
        let repo = TaskRepository::new(db.pool());
        let mut def = definition(&unique_name("import"));

        let stored = repo.upsert_all(std::slice::from_ref(&def)).await.unwrap();
        assert!(stored[0].1);
        assert!(!stored[0].0.is_open);

        repo.set_open(&def.task_id, true).await.unwrap();
        def.author = "ptr-yudai".to_string();
        let stored = repo.upsert_all(std::slice::from_ref(&def)).await.unwrap();
        assert!(!stored[0].1);
        assert!(stored[0].0.is_open);
        assert_eq!(stored[0].0.author, "ptr-yudai");
    }

    #[tokio::test]
    async fn test_failed_definition_rolls_back_whole_batch() {
        let Some(db) = test_support::database().await else {
            return;
        };
        let repo = TaskRepository::new(db.pool());
        let first = definition(&unique_name("batch"));
        let mut clash = definition(&unique_name("batch"));
        clash.name = first.name.clone();

        let result = repo.upsert_all(&[first.clone(), clash]).await;
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
        assert!(matches!(
            repo.find_by_id(&first.task_id).await,
            Err(StorageError::NotFound)
        ));
    }
}
