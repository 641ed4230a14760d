//! Fixtures for repository tests. They run only when `DATABASE_URL` points at
//! a disposable Postgres database; otherwise each test returns early.

use uuid::Uuid;

use crate::Database;
use crate::models::{Task, User, derive_task_id};
use crate::repository::{
    task::{TaskDefinition, TaskRepository},
    user::UserRepository,
};

pub const FLAG: &str = "RTACON{race}";

pub async fn database() -> Option<Database> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let db = Database::with_max_connections(&url, 16)
        .await
        .expect("DATABASE_URL is set but the database is unreachable");
    db.run_migrations().await.expect("migrations failed");
    Some(db)
}

pub fn definition(name: &str) -> TaskDefinition {
    TaskDefinition {
        task_id: derive_task_id(name),
        name: name.to_string(),
        category: "misc".to_string(),
        author: "xrekkusu".to_string(),
        description: None,
        flag: FLAG.to_string(),
        has_attachment: false,
    }
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

pub async fn user(db: &Database) -> User {
    UserRepository::new(db.pool())
        .create(&unique_name("runner"), "$argon2i$unused")
        .await
        .unwrap()
}

pub async fn task(db: &Database, is_open: bool, is_freezed: bool) -> Task {
    let repo = TaskRepository::new(db.pool());
    let name = unique_name("task");
    repo.upsert_all(&[definition(&name)]).await.unwrap();

    let task_id = derive_task_id(&name);
    repo.set_open(&task_id, is_open).await.unwrap();
    repo.set_freezed(&task_id, is_freezed).await.unwrap()
}
