use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    close_task, freeze_task, list_admin_tasks, list_users, open_task, set_runner, unfreeze_task,
    unset_runner,
};
use crate::middleware::auth::require_admin;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_admin_tasks))
        .route("/tasks/:id/open", post(open_task))
        .route("/tasks/:id/close", post(close_task))
        .route("/tasks/:id/freeze", post(freeze_task))
        .route("/tasks/:id/unfreeze", post(unfreeze_task))
        .route("/users", get(list_users))
        .route("/users/:id/runner", post(set_runner))
        .route("/users/:id/not-runner", post(unset_runner))
        .route_layer(middleware::from_fn(require_admin))
}
