use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{get_task, list_tasks, start_attempt, submit_flag};
use crate::middleware::auth::require_user;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/:id/start", post(start_attempt))
        .route("/:id/submit", post(submit_flag))
        .route_layer(middleware::from_fn(require_user));

    Router::new()
        .route("/", get(list_tasks))
        .route("/:id", get(get_task))
        .merge(protected)
}
