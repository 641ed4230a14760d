pub mod admin;
pub mod session;
pub mod tasks;

use axum::{Router, middleware};

use crate::middleware::auth::resolve_session;
use crate::state::AppState;

/// Every API route, with the caller's session resolved up front.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(session::routes::routes())
        .nest("/tasks", tasks::routes::routes())
        .nest("/admin", admin::routes::routes())
        .layer(middleware::from_fn_with_state(state, resolve_session))
}
