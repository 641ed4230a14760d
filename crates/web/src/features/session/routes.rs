use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{get_session, login, logout, register};
use crate::middleware::auth::require_user;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn(require_user));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/info", get(get_session))
        .merge(protected)
}
