use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use storage::{Database, repository::session::SessionRepository};
use utoipa::OpenApi;

mod config;
mod error;
mod features;
mod middleware;
mod routes;
mod state;

use config::Config;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::session::handlers::register,
        features::session::handlers::login,
        features::session::handlers::logout,
        features::session::handlers::get_session,
        features::tasks::handlers::list_tasks,
        features::tasks::handlers::get_task,
        features::tasks::handlers::start_attempt,
        features::tasks::handlers::submit_flag,
        features::admin::handlers::list_admin_tasks,
        features::admin::handlers::open_task,
        features::admin::handlers::close_task,
        features::admin::handlers::freeze_task,
        features::admin::handlers::unfreeze_task,
        features::admin::handlers::list_users,
        features::admin::handlers::set_runner,
        features::admin::handlers::unset_runner,
    ),
    components(
        schemas(
            storage::dto::user::RegisterRequest,
            storage::dto::user::LoginRequest,
            storage::dto::user::AuthResponse,
            storage::dto::user::UserResponse,
            storage::dto::session::SessionResponse,
            storage::dto::session::AttemptResponse,
            storage::dto::task::TaskSummaryResponse,
            storage::dto::task::TaskDetailResponse,
            storage::dto::task::AdminTaskResponse,
            storage::dto::task::SolveResponse,
            storage::dto::task::SubmitFlagRequest,
            storage::dto::task::SubmitFlagResponse,
        )
    ),
    tags(
        (name = "session", description = "Registration, login and the caller's attempts"),
        (name = "tasks", description = "Tasks, rankings, starting attempts and submitting flags"),
        (name = "admin", description = "Task and user administration"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("Session token")
                        .build(),
                ),
            )
        }
    }
}

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting speedrun scoreboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::with_max_connections(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    spawn_session_purge(db.clone());

    let state = AppState::new(db, config.session_ttl_hours);
    let app = routes::app(state);

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}

fn spawn_session_purge(db: Database) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match SessionRepository::new(db.pool()).purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "Purged expired sessions"),
                Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
            }
        }
    });
}
