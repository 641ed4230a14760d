use axum::extract::FromRef;
use chrono::Duration;
use storage::Database;

/// Per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionSettings,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub ttl: Duration,
}

impl AppState {
    pub fn new(db: Database, session_ttl_hours: i64) -> Self {
        Self {
            db,
            sessions: SessionSettings {
                ttl: Duration::hours(session_ttl_hours),
            },
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for SessionSettings {
    fn from_ref(state: &AppState) -> Self {
        state.sessions
    }
}
