use anyhow::{Context, Result, ensure};

/// One year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let session_ttl_hours: i64 = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => raw
                .parse()
                .context("SESSION_TTL_HOURS must be a number")?,
            None => 24,
        };
        ensure!(
            (1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours),
            "SESSION_TTL_HOURS must be between 1 and {}",
            MAX_SESSION_TTL_HOURS
        );

        Ok(Self {
            host: lookup("HOST").context("Cannot load HOST env variable")?,
            port: lookup("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: lookup("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            database_max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a number")?,
                None => 10,
            },
            session_ttl_hours,
        })
    }
}
