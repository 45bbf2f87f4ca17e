use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Database not ready after {0:?}")]
    NotReady(Duration),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owns the bounded connection pool shared by all request handlers.
///
/// Built once at startup and handed to the store; nothing reaches the pool
/// through a global.
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Build the pool without opening a connection yet.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let raw = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let url = Self::normalize_url(raw)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_wait_secs.max(1)))
            .max_lifetime(Duration::from_secs(30 * 60))
            .connect_lazy(&url)?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Poll the store until it answers or `timeout` elapses.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<(), DatabaseError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.health_check().await {
                Ok(()) => return Ok(()),
                Err(e) => debug!("Database not ready yet: {}", e),
            }
            if Instant::now() + READY_POLL_INTERVAL > deadline {
                return Err(DatabaseError::NotReady(timeout));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    /// Accept SQLAlchemy-style `postgresql+psycopg://` URLs and default to
    /// `sslmode=disable` when the URL does not choose one.
    fn normalize_url(raw: &str) -> Result<String, DatabaseError> {
        let raw = raw.trim();
        let rewritten = match raw.strip_prefix("postgresql+psycopg://") {
            Some(rest) => format!("postgres://{}", rest),
            None => raw.to_string(),
        };

        let mut url = url::Url::parse(&rewritten).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        if !url.query_pairs().any(|(k, _)| k == "sslmode") {
            url.query_pairs_mut().append_pair("sslmode", "disable");
        }
        Ok(url.into())
    }
}
