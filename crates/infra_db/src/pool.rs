//! Connection pool and schema migrations
//!
//! The service holds one pool for its lifetime. Migrations live in the
//! workspace `migrations/` directory and are compiled into the binary.

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::error::DatabaseError;

const DEFAULT_URL: &str = "postgres://localhost/document_monitoring";

/// Connections are recycled after this long
const MAX_LIFETIME: Duration = Duration::from_secs(30 * 60);
/// Idle connections above `min_connections` are dropped after this long
const IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Pool settings, normally derived from `ApiConfig`
///
/// ```rust
/// use infra_db::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("postgres://localhost/document_monitoring")
///     .max_connections(20)
///     .connect_timeout(Duration::from_secs(10));
/// assert_eq!(config.min_connections, 2);
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a caller waits to acquire a connection
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// Opens the document monitoring pool
///
/// Fails with `DatabaseError::ConnectionFailed` when the first connections
/// cannot be established.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, DatabaseError> {
    info!(
        max = config.max_connections,
        min = config.min_connections,
        "Opening document monitoring pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .max_lifetime(MAX_LIFETIME)
        .idle_timeout(IDLE_TIMEOUT)
        .connect(&config.url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Document monitoring pool ready");
    Ok(pool)
}

/// Schema of the reference, configuration and request tables
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    info!("Running database migrations");
    MIGRATOR.run(pool).await?;
    info!("Database migrations complete");
    Ok(())
}
