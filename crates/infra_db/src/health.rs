//! Database health check
//!
//! Shared by every repository built on the same pool; the readiness probe
//! reports through it.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::warn;

use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};

/// Checks connectivity of a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgHealthCheck {
    adapter_id: String,
    pool: PgPool,
}

impl PgHealthCheck {
    pub fn new(pool: PgPool) -> Self {
        Self {
            adapter_id: "postgres".to_string(),
            pool,
        }
    }

    /// Overrides the adapter id reported in results
    pub fn with_adapter_id(mut self, adapter_id: impl Into<String>) -> Self {
        self.adapter_id = adapter_id.into();
        self
    }
}

/// Runs `SELECT 1` against `pool` and reports the outcome
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => {
            warn!(adapter_id, error = %e, "Database health check failed");
            HealthCheckResult {
                adapter_id: adapter_id.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            }
        }
    }
}

#[async_trait]
impl HealthCheckable for PgHealthCheck {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, &self.adapter_id).await
    }
}
