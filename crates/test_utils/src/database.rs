//! Database Test Utilities
//!
//! Provides helpers for database testing including testcontainer management
//! and connection pooling for integration tests.

use once_cell::sync::Lazy;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio::sync::OnceCell;

use core_kernel::{ReferenceDataId, RequestId};
use domain_reference::ReferenceData;
use domain_requests::{Batch, DocumentRequest, ErrorDetail, MetadataValue, StoredContent};

use crate::fixtures::TemporalFixtures;

/// Default PostgreSQL image for testing
const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";

/// Image tag, overridable with `TEST_POSTGRES_TAG`
static IMAGE_TAG: Lazy<String> =
    Lazy::new(|| std::env::var("TEST_POSTGRES_TAG").unwrap_or_else(|_| POSTGRES_TAG.to_string()));
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "document_monitoring_test";

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A wrapper around a PostgreSQL test container
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a new PostgreSQL container for testing
    ///
    /// # Returns
    ///
    /// A new TestDatabase instance with an initialized schema
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or schema fails to initialize
    pub async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        // Create and start the container
        let container = GenericImage::new(POSTGRES_IMAGE, IMAGE_TAG.as_str())
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        // Get the mapped port
        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();

        let config = TestDatabaseConfig {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host,
            port,
        };

        // Create connection pool
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;

        let test_db = Self {
            _container: container,
            config,
            pool,
        };

        // Initialize schema
        test_db.init_schema().await?;

        Ok(test_db)
    }

    /// Initializes the database schema by applying the service migrations
    async fn init_schema(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        infra_db::run_migrations(&self.pool).await?;
        Ok(())
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Clears all data from the database while preserving the schema
    ///
    /// Useful for resetting state between tests
    pub async fn clear_data(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Children first; RESTART IDENTITY keeps generated ids predictable
        let tables = [
            "error_detail",
            "th_batch",
            "request_metadata_value",
            "document_request_blob",
            "document_request",
            "document_config",
            "reference_data",
        ];

        for table in tables {
            sqlx::query(&format!("TRUNCATE TABLE {table} RESTART IDENTITY CASCADE"))
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }
}

/// Raw inserts for rows the service only reads
///
/// Requests, batches, metadata, content and error details are written by
/// upstream systems, so no repository exposes inserts for them.
impl TestDatabase {
    /// Inserts an active reference data row and returns its generated id
    pub async fn seed_reference_data(&self, payload: &ReferenceData) -> Result<ReferenceDataId, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO reference_data
                (ref_data_type, ref_data_value, description, editable, effective_from,
                 created_by, last_updated_by)
            VALUES ($1, $2, $3, $4, $5, 'seed', 'seed')
            RETURNING id
            "#,
        )
        .bind(&payload.ref_data_type)
        .bind(&payload.ref_data_value)
        .bind(&payload.description)
        .bind(payload.editable)
        .bind(TemporalFixtures::epoch())
        .fetch_one(&self.pool)
        .await?;
        Ok(ReferenceDataId::new(id))
    }

    /// Inserts a request keeping its id
    pub async fn seed_request(&self, request: &DocumentRequest) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO document_request
                (id, source_system_id, document_type_id, document_name_id, status_id,
                 created_by, created_at, last_updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(request.id.value())
        .bind(request.source_system_id.value())
        .bind(request.document_type_id.value())
        .bind(request.document_name_id.value())
        .bind(request.status_id.value())
        .bind(&request.created_by)
        .bind(request.created_at)
        .bind(request.last_updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn seed_metadata(&self, value: &MetadataValue) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO request_metadata_value (id, request_id, key_id, metadata_value) VALUES ($1, $2, $3, $4)",
        )
        .bind(value.id.value())
        .bind(value.request_id.value())
        .bind(value.key_id.value())
        .bind(&value.value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn seed_content(&self, request: RequestId, content: &StoredContent) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO document_request_blob (request_id, json_request, xml_request) VALUES ($1, $2, $3)",
        )
        .bind(request.value())
        .bind(&content.json)
        .bind(&content.xml)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn seed_batch(&self, batch: &Batch) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO th_batch (id, request_id, external_batch_id, status_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(batch.id.value())
        .bind(batch.request_id.value())
        .bind(&batch.external_batch_id)
        .bind(batch.status_id.value())
        .bind(batch.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn seed_error(&self, error: &ErrorDetail) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO error_detail (id, batch_id, error_code, error_message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(error.id.value())
        .bind(error.batch_id.value())
        .bind(&error.error_code)
        .bind(&error.error_message)
        .bind(error.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Global test database for shared integration tests
static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// Gets or creates a shared test database instance
///
/// This function provides a singleton test database that can be shared
/// across multiple tests to reduce container startup overhead.
///
/// # Returns
///
/// An Arc to the shared TestDatabase instance
///
/// # Panics
///
/// Panics if the database fails to initialize
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}

/// Creates an isolated test database for a single test
///
/// Use this when tests need to modify data and isolation is required
pub async fn create_isolated_test_database() -> Result<TestDatabase, Box<dyn std::error::Error + Send + Sync>> {
    TestDatabase::new().await
}

/// Helper macro for running database tests
#[macro_export]
macro_rules! db_test {
    ($name:ident, $body:expr) => {
        #[tokio::test]
        async fn $name() {
            let db = $crate::database::create_isolated_test_database()
                .await
                .expect("Failed to create test database");
            let pool = db.pool();
            $body
        }
    };
}

/// Helper trait for test assertions on database results
pub trait DatabaseTestAssertions {
    /// Asserts that a specific number of rows were affected
    fn assert_rows_affected(&self, expected: u64);
}

impl DatabaseTestAssertions for sqlx::postgres::PgQueryResult {
    fn assert_rows_affected(&self, expected: u64) {
        assert_eq!(
            self.rows_affected(),
            expected,
            "Expected {} rows affected, got {}",
            expected,
            self.rows_affected()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let config = TestDatabaseConfig::default();
        let url = config.connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.contains(POSTGRES_DB));
    }
}
