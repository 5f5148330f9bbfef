//! API configuration

use std::time::Duration;

use serde::Deserialize;

use domain_requests::SearchLimits;
use infra_db::DatabaseConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Minimum pooled database connections
    pub db_min_connections: u32,
    /// Seconds to wait for a pooled connection
    pub db_connect_timeout_secs: u64,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Largest page a search may request
    pub max_page_size: u32,
    /// Longest requestIds/batchIds list a search may carry
    pub max_id_list_size: usize,
    /// Page size used when a search omits `size`
    pub default_page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let limits = SearchLimits::default();
        let database = DatabaseConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: database.url,
            db_max_connections: database.max_connections,
            db_min_connections: database.min_connections,
            db_connect_timeout_secs: database.connect_timeout.as_secs(),
            log_level: "info".to_string(),
            log_json: false,
            max_page_size: limits.max_page_size,
            max_id_list_size: limits.max_id_list_size,
            default_page_size: limits.default_page_size,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Search limits handed to the criteria query builder
    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_page_size: self.max_page_size,
            max_id_list_size: self.max_id_list_size,
            default_page_size: self.default_page_size,
            ..SearchLimits::default()
        }
    }

    /// Pool settings for the database layer
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
            .connect_timeout(Duration::from_secs(self.db_connect_timeout_secs))
    }
}
