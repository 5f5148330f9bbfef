//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for the document monitoring service, built on SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: each repository implements a
//! domain port so services never see SQL.
//!
//! # Effective-Dated Tables
//!
//! `reference_data` and `document_config` keep every version of a record.
//! A row is active at `t` when `effective_from <= t < effective_to`, with a
//! NULL `effective_to` meaning open-ended. Updates close the current row and
//! insert its replacement in one transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, ReferenceDataRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/document_monitoring")).await?;
//! run_migrations(&pool).await?;
//! let repo = ReferenceDataRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod temporal;
pub mod criteria;
pub mod health;
pub mod repositories;

pub use pool::{create_pool, run_migrations, DatabaseConfig, MIGRATOR};
pub use error::DatabaseError;
pub use health::PgHealthCheck;
pub use repositories::{
    DocumentConfigRepository, DocumentRequestRepository, PgVersionStore, ReferenceDataRepository,
    VersionedTable,
};
