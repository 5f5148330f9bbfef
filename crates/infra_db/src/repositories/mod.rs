//! Repository implementations for the monitoring schema
//!
//! Repositories encapsulate SQL and map between database rows and domain
//! types. Each one implements a domain port directly:
//!
//! - [`ReferenceDataRepository`] and [`DocumentConfigRepository`]: the
//!   `VersionStore` port over effective-dated tables
//! - [`DocumentRequestRepository`]: the `DocumentRequestPort` read side

pub mod versioned;
pub mod reference_data;
pub mod document_config;
pub mod document_request;

pub use versioned::{PgVersionStore, VersionedTable};
pub use reference_data::{ReferenceDataRepository, ReferenceDataRow};
pub use document_config::{DocumentConfigRepository, DocumentConfigRow};
pub use document_request::{DocumentRequestRepository, DocumentRequestRow};
