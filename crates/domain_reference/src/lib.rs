//! Versioned Reference Domain
//!
//! Reference data and document configuration are effective-dated: every
//! change produces a new row and the previous row is closed, so the full
//! history of a logical record stays queryable.
//!
//! # Version Timeline
//!
//! ```text
//!   id=1  WEB   [2024-01-01 09:00:00, 2024-01-01 10:59:59)
//!   id=2  WEB2  [2024-01-01 11:00:00, ∞)
//! ```
//!
//! An update at 11:00 closed id 1 one second earlier and inserted id 2.
//! A listing "as of now" only returns id 2; a historic listing returns both.

pub mod record;
pub mod reference_data;
pub mod document_config;
pub mod ports;
pub mod store;
pub mod error;

pub use record::{
    AuditStamp, EmptyLookup, NewVersion, RecordPayload, ReferenceLabels, Supersession,
    VersionedRecord,
};
pub use reference_data::{ReferenceData, ReferenceDataFilter, ReferenceDataRecord};
pub use document_config::{DocumentConfigFilter, DocumentConfigRecord, DocumentConfiguration};
pub use ports::VersionStore;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockVersionStore;
pub use store::TemporalRecordStore;
pub use error::RecordError;
