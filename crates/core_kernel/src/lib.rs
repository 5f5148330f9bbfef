//! Core Kernel - Foundational types for the document monitoring service
//!
//! This crate provides the building blocks shared by every other crate:
//! - Strongly-typed identifiers for database records
//! - Effective periods, date ranges and the clock used for versioning
//! - Port error and marker traits for the hexagonal layout

pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use temporal::{
    closing_instant, Clock, DateRange, EffectivePeriod, FixedClock, SystemClock, TemporalError,
    CLOSE_OFFSET_SECS,
};
pub use identifiers::{
    BatchId, DocumentConfigId, EntityId, ErrorDetailId, MetadataValueId, ReferenceDataId,
    RequestId,
};
pub use ports::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};
