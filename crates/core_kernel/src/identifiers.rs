//! Strongly-typed identifiers for domain entities
//!
//! Every record kind in the monitoring schema is keyed by a database-assigned
//! `BIGINT`. Newtype wrappers keep a reference-data id from being passed where
//! a document request id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::num::ParseIntError;
use std::str::FromStr;

/// Common behaviour of all database-assigned identifiers
///
/// Generic components (the temporal record store, the mock adapters) use this
/// to move between typed ids and the raw column value.
pub trait EntityId:
    Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Wraps a raw column value
    fn from_raw(raw: i64) -> Self;

    /// Returns the raw column value
    fn raw(&self) -> i64;
}

macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw database value
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the underlying database value
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Human readable name of the identified entity
            pub fn label() -> &'static str {
                $label
            }
        }

        impl EntityId for $name {
            fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            fn raw(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Versioned records
define_id!(ReferenceDataId, "Reference data");
define_id!(DocumentConfigId, "Document configuration");

// Document request aggregate
define_id!(RequestId, "Document request");
define_id!(MetadataValueId, "Metadata value");
define_id!(BatchId, "Batch");
define_id!(ErrorDetailId, "Error detail");
