//! Versioned records
//!
//! A versioned record is one row of an append-only timeline. Each update
//! closes the current row and inserts a replacement with a new id, so the
//! history of a logical entity is the set of rows sharing its business key.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{EffectivePeriod, EntityId, ReferenceDataId};

/// `ref_data_value` of reference data rows, keyed by id
pub type ReferenceLabels = HashMap<ReferenceDataId, String>;

/// What a keyed lookup should do when nothing matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyLookup {
    /// Treat an empty result as a missing resource
    NotFound(String),
    /// Return the empty list, logging a warning
    Empty,
}

/// Kind-specific content of a versioned record
///
/// Implemented by [`ReferenceData`](crate::ReferenceData) and
/// [`DocumentConfiguration`](crate::DocumentConfiguration). The store and its
/// adapters only ever reach the payload through this trait.
pub trait RecordPayload: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Identifier type assigned to each version
    type Id: EntityId;

    /// Equality filter over (a subset of) the business key fields
    type Filter: Clone + fmt::Debug + Default + Send + Sync + 'static;

    /// Entity name used in messages, e.g. "Reference data"
    const KIND: &'static str;

    /// Filter selecting every version that shares this payload's business key
    fn key_filter(&self) -> Self::Filter;

    /// Returns true if this payload satisfies every id and value field set on `filter`
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Like `matches`, additionally checking filter fields that name
    /// referenced reference data by its value
    fn matches_with_labels(&self, filter: &Self::Filter, _labels: &ReferenceLabels) -> bool {
        self.matches(filter)
    }

    /// Policy applied when a keyed lookup returns no rows
    fn on_empty_lookup(filter: &Self::Filter, include_historic: bool) -> EmptyLookup;
}

/// Who created and last touched a version, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_by: String,
    pub last_updated_at: DateTime<Utc>,
}

impl AuditStamp {
    /// Stamp for a row written by `actor` at `at`
    pub fn new(actor: impl Into<String>, at: DateTime<Utc>) -> Self {
        let actor = actor.into();
        Self {
            created_by: actor.clone(),
            created_at: at,
            last_updated_by: actor,
            last_updated_at: at,
        }
    }

    /// Records a later modification
    pub fn touch(&mut self, actor: impl Into<String>, at: DateTime<Utc>) {
        self.last_updated_by = actor.into();
        self.last_updated_at = at;
    }
}

/// One stored version of a record
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedRecord<P: RecordPayload> {
    pub id: P::Id,
    pub payload: P,
    pub period: EffectivePeriod,
    pub audit: AuditStamp,
}

impl<P: RecordPayload> VersionedRecord<P> {
    /// Returns true if this version is in effect at `at`
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.period.contains(at)
    }

    /// Returns true if this version shares `other`'s business key
    pub fn same_key_as(&self, other: &P) -> bool {
        self.payload.matches(&other.key_filter())
    }
}

/// A version about to be written; the adapter assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewVersion<P: RecordPayload> {
    pub payload: P,
    pub period: EffectivePeriod,
    pub audit: AuditStamp,
}

impl<P: RecordPayload> NewVersion<P> {
    /// An open-ended version effective from `at`
    pub fn effective_from(payload: P, actor: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            payload,
            period: EffectivePeriod::open_from(at),
            audit: AuditStamp::new(actor, at),
        }
    }
}

/// Outcome of closing a version and inserting its replacement
#[derive(Debug, Clone, PartialEq)]
pub struct Supersession<P: RecordPayload> {
    /// Versions of the target's business key that were active and got closed.
    /// Empty when the key had no active version.
    pub closed: Vec<VersionedRecord<P>>,
    /// The replacement as written
    pub inserted: VersionedRecord<P>,
    /// Versions active for the replacement's business key, read back after the write
    pub active: Vec<VersionedRecord<P>>,
}

impl<P: RecordPayload> Supersession<P> {
    /// The inserted version, if the read-back still sees it as active
    pub fn active_replacement(&self) -> Option<&VersionedRecord<P>> {
        self.active.iter().find(|r| r.id == self.inserted.id)
    }
}
