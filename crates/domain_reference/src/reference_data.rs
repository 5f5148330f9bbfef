//! Reference data
//!
//! Typed lookup values (source systems, document types, statuses, footers...)
//! referenced by id from document requests and document configurations.

use serde::{Deserialize, Serialize};

use core_kernel::ReferenceDataId;

use crate::record::{EmptyLookup, RecordPayload, VersionedRecord};

/// A stored reference data version
pub type ReferenceDataRecord = VersionedRecord<ReferenceData>;

/// Content of a reference data version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub ref_data_type: String,
    pub ref_data_value: String,
    pub description: Option<String>,
    pub editable: bool,
}

impl ReferenceData {
    pub fn new(ref_data_type: impl Into<String>, ref_data_value: impl Into<String>) -> Self {
        Self {
            ref_data_type: ref_data_type.into(),
            ref_data_value: ref_data_value.into(),
            description: None,
            editable: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }
}

/// Equality filter over the (type, value) business key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDataFilter {
    pub ref_data_type: Option<String>,
    pub ref_data_value: Option<String>,
}

impl ReferenceDataFilter {
    /// Every value of one type
    pub fn by_type(ref_data_type: impl Into<String>) -> Self {
        Self {
            ref_data_type: Some(ref_data_type.into()),
            ref_data_value: None,
        }
    }
}

impl RecordPayload for ReferenceData {
    type Id = ReferenceDataId;
    type Filter = ReferenceDataFilter;

    const KIND: &'static str = "Reference data";

    fn key_filter(&self) -> Self::Filter {
        ReferenceDataFilter {
            ref_data_type: Some(self.ref_data_type.clone()),
            ref_data_value: Some(self.ref_data_value.clone()),
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter
            .ref_data_type
            .as_ref()
            .map_or(true, |t| *t == self.ref_data_type)
            && filter
                .ref_data_value
                .as_ref()
                .map_or(true, |v| *v == self.ref_data_value)
    }

    fn on_empty_lookup(filter: &Self::Filter, include_historic: bool) -> EmptyLookup {
        let prefix = if include_historic { "No" } else { "No active" };
        let ref_data_type = filter.ref_data_type.as_deref().unwrap_or_default();
        EmptyLookup::NotFound(format!(
            "{prefix} reference data found for type: {ref_data_type}"
        ))
    }
}
