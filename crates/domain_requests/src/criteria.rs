//! Search criteria as received from callers
//!
//! Nothing here is validated. [`CriteriaQueryBuilder`](crate::CriteriaQueryBuilder)
//! checks limits and sort specs and turns the criteria into a query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, ReferenceDataId, RequestId};

/// One metadata criterion: the request must carry `value` under `key_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataChip {
    pub key_id: ReferenceDataId,
    pub value: String,
}

impl MetadataChip {
    pub fn new(key_id: ReferenceDataId, value: impl Into<String>) -> Self {
        Self {
            key_id,
            value: value.into(),
        }
    }
}

/// A requested sort, exactly as the caller spelled it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub property: Option<String>,
    pub direction: Option<String>,
}

impl SortSpec {
    pub fn new(property: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            property: Some(property.into()),
            direction: Some(direction.into()),
        }
    }
}

/// Document request search criteria
///
/// Empty lists mean "no filter" rather than "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub source_systems: Vec<ReferenceDataId>,
    pub document_types: Vec<ReferenceDataId>,
    pub document_names: Vec<ReferenceDataId>,
    pub statuses: Vec<ReferenceDataId>,
    pub request_ids: Vec<RequestId>,
    pub batch_ids: Vec<BatchId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub metadata_chips: Vec<MetadataChip>,
    pub sorts: Vec<SortSpec>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = ReferenceDataId>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_request_ids(mut self, ids: impl IntoIterator<Item = RequestId>) -> Self {
        self.request_ids = ids.into_iter().collect();
        self
    }

    pub fn with_batch_ids(mut self, ids: impl IntoIterator<Item = BatchId>) -> Self {
        self.batch_ids = ids.into_iter().collect();
        self
    }

    pub fn created_between(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_chip(mut self, chip: MetadataChip) -> Self {
        self.metadata_chips.push(chip);
        self
    }

    pub fn sorted_by(mut self, spec: SortSpec) -> Self {
        self.sorts.push(spec);
        self
    }
}
