//! Filter expression tree
//!
//! A [`RequestFilter`] is the AND of its clauses; no clauses matches every
//! request. Adapters render it to SQL (`infra_db::criteria`) or evaluate it
//! in memory with [`RequestFilter::matches`].

use core_kernel::{BatchId, DateRange, ReferenceDataId, RequestId};

use crate::criteria::MetadataChip;
use crate::request::{Batch, DocumentRequest, MetadataValue};

/// Column of the request row tested by a membership clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipField {
    SourceSystem,
    DocumentType,
    DocumentName,
    Status,
    RequestId,
}

impl MembershipField {
    /// The field's raw value on a request
    pub fn value_of(&self, request: &DocumentRequest) -> i64 {
        match self {
            MembershipField::SourceSystem => request.source_system_id.value(),
            MembershipField::DocumentType => request.document_type_id.value(),
            MembershipField::DocumentName => request.document_name_id.value(),
            MembershipField::Status => request.status_id.value(),
            MembershipField::RequestId => request.id.value(),
        }
    }
}

/// One AND-ed predicate over a document request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    /// The field's value is one of `ids`
    Membership { field: MembershipField, ids: Vec<i64> },
    /// `created_at` lies within the inclusive range
    CreatedWithin(DateRange),
    /// At least one batch of the request has one of `batch_ids`
    BatchExists { batch_ids: Vec<BatchId> },
    /// At least one metadata row of the request equals the chip
    MetadataExists(MetadataChip),
}

impl FilterClause {
    /// Evaluates the clause against a request and its related rows
    pub fn matches(
        &self,
        request: &DocumentRequest,
        batches: &[Batch],
        metadata: &[MetadataValue],
    ) -> bool {
        match self {
            FilterClause::Membership { field, ids } => ids.contains(&field.value_of(request)),
            FilterClause::CreatedWithin(range) => range.contains(request.created_at),
            FilterClause::BatchExists { batch_ids } => batches
                .iter()
                .any(|b| b.request_id == request.id && batch_ids.contains(&b.id)),
            FilterClause::MetadataExists(chip) => metadata.iter().any(|m| {
                m.request_id == request.id && m.key_id == chip.key_id && m.value == chip.value
            }),
        }
    }
}

/// Conjunction of filter clauses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    clauses: Vec<FilterClause>,
}

impl RequestFilter {
    /// A filter matching every request
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a clause
    pub fn and(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Adds a membership clause unless `ids` is empty
    pub fn and_member_of(self, field: MembershipField, ids: impl IntoIterator<Item = i64>) -> Self {
        let ids: Vec<i64> = ids.into_iter().collect();
        if ids.is_empty() {
            self
        } else {
            self.and(FilterClause::Membership { field, ids })
        }
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluates every clause against a request and its related rows
    pub fn matches(
        &self,
        request: &DocumentRequest,
        batches: &[Batch],
        metadata: &[MetadataValue],
    ) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.matches(request, batches, metadata))
    }
}

/// Raw values of typed reference data ids
pub(crate) fn raw_ids(ids: &[ReferenceDataId]) -> impl Iterator<Item = i64> + '_ {
    ids.iter().map(|id| id.value())
}

/// Raw values of typed request ids
pub(crate) fn raw_request_ids(ids: &[RequestId]) -> impl Iterator<Item = i64> + '_ {
    ids.iter().map(|id| id.value())
}
