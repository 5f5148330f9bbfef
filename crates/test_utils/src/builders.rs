//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults (or fake values) for everything else.

use chrono::{DateTime, Duration, Utc};
use core_kernel::{EffectivePeriod, ReferenceDataId, RequestId};
use domain_reference::{AuditStamp, ReferenceData, VersionedRecord};
use domain_requests::DocumentRequest;
use fake::faker::internet::en::Username;
use fake::faker::lorem::en::Word;
use fake::Fake;

use crate::fixtures::TemporalFixtures;

/// Builder for document requests
pub struct DocumentRequestBuilder {
    id: RequestId,
    source_system_id: ReferenceDataId,
    document_type_id: ReferenceDataId,
    document_name_id: ReferenceDataId,
    status_id: ReferenceDataId,
    created_at: DateTime<Utc>,
    last_updated_at: Option<DateTime<Utc>>,
    created_by: String,
}

impl DocumentRequestBuilder {
    /// Creates a builder for request `id` with fake ownership
    pub fn new(id: i64) -> Self {
        Self {
            id: RequestId::new(id),
            source_system_id: ReferenceDataId::new(1),
            document_type_id: ReferenceDataId::new(2),
            document_name_id: ReferenceDataId::new(3),
            status_id: ReferenceDataId::new(4),
            created_at: TemporalFixtures::request_day(id),
            last_updated_at: None,
            created_by: Username().fake(),
        }
    }

    pub fn source_system(mut self, id: i64) -> Self {
        self.source_system_id = ReferenceDataId::new(id);
        self
    }

    pub fn document_type(mut self, id: i64) -> Self {
        self.document_type_id = ReferenceDataId::new(id);
        self
    }

    pub fn document_name(mut self, id: i64) -> Self {
        self.document_name_id = ReferenceDataId::new(id);
        self
    }

    pub fn status(mut self, id: i64) -> Self {
        self.status_id = ReferenceDataId::new(id);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn last_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated_at = Some(at);
        self
    }

    pub fn created_by(mut self, user: impl Into<String>) -> Self {
        self.created_by = user.into();
        self
    }

    /// Builds the request; `last_updated_at` defaults to 30 minutes after creation
    pub fn build(self) -> DocumentRequest {
        DocumentRequest {
            id: self.id,
            source_system_id: self.source_system_id,
            document_type_id: self.document_type_id,
            document_name_id: self.document_name_id,
            status_id: self.status_id,
            created_at: self.created_at,
            last_updated_at: self
                .last_updated_at
                .unwrap_or(self.created_at + Duration::minutes(30)),
            created_by: self.created_by,
        }
    }
}

/// Builder for stored reference data versions
pub struct ReferenceDataRecordBuilder {
    id: i64,
    payload: ReferenceData,
    period: EffectivePeriod,
    actor: String,
}

impl ReferenceDataRecordBuilder {
    /// Version `id` of a fake value of `ref_data_type`, open from the epoch
    pub fn new(id: i64, ref_data_type: &str) -> Self {
        let value: String = Word().fake();
        Self {
            id,
            payload: ReferenceData::new(ref_data_type, value.to_uppercase()),
            period: TemporalFixtures::open_period(),
            actor: Username().fake(),
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.payload.ref_data_value = value.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.payload.description = Some(description.into());
        self
    }

    pub fn effective_from(mut self, from: DateTime<Utc>) -> Self {
        self.period.from = from;
        self
    }

    /// Ends the version at `to` (exclusive)
    pub fn closed_at(mut self, to: DateTime<Utc>) -> Self {
        self.period.to = Some(to);
        self
    }

    pub fn build(self) -> VersionedRecord<ReferenceData> {
        VersionedRecord {
            id: ReferenceDataId::new(self.id),
            payload: self.payload,
            audit: AuditStamp::new(self.actor, self.period.from),
            period: self.period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_defaults() {
        let request = DocumentRequestBuilder::new(3).status(9).build();

        assert_eq!(request.id, RequestId::new(3));
        assert_eq!(request.status_id, ReferenceDataId::new(9));
        assert_eq!(request.created_at, TemporalFixtures::request_day(3));
        assert!(request.last_updated_at > request.created_at);
        assert!(!request.created_by.is_empty());
    }

    #[test]
    fn test_closed_record_is_inactive_after_close() {
        let close = TemporalFixtures::later();
        let record = ReferenceDataRecordBuilder::new(1, "SOURCE_SYSTEM")
            .value("WEB")
            .closed_at(close)
            .build();

        assert!(record.is_active_at(close - Duration::seconds(1)));
        assert!(!record.is_active_at(close));
        assert_eq!(record.payload.ref_data_value, "WEB");
    }
}
