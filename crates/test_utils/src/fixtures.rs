//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities of the document
//! monitoring service. These fixtures are consistent and predictable for
//! unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{
    BatchId, EffectivePeriod, ErrorDetailId, MetadataValueId, ReferenceDataId, RequestId,
};
use domain_reference::{AuditStamp, DocumentConfiguration, ReferenceData, VersionedRecord};
use domain_requests::{Batch, ErrorDetail, MetadataValue, StatusRef, StoredContent};

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Instant every fixture version becomes effective (Jan 1, 2024 09:00)
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    /// One hour after the epoch, when fixture updates happen
    pub fn later() -> DateTime<Utc> {
        Self::epoch() + Duration::hours(1)
    }

    /// Timestamp before any fixture version exists
    pub fn before_epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap()
    }

    /// Creation instant of the `n`th fixture request, one day apart
    pub fn request_day(n: i64) -> DateTime<Utc> {
        Self::epoch() + Duration::days(n)
    }

    /// Open-ended period from the epoch
    pub fn open_period() -> EffectivePeriod {
        EffectivePeriod::open_from(Self::epoch())
    }
}

/// Reference data rows used as lookup keys
pub struct ReferenceDataFixtures;

impl ReferenceDataFixtures {
    pub const SOURCE_SYSTEM: &'static str = "SOURCE_SYSTEM";
    pub const DOCUMENT_TYPE: &'static str = "DOCUMENT_TYPE";
    pub const DOCUMENT_NAME: &'static str = "DOCUMENT_NAME";
    pub const DOCUMENT_STATUS: &'static str = "DOCUMENT_STATUS";
    pub const METADATA_KEY: &'static str = "METADATA_KEY";

    pub fn web_source() -> ReferenceData {
        ReferenceData::new(Self::SOURCE_SYSTEM, "WEB").with_description("Web portal")
    }

    pub fn batch_source() -> ReferenceData {
        ReferenceData::new(Self::SOURCE_SYSTEM, "BATCH")
    }

    pub fn invoice_type() -> ReferenceData {
        ReferenceData::new(Self::DOCUMENT_TYPE, "INVOICE")
    }

    pub fn welcome_letter() -> ReferenceData {
        ReferenceData::new(Self::DOCUMENT_NAME, "WELCOME_LETTER")
    }

    pub fn completed_status() -> ReferenceData {
        ReferenceData::new(Self::DOCUMENT_STATUS, "COMPLETED").read_only()
    }

    pub fn failed_status() -> ReferenceData {
        ReferenceData::new(Self::DOCUMENT_STATUS, "FAILED")
            .with_description("Processing failed")
            .read_only()
    }

    pub fn policy_number_key() -> ReferenceData {
        ReferenceData::new(Self::METADATA_KEY, "POLICY_NUMBER")
    }

    /// A stored, active version of `payload` with the given id
    pub fn stored(id: i64, payload: ReferenceData) -> VersionedRecord<ReferenceData> {
        VersionedRecord {
            id: ReferenceDataId::new(id),
            payload,
            period: TemporalFixtures::open_period(),
            audit: AuditStamp::new("fixture", TemporalFixtures::epoch()),
        }
    }
}

/// Document configuration payloads
pub struct DocumentConfigFixtures;

impl DocumentConfigFixtures {
    /// Footer text keyed by three reference data ids
    pub fn footer(footer: i64, app_doc_spec: i64, code: i64) -> DocumentConfiguration {
        DocumentConfiguration {
            footer_id: ReferenceDataId::new(footer),
            app_doc_spec_id: ReferenceDataId::new(app_doc_spec),
            code_id: ReferenceDataId::new(code),
            value: "Registered office: 1 Main Street".to_string(),
            description: Some("Standard footer".to_string()),
        }
    }
}

/// Children of document requests
pub struct RequestFixtures;

impl RequestFixtures {
    pub fn status(id: i64, name: &str) -> StatusRef {
        StatusRef {
            id: ReferenceDataId::new(id),
            name: name.to_string(),
            description: None,
        }
    }

    pub fn metadata(id: i64, request: i64, key: i64, value: &str) -> MetadataValue {
        MetadataValue {
            id: MetadataValueId::new(id),
            request_id: RequestId::new(request),
            key_id: ReferenceDataId::new(key),
            value: value.to_string(),
        }
    }

    pub fn batch(id: i64, request: i64, status: i64, day: i64) -> Batch {
        Batch {
            id: BatchId::new(id),
            request_id: RequestId::new(request),
            external_batch_id: Some(format!("EXT-{id}")),
            status_id: ReferenceDataId::new(status),
            created_at: TemporalFixtures::request_day(day),
        }
    }

    pub fn error(id: i64, batch: i64, code: &str, message: &str) -> ErrorDetail {
        ErrorDetail {
            id: ErrorDetailId::new(id),
            batch_id: BatchId::new(batch),
            error_code: Some(code.to_string()),
            error_message: message.to_string(),
            created_at: TemporalFixtures::epoch(),
        }
    }

    /// Content with only the JSON side stored
    pub fn json_only(policy_number: &str) -> StoredContent {
        StoredContent {
            json: Some(serde_json::json!({ "policyNumber": policy_number }).to_string()),
            xml: None,
        }
    }

    /// Content with both sides stored
    pub fn both(policy_number: &str) -> StoredContent {
        StoredContent {
            json: Some(serde_json::json!({ "policyNumber": policy_number }).to_string()),
            xml: Some(format!("<request><policyNumber>{policy_number}</policyNumber></request>")),
        }
    }
}
