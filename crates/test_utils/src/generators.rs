//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{BatchId, EffectivePeriod, ReferenceDataId, RequestId};
use domain_reference::ReferenceData;
use domain_requests::{DocumentRequest, MetadataChip, SearchCriteria, SortSpec};
use proptest::prelude::*;

/// Strategy for instants within 2024, at whole seconds
pub fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0i64..366 * 24 * 3600).prop_map(move |secs| start + Duration::seconds(secs))
}

/// Strategy for effective periods, open-ended about a third of the time
pub fn effective_period_strategy() -> impl Strategy<Value = EffectivePeriod> {
    (instant_strategy(), prop::option::weighted(0.66, 1i64..90 * 24 * 3600)).prop_map(
        |(from, length)| EffectivePeriod::new(from, length.map(|secs| from + Duration::seconds(secs))),
    )
}

/// Strategy for reference data ids in a small range, so filters collide
pub fn reference_id_strategy() -> impl Strategy<Value = ReferenceDataId> {
    (1i64..8).prop_map(ReferenceDataId::new)
}

/// Strategy for reference data payloads with upper-case codes
pub fn reference_data_strategy() -> impl Strategy<Value = ReferenceData> {
    (
        prop_oneof![Just("SOURCE_SYSTEM"), Just("DOCUMENT_TYPE"), Just("DOCUMENT_STATUS")],
        "[A-Z][A-Z0-9_]{0,15}",
        prop::option::of("[a-z ]{1,40}"),
        any::<bool>(),
    )
        .prop_map(|(ref_data_type, value, description, editable)| ReferenceData {
            ref_data_type: ref_data_type.to_string(),
            ref_data_value: value,
            description,
            editable,
        })
}

/// Strategy for document requests with ids in `1..max_id`
pub fn document_request_strategy(max_id: i64) -> impl Strategy<Value = DocumentRequest> {
    (
        1i64..max_id,
        reference_id_strategy(),
        reference_id_strategy(),
        reference_id_strategy(),
        reference_id_strategy(),
        instant_strategy(),
        0i64..72 * 3600,
    )
        .prop_map(|(id, source, doc_type, name, status, created_at, touched)| DocumentRequest {
            id: RequestId::new(id),
            source_system_id: source,
            document_type_id: doc_type,
            document_name_id: name,
            status_id: status,
            created_at,
            last_updated_at: created_at + Duration::seconds(touched),
            created_by: "generator".to_string(),
        })
}

/// Strategy for sort specs over the sortable properties
pub fn valid_sort_strategy() -> impl Strategy<Value = SortSpec> {
    (
        prop_oneof![Just("id"), Just("createdAt"), Just("lastUpdatedAt")],
        prop_oneof![Just("ASC"), Just("DESC"), Just("asc"), Just("desc")],
    )
        .prop_map(|(property, direction)| SortSpec::new(property, direction))
}

/// Strategy for criteria that pass validation under default limits
pub fn valid_criteria_strategy() -> impl Strategy<Value = SearchCriteria> {
    (
        prop::collection::vec(reference_id_strategy(), 0..3),
        prop::collection::vec(reference_id_strategy(), 0..3),
        prop::collection::vec((1i64..50).prop_map(RequestId::new), 0..5),
        prop::collection::vec((1i64..50).prop_map(BatchId::new), 0..3),
        prop::option::of((instant_strategy(), 0i64..90 * 24 * 3600)),
        prop::collection::vec(
            (reference_id_strategy(), "[A-Z]{1,6}").prop_map(|(key, value)| MetadataChip::new(key, value)),
            0..2,
        ),
        prop::collection::vec(valid_sort_strategy(), 0..3),
    )
        .prop_map(|(sources, statuses, request_ids, batch_ids, range, chips, sorts)| {
            SearchCriteria {
                source_systems: sources,
                statuses,
                request_ids,
                batch_ids,
                from: range.map(|(from, _)| from),
                to: range.map(|(from, length)| from + Duration::seconds(length)),
                metadata_chips: chips,
                sorts,
                ..SearchCriteria::default()
            }
        })
}
