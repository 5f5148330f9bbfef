//! Assertion helpers for effective-dated versions
//!
//! Give more meaningful failure messages than plain `assert!` when checking
//! the temporal invariants of a set of versions.

use chrono::{DateTime, Utc};
use domain_reference::{RecordPayload, VersionedRecord};

/// Asserts that exactly one of `versions` is active at `at` and returns it
///
/// # Panics
///
/// Panics if none or several versions are active
pub fn assert_single_active<'a, P: RecordPayload>(
    versions: &'a [VersionedRecord<P>],
    at: DateTime<Utc>,
) -> &'a VersionedRecord<P> {
    let active: Vec<&VersionedRecord<P>> =
        versions.iter().filter(|v| v.is_active_at(at)).collect();
    assert_eq!(
        active.len(),
        1,
        "Expected exactly one active {} at {}, found ids {:?}",
        P::KIND,
        at,
        active.iter().map(|v| v.id).collect::<Vec<_>>()
    );
    active[0]
}

/// Asserts that no two of `versions` are in effect at the same instant
pub fn assert_periods_disjoint<P: RecordPayload>(versions: &[VersionedRecord<P>]) {
    for (i, a) in versions.iter().enumerate() {
        for b in &versions[i + 1..] {
            let a_ends_first = a.period.to.is_some_and(|to| to <= b.period.from);
            let b_ends_first = b.period.to.is_some_and(|to| to <= a.period.from);
            assert!(
                a_ends_first || b_ends_first,
                "{} versions {} and {} overlap: {:?} / {:?}",
                P::KIND,
                a.id,
                b.id,
                a.period,
                b.period
            );
        }
    }
}

/// Asserts that `version` was closed exactly at `to`
pub fn assert_closed_at<P: RecordPayload>(version: &VersionedRecord<P>, to: DateTime<Utc>) {
    assert_eq!(
        version.period.to,
        Some(to),
        "Expected {} {} to end at {}",
        P::KIND,
        version.id,
        to
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::ReferenceDataRecordBuilder;
    use crate::fixtures::TemporalFixtures;

    #[test]
    fn test_consecutive_versions_are_disjoint() {
        let switch = TemporalFixtures::later();
        let versions = vec![
            ReferenceDataRecordBuilder::new(1, "SOURCE_SYSTEM").closed_at(switch).build(),
            ReferenceDataRecordBuilder::new(2, "SOURCE_SYSTEM")
                .effective_from(switch)
                .build(),
        ];

        assert_periods_disjoint(&versions);
        let active = assert_single_active(&versions, switch);
        assert_eq!(active.id.value(), 2);
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn test_overlapping_versions_panic() {
        let versions = vec![
            ReferenceDataRecordBuilder::new(1, "SOURCE_SYSTEM").build(),
            ReferenceDataRecordBuilder::new(2, "SOURCE_SYSTEM").build(),
        ];
        assert_periods_disjoint(&versions);
    }
}
