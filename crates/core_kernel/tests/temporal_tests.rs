//! Unit and property tests for the temporal module
//!
//! Tests cover EffectivePeriod, DateRange, closing_instant and the clocks.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{
    closing_instant, Clock, DateRange, EffectivePeriod, FixedClock, TemporalError,
    CLOSE_OFFSET_SECS,
};
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

mod effective_period {
    use super::*;

    #[test]
    fn test_version_closed_then_replaced_never_overlaps() {
        let now = base() + Duration::days(30);
        let mut old = EffectivePeriod::open_from(base());
        old.close_at(closing_instant(now));
        let new = EffectivePeriod::open_from(now);

        assert!(!old.contains(now));
        assert!(new.contains(now));
    }

    #[test]
    fn test_version_closed_within_a_second_is_never_active() {
        let created = base();
        let mut period = EffectivePeriod::open_from(created);
        period.close_at(closing_instant(created));

        assert!(!period.contains(created));
        assert!(!period.contains(created - Duration::milliseconds(500)));
    }

    #[test]
    fn test_reclosing_moves_the_upper_bound() {
        let mut period = EffectivePeriod::open_from(base());
        period.close_at(base() + Duration::days(1));
        period.close_at(base() + Duration::days(2));

        assert_eq!(period.to, Some(base() + Duration::days(2)));
    }

    #[test]
    fn test_close_offset_is_one_second() {
        assert_eq!(CLOSE_OFFSET_SECS, 1);
        assert_eq!(base() - closing_instant(base()), Duration::seconds(1));
    }
}

mod date_range {
    use super::*;

    #[test]
    fn test_unbounded_contains_everything() {
        let range = DateRange::unbounded();
        assert!(range.is_unbounded());
        assert!(range.contains(base()));
    }

    #[test]
    fn test_only_lower_bound() {
        let range = DateRange::new(Some(base()), None).unwrap();
        assert!(range.contains(base()));
        assert!(!range.contains(base() - Duration::seconds(1)));
    }

    #[test]
    fn test_equal_bounds_are_allowed() {
        let range = DateRange::new(Some(base()), Some(base())).unwrap();
        assert!(range.contains(base()));
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let result = DateRange::new(Some(base() + Duration::days(1)), Some(base()));
        assert!(matches!(result, Err(TemporalError::InvalidRange { .. })));
    }
}

mod clock {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(base());
        clock.advance(Duration::hours(3));
        assert_eq!(clock.now(), base() + Duration::hours(3));
    }
}

proptest! {
    #[test]
    fn prop_closed_and_replacement_windows_are_disjoint(
        age_secs in 0i64..10_000_000,
        probe_offset in -5_000i64..5_000,
    ) {
        let created = base();
        let now = created + Duration::seconds(age_secs);
        let mut old = EffectivePeriod::open_from(created);
        old.close_at(closing_instant(now));
        let new = EffectivePeriod::open_from(now);

        let probe = now + Duration::seconds(probe_offset);
        prop_assert!(!(old.contains(probe) && new.contains(probe)));
    }

    #[test]
    fn prop_range_contains_matches_bounds(
        from in 0i64..1_000_000,
        len in 0i64..1_000_000,
        probe in -100_000i64..2_100_000,
    ) {
        let lower = base() + Duration::seconds(from);
        let upper = lower + Duration::seconds(len);
        let range = DateRange::new(Some(lower), Some(upper)).unwrap();
        let at = base() + Duration::seconds(probe);

        prop_assert_eq!(range.contains(at), at >= lower && at <= upper);
    }
}
