//! Effective-date handling
//!
//! Versioned records carry a half-open validity window `[from, to)`. An unset
//! `to` means the version is open ended. A record is *active* at `t` when the
//! window contains `t`.
//!
//! Closing a version always backdates the upper bound by [`CLOSE_OFFSET_SECS`]
//! so that the closed version and its replacement never both contain the
//! instant at which the replacement is read back.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Seconds subtracted from "now" when a version is closed
pub const CLOSE_OFFSET_SECS: i64 = 1;

/// Returns the timestamp at which a version closed at `now` ends
pub fn closing_instant(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::seconds(CLOSE_OFFSET_SECS)
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid range: from {from} must not be after to {to}")]
    InvalidRange {
        from: String,
        to: String,
    },
}

/// Effective window of a versioned record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePeriod {
    /// Start of the window (inclusive)
    pub from: DateTime<Utc>,
    /// End of the window (exclusive), None means unbounded
    pub to: Option<DateTime<Utc>>,
}

impl EffectivePeriod {
    /// Creates an open-ended window starting at `from`
    pub fn open_from(from: DateTime<Utc>) -> Self {
        Self { from, to: None }
    }

    /// Creates a window with explicit bounds
    ///
    /// No ordering check is made: a version created and closed within the
    /// same second legitimately ends before it starts and is never active.
    pub fn new(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Returns true if the window contains `at`
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && self.to.map_or(true, |to| at < to)
    }

    /// Returns true if the window has no upper bound
    pub fn is_open(&self) -> bool {
        self.to.is_none()
    }

    /// Ends the window at `at`, replacing any previous upper bound
    pub fn close_at(&mut self, at: DateTime<Utc>) {
        self.to = Some(at);
    }
}

/// Inclusive timestamp range with optional bounds, used by searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Creates a range, rejecting `from > to`
    pub fn new(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Self, TemporalError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(TemporalError::InvalidRange {
                    from: from.to_rfc3339(),
                    to: to.to_rfc3339(),
                });
            }
        }
        Ok(Self { from, to })
    }

    /// A range without bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns true if neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Returns true if `at` lies within both bounds (inclusive)
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

/// Source of "now" for temporal operations
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: RwLock::new(now) }
    }

    /// Moves the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
