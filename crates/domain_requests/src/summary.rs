//! Per-status request counts

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DateRange, ReferenceDataId};

use crate::request::StatusRef;

/// Number of requests in one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status_id: ReferenceDataId,
    pub status_name: String,
    pub status_description: Option<String>,
    pub count: u64,
}

/// Status breakdown of the requests created within a range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub total_count: u64,
    pub status_counts: Vec<StatusCount>,
}

impl RequestSummary {
    /// Groups the statuses of matching requests (one entry per request)
    ///
    /// Groups are ordered by status name; ties fall back to status id.
    pub fn from_statuses(range: DateRange, statuses: Vec<StatusRef>) -> Self {
        let total_count = statuses.len() as u64;

        let mut groups: BTreeMap<ReferenceDataId, StatusCount> = BTreeMap::new();
        for status in statuses {
            groups
                .entry(status.id)
                .and_modify(|group| group.count += 1)
                .or_insert(StatusCount {
                    status_id: status.id,
                    status_name: status.name,
                    status_description: status.description,
                    count: 1,
                });
        }

        let mut status_counts: Vec<StatusCount> = groups.into_values().collect();
        status_counts.sort_by(|a, b| a.status_name.cmp(&b.status_name));

        Self {
            from_date: range.from,
            to_date: range.to,
            total_count,
            status_counts,
        }
    }
}
