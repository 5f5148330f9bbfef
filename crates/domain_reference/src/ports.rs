//! Versioned Record Ports
//!
//! The [`VersionStore`] port is everything the temporal record store needs
//! from persistence. It is generic over the record payload so the same port
//! serves reference data and document configuration.
//!
//! - **PostgreSQL Adapter**: `infra_db` repositories, one per record kind
//! - **Mock Adapter**: [`mock::MockVersionStore`], in memory, for tests
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_reference::{ReferenceData, TemporalRecordStore, VersionStore};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn VersionStore<ReferenceData>> = Arc::new(repository);
//! let store = TemporalRecordStore::new(port, Arc::new(SystemClock));
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{DomainPort, PortError};

use crate::record::{NewVersion, RecordPayload, Supersession, VersionedRecord};

/// Persistence port for one kind of versioned record
///
/// Listing methods return rows ordered by id ascending. `active_at: None`
/// means every version regardless of its effective period.
#[async_trait]
pub trait VersionStore<P: RecordPayload>: DomainPort {
    /// Loads a version by id, active or not
    async fn find_by_id(&self, id: P::Id) -> Result<Option<VersionedRecord<P>>, PortError>;

    /// Lists versions, optionally only those active at an instant
    async fn find_all(
        &self,
        active_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<VersionedRecord<P>>, PortError>;

    /// Lists versions whose business key fields equal those set on `filter`
    async fn find_matching(
        &self,
        filter: &P::Filter,
        active_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<VersionedRecord<P>>, PortError>;

    /// Writes a new version and returns it with its assigned id
    async fn insert(&self, version: NewVersion<P>) -> Result<VersionedRecord<P>, PortError>;

    /// Closes at `closed_at` the versions of `id`'s business key that are
    /// active at the replacement's start, inserts `replacement`, then reads
    /// back the versions active for the replacement's business key.
    ///
    /// `id` itself is only closed if it is still active; versions that are
    /// already closed keep their end. The three steps form one unit of work.
    /// Fails with `NotFound` when `id` does not exist, in which case nothing
    /// is written.
    async fn supersede(
        &self,
        id: P::Id,
        closed_at: DateTime<Utc>,
        replacement: NewVersion<P>,
    ) -> Result<Supersession<P>, PortError>;

    /// Sets the end of `id`'s effective period, replacing any earlier end
    async fn close(
        &self,
        id: P::Id,
        closed_at: DateTime<Utc>,
        actor: &str,
        touched_at: DateTime<Utc>,
    ) -> Result<VersionedRecord<P>, PortError>;
}

/// In-memory implementation of VersionStore for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use chrono::Utc;
    use core_kernel::{AdapterHealth, EntityId, HealthCheckResult, HealthCheckable, ReferenceDataId};

    use crate::record::ReferenceLabels;

    /// In-memory version store keyed by raw id
    ///
    /// Filters naming reference data by value are resolved against labels
    /// registered with [`MockVersionStore::label_reference`], standing in for
    /// the `reference_data` table.
    #[derive(Debug)]
    pub struct MockVersionStore<P: RecordPayload> {
        rows: Arc<RwLock<BTreeMap<i64, VersionedRecord<P>>>>,
        labels: Arc<RwLock<ReferenceLabels>>,
        next_id: AtomicI64,
    }

    impl<P: RecordPayload> Default for MockVersionStore<P> {
        fn default() -> Self {
            Self {
                rows: Arc::new(RwLock::new(BTreeMap::new())),
                labels: Arc::new(RwLock::new(ReferenceLabels::new())),
                next_id: AtomicI64::new(1),
            }
        }
    }

    impl<P: RecordPayload> MockVersionStore<P> {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers the `ref_data_value` of a reference data row
        pub async fn label_reference(&self, id: ReferenceDataId, value: impl Into<String>) {
            self.labels.write().await.insert(id, value.into());
        }

        /// Number of stored versions, active or not
        pub async fn len(&self) -> usize {
            self.rows.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.rows.read().await.is_empty()
        }

        fn assign(&self, version: NewVersion<P>) -> VersionedRecord<P> {
            let raw = self.next_id.fetch_add(1, Ordering::SeqCst);
            VersionedRecord {
                id: P::Id::from_raw(raw),
                payload: version.payload,
                period: version.period,
                audit: version.audit,
            }
        }
    }

    fn select<'a, P: RecordPayload>(
        rows: impl Iterator<Item = &'a VersionedRecord<P>>,
        filter: Option<&P::Filter>,
        labels: &ReferenceLabels,
        active_at: Option<DateTime<Utc>>,
    ) -> Vec<VersionedRecord<P>> {
        rows.filter(|r| filter.map_or(true, |f| r.payload.matches_with_labels(f, labels)))
            .filter(|r| active_at.map_or(true, |at| r.is_active_at(at)))
            .cloned()
            .collect()
    }

    impl<P: RecordPayload> DomainPort for MockVersionStore<P> {}

    #[async_trait]
    impl<P: RecordPayload> HealthCheckable for MockVersionStore<P> {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: format!("mock-version-store:{}", P::KIND),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl<P: RecordPayload> VersionStore<P> for MockVersionStore<P> {
        async fn find_by_id(&self, id: P::Id) -> Result<Option<VersionedRecord<P>>, PortError> {
            Ok(self.rows.read().await.get(&id.raw()).cloned())
        }

        async fn find_all(
            &self,
            active_at: Option<DateTime<Utc>>,
        ) -> Result<Vec<VersionedRecord<P>>, PortError> {
            let rows = self.rows.read().await;
            Ok(select(rows.values(), None, &ReferenceLabels::new(), active_at))
        }

        async fn find_matching(
            &self,
            filter: &P::Filter,
            active_at: Option<DateTime<Utc>>,
        ) -> Result<Vec<VersionedRecord<P>>, PortError> {
            let rows = self.rows.read().await;
            let labels = self.labels.read().await;
            Ok(select(rows.values(), Some(filter), &labels, active_at))
        }

        async fn insert(&self, version: NewVersion<P>) -> Result<VersionedRecord<P>, PortError> {
            let record = self.assign(version);
            self.rows.write().await.insert(record.id.raw(), record.clone());
            Ok(record)
        }

        async fn supersede(
            &self,
            id: P::Id,
            closed_at: DateTime<Utc>,
            replacement: NewVersion<P>,
        ) -> Result<Supersession<P>, PortError> {
            let mut rows = self.rows.write().await;
            let target_key = rows
                .get(&id.raw())
                .ok_or_else(|| PortError::not_found(P::KIND, id))?
                .payload
                .key_filter();

            let read_at = replacement.period.from;
            let mut closed = Vec::new();
            for row in rows.values_mut() {
                if row.payload.matches(&target_key) && row.is_active_at(read_at) {
                    row.period.close_at(closed_at);
                    row.audit.touch(
                        replacement.audit.created_by.clone(),
                        replacement.audit.created_at,
                    );
                    closed.push(row.clone());
                }
            }

            let key = replacement.payload.key_filter();
            let inserted = self.assign(replacement);
            rows.insert(inserted.id.raw(), inserted.clone());

            let active = select(rows.values(), Some(&key), &ReferenceLabels::new(), Some(read_at));
            Ok(Supersession { closed, inserted, active })
        }

        async fn close(
            &self,
            id: P::Id,
            closed_at: DateTime<Utc>,
            actor: &str,
            touched_at: DateTime<Utc>,
        ) -> Result<VersionedRecord<P>, PortError> {
            let mut rows = self.rows.write().await;
            let record = rows
                .get_mut(&id.raw())
                .ok_or_else(|| PortError::not_found(P::KIND, id))?;
            record.period.close_at(closed_at);
            record.audit.touch(actor, touched_at);
            Ok(record.clone())
        }
    }
}
