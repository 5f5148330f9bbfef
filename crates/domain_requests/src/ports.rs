//! Document Request Ports
//!
//! [`DocumentRequestPort`] is the read side of the document request
//! aggregate: criteria search plus the detail lookups behind the request
//! screens. Adapters:
//!
//! - **PostgreSQL Adapter**: `infra_db::DocumentRequestRepository`
//! - **Mock Adapter**: [`mock::MockDocumentRequestPort`], evaluating the
//!   filter tree in memory

use async_trait::async_trait;

use core_kernel::{BatchId, DateRange, DomainPort, PortError, RequestId};

use crate::query::SearchQuery;
use crate::request::{Batch, DocumentRequest, ErrorDetail, MetadataValue, StatusRef, StoredContent};

/// One page of rows plus the number of rows matching overall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Read port over document requests and their batches
#[async_trait]
pub trait DocumentRequestPort: DomainPort {
    /// Runs a validated search: filter, sort, then page
    ///
    /// Each request appears at most once however many related rows match.
    async fn search(&self, query: &SearchQuery) -> Result<Slice<DocumentRequest>, PortError>;

    async fn exists(&self, id: RequestId) -> Result<bool, PortError>;

    /// Status of every request created within `range`, one entry per request
    async fn statuses_matching(&self, range: &DateRange) -> Result<Vec<StatusRef>, PortError>;

    async fn metadata_for(&self, id: RequestId) -> Result<Vec<MetadataValue>, PortError>;

    /// The content blob of a request, if one was stored
    async fn content_for(&self, id: RequestId) -> Result<Option<StoredContent>, PortError>;

    /// Batches of a request, newest first
    async fn batches_for(&self, id: RequestId) -> Result<Vec<Batch>, PortError>;

    async fn batch_exists(&self, id: BatchId) -> Result<bool, PortError>;

    async fn errors_for_batch(&self, id: BatchId) -> Result<Vec<ErrorDetail>, PortError>;
}

/// In-memory implementation of DocumentRequestPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable, ReferenceDataId};

    use crate::query::{SortDirection, SortField, SortOrder};

    #[derive(Debug, Default)]
    struct Tables {
        requests: Vec<DocumentRequest>,
        batches: Vec<Batch>,
        metadata: Vec<MetadataValue>,
        contents: HashMap<RequestId, StoredContent>,
        errors: Vec<ErrorDetail>,
        statuses: HashMap<ReferenceDataId, StatusRef>,
    }

    /// In-memory document request store
    #[derive(Debug, Default, Clone)]
    pub struct MockDocumentRequestPort {
        tables: Arc<RwLock<Tables>>,
    }

    impl MockDocumentRequestPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn add_request(&self, request: DocumentRequest) {
            self.tables.write().await.requests.push(request);
        }

        pub async fn add_batch(&self, batch: Batch) {
            self.tables.write().await.batches.push(batch);
        }

        pub async fn add_metadata(&self, value: MetadataValue) {
            self.tables.write().await.metadata.push(value);
        }

        pub async fn set_content(&self, id: RequestId, content: StoredContent) {
            self.tables.write().await.contents.insert(id, content);
        }

        pub async fn add_error(&self, error: ErrorDetail) {
            self.tables.write().await.errors.push(error);
        }

        /// Registers the reference data row a status id resolves to
        pub async fn add_status(&self, status: StatusRef) {
            self.tables.write().await.statuses.insert(status.id, status);
        }
    }

    fn compare(a: &DocumentRequest, b: &DocumentRequest, sort: &[SortOrder]) -> Ordering {
        sort.iter()
            .map(|order| {
                let ordering = match order.field {
                    SortField::Id => a.id.cmp(&b.id),
                    SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                    SortField::LastUpdatedAt => a.last_updated_at.cmp(&b.last_updated_at),
                };
                match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    impl DomainPort for MockDocumentRequestPort {}

    #[async_trait]
    impl HealthCheckable for MockDocumentRequestPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-document-request-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl DocumentRequestPort for MockDocumentRequestPort {
        async fn search(&self, query: &SearchQuery) -> Result<Slice<DocumentRequest>, PortError> {
            let tables = self.tables.read().await;
            let mut matching: Vec<&DocumentRequest> = tables
                .requests
                .iter()
                .filter(|r| query.filter.matches(r, &tables.batches, &tables.metadata))
                .collect();
            matching.sort_by(|a, b| compare(a, b, &query.sort));

            let total = matching.len() as u64;
            let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
            let items = matching
                .into_iter()
                .skip(offset)
                .take(query.page.size as usize)
                .cloned()
                .collect();
            Ok(Slice { items, total })
        }

        async fn exists(&self, id: RequestId) -> Result<bool, PortError> {
            Ok(self.tables.read().await.requests.iter().any(|r| r.id == id))
        }

        async fn statuses_matching(&self, range: &DateRange) -> Result<Vec<StatusRef>, PortError> {
            let tables = self.tables.read().await;
            tables
                .requests
                .iter()
                .filter(|r| range.contains(r.created_at))
                .map(|r| {
                    tables
                        .statuses
                        .get(&r.status_id)
                        .cloned()
                        .ok_or_else(|| PortError::not_found("Reference data", r.status_id))
                })
                .collect()
        }

        async fn metadata_for(&self, id: RequestId) -> Result<Vec<MetadataValue>, PortError> {
            let tables = self.tables.read().await;
            Ok(tables.metadata.iter().filter(|m| m.request_id == id).cloned().collect())
        }

        async fn content_for(&self, id: RequestId) -> Result<Option<StoredContent>, PortError> {
            Ok(self.tables.read().await.contents.get(&id).cloned())
        }

        async fn batches_for(&self, id: RequestId) -> Result<Vec<Batch>, PortError> {
            let tables = self.tables.read().await;
            let mut batches: Vec<Batch> =
                tables.batches.iter().filter(|b| b.request_id == id).cloned().collect();
            batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(batches)
        }

        async fn batch_exists(&self, id: BatchId) -> Result<bool, PortError> {
            Ok(self.tables.read().await.batches.iter().any(|b| b.id == id))
        }

        async fn errors_for_batch(&self, id: BatchId) -> Result<Vec<ErrorDetail>, PortError> {
            let tables = self.tables.read().await;
            Ok(tables.errors.iter().filter(|e| e.batch_id == id).cloned().collect())
        }
    }
}
