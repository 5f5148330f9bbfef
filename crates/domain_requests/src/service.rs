//! Document request service
//!
//! Search, summary and the detail lookups used by the monitoring screens.
//! Every lookup keyed by a request id first checks the request exists so a
//! missing request is reported as such rather than as an empty list.

use std::sync::Arc;

use tracing::info;

use core_kernel::{BatchId, DateRange, RequestId};
use chrono::{DateTime, Utc};

use crate::criteria::SearchCriteria;
use crate::error::RequestError;
use crate::page::SearchPage;
use crate::ports::DocumentRequestPort;
use crate::query::{CriteriaQueryBuilder, SearchLimits};
use crate::request::{Batch, ContentType, DocumentContent, DocumentRequest, ErrorDetail, MetadataValue};
use crate::summary::RequestSummary;

/// Application service over a [`DocumentRequestPort`]
#[derive(Clone)]
pub struct DocumentRequestService {
    port: Arc<dyn DocumentRequestPort>,
    builder: CriteriaQueryBuilder,
}

impl DocumentRequestService {
    pub fn new(port: Arc<dyn DocumentRequestPort>, limits: SearchLimits) -> Self {
        Self {
            port,
            builder: CriteriaQueryBuilder::new(limits),
        }
    }

    pub fn limits(&self) -> &SearchLimits {
        self.builder.limits()
    }

    /// Runs a paginated criteria search; `page` is 1-based
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        page: i64,
        size: i64,
    ) -> Result<SearchPage<DocumentRequest>, RequestError> {
        info!(page, size, "Searching document requests");

        let query = self.builder.build(criteria, page, size)?;
        let slice = self.port.search(&query).await?;
        let result = SearchPage::assemble(
            slice.items,
            &query,
            slice.total,
            &self.limits().links_base_path,
        );

        info!(
            total = result.total_elements,
            page = result.page,
            total_pages = result.total_pages,
            "Found document requests"
        );
        Ok(result)
    }

    /// Counts requests created within the range, per status
    pub async fn summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<RequestSummary, RequestError> {
        info!(?from, ?to, "Fetching document request summary");

        let range = DateRange::new(from, to)
            .map_err(|_| RequestError::invalid("fromDate must not be after toDate"))?;
        let statuses = self.port.statuses_matching(&range).await?;
        let summary = RequestSummary::from_statuses(range, statuses);

        info!(
            total = summary.total_count,
            statuses = summary.status_counts.len(),
            "Summary calculated"
        );
        Ok(summary)
    }

    pub async fn metadata(&self, id: RequestId) -> Result<Vec<MetadataValue>, RequestError> {
        info!(request_id = %id, "Fetching metadata for document request");

        self.require_request(id).await?;
        let values = self.port.metadata_for(id).await?;

        info!(request_id = %id, count = values.len(), "Found metadata values");
        Ok(values)
    }

    pub async fn json_content(&self, id: RequestId) -> Result<DocumentContent, RequestError> {
        self.content(id, ContentType::Json).await
    }

    pub async fn xml_content(&self, id: RequestId) -> Result<DocumentContent, RequestError> {
        self.content(id, ContentType::Xml).await
    }

    /// Fetches one content payload of a request
    pub async fn content(
        &self,
        id: RequestId,
        content_type: ContentType,
    ) -> Result<DocumentContent, RequestError> {
        info!(request_id = %id, %content_type, "Fetching content for document request");

        self.require_request(id).await?;
        let stored = self.port.content_for(id).await?.ok_or_else(|| {
            RequestError::not_found(format!("No content available for document request ID: {id}"))
        })?;
        let content = stored.get(content_type).ok_or_else(|| {
            RequestError::not_found(format!(
                "{content_type} content not available for document request ID: {id}"
            ))
        })?;

        info!(request_id = %id, %content_type, "Retrieved content");
        Ok(DocumentContent {
            request_id: id,
            content_type,
            content: content.to_string(),
        })
    }

    /// Batches of a request, newest first
    pub async fn batches(&self, id: RequestId) -> Result<Vec<Batch>, RequestError> {
        info!(request_id = %id, "Fetching batches for document request");

        self.require_request(id).await?;
        let batches = self.port.batches_for(id).await?;

        info!(request_id = %id, count = batches.len(), "Found batches");
        Ok(batches)
    }

    /// Error details of a batch; empty when the batch has none
    pub async fn batch_errors(&self, batch_id: BatchId) -> Result<Vec<ErrorDetail>, RequestError> {
        info!(%batch_id, "Fetching error details for batch");

        if !self.port.batch_exists(batch_id).await? {
            return Err(RequestError::not_found(format!(
                "Batch not found with ID: {batch_id}"
            )));
        }
        let errors = self.port.errors_for_batch(batch_id).await?;

        info!(%batch_id, count = errors.len(), "Found error details");
        Ok(errors)
    }

    async fn require_request(&self, id: RequestId) -> Result<(), RequestError> {
        if self.port.exists(id).await? {
            Ok(())
        } else {
            Err(RequestError::not_found(format!(
                "Document request not found with ID: {id}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{MetadataChip, SortSpec};
    use crate::ports::mock::MockDocumentRequestPort;
    use crate::request::{StatusRef, StoredContent};
    use chrono::{Duration, TimeZone};
    use core_kernel::{ErrorDetailId, MetadataValueId, ReferenceDataId};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn request(id: i64, status: i64, day: u32) -> DocumentRequest {
        DocumentRequest {
            id: RequestId::new(id),
            source_system_id: ReferenceDataId::new(100),
            document_type_id: ReferenceDataId::new(200),
            document_name_id: ReferenceDataId::new(300),
            status_id: ReferenceDataId::new(status),
            created_at: at(day),
            last_updated_at: at(day) + Duration::hours(1),
            created_by: "loader".to_string(),
        }
    }

    async fn seeded() -> (DocumentRequestService, MockDocumentRequestPort) {
        let port = MockDocumentRequestPort::new();
        port.add_status(StatusRef { id: ReferenceDataId::new(1), name: "FAILED".into(), description: None }).await;
        port.add_status(StatusRef { id: ReferenceDataId::new(2), name: "COMPLETED".into(), description: Some("Done".into()) }).await;
        for (id, status, day) in [(1, 1, 1), (2, 2, 2), (3, 2, 3), (4, 1, 4), (5, 2, 5)] {
            port.add_request(request(id, status, day)).await;
        }
        let service = DocumentRequestService::new(Arc::new(port.clone()), SearchLimits::default());
        (service, port)
    }

    fn ids(page: &SearchPage<DocumentRequest>) -> Vec<i64> {
        page.content.iter().map(|r| r.id.value()).collect()
    }

    #[tokio::test]
    async fn test_default_sort_is_id_desc() {
        let (service, _) = seeded().await;
        let page = service.search(&SearchCriteria::new(), 1, 10).await.unwrap();

        assert_eq!(ids(&page), vec![5, 4, 3, 2, 1]);
        assert!(page.first && page.last);
        assert_eq!(page.links.previous, None);
        assert_eq!(page.links.next, None);
        assert!(page.sorts.is_empty());
    }

    #[tokio::test]
    async fn test_status_filter_and_paging() {
        let (service, _) = seeded().await;
        let criteria = SearchCriteria::new()
            .with_statuses([ReferenceDataId::new(2)])
            .sorted_by(SortSpec::new("createdAt", "ASC"));
        let page = service.search(&criteria, 2, 2).await.unwrap();

        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(ids(&page), vec![5]);
        assert!(page.last);
        assert_eq!(page.sorts, vec![SortSpec::new("createdAt", "ASC")]);
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive() {
        let (service, _) = seeded().await;
        let criteria = SearchCriteria::new().created_between(Some(at(2)), Some(at(4)));
        let page = service.search(&criteria, 1, 10).await.unwrap();

        assert_eq!(ids(&page), vec![4, 3, 2]);
    }

    #[tokio::test]
    async fn test_batch_filter_does_not_duplicate_rows() {
        let (service, port) = seeded().await;
        for (batch, request) in [(10, 3), (11, 3), (12, 4)] {
            port.add_batch(Batch {
                id: BatchId::new(batch),
                request_id: RequestId::new(request),
                external_batch_id: None,
                status_id: ReferenceDataId::new(1),
                created_at: at(6),
            })
            .await;
        }
        let criteria = SearchCriteria::new().with_batch_ids([BatchId::new(10), BatchId::new(11)]);
        let page = service.search(&criteria, 1, 10).await.unwrap();

        assert_eq!(ids(&page), vec![3]);
        assert_eq!(page.total_elements, 1);
    }

    #[tokio::test]
    async fn test_metadata_chips_all_required() {
        let (service, port) = seeded().await;
        let rows = [(1, 1, 5, "A"), (2, 1, 6, "B"), (3, 2, 5, "A"), (4, 3, 6, "B")];
        for (id, request, key, value) in rows {
            port.add_metadata(MetadataValue {
                id: MetadataValueId::new(id),
                request_id: RequestId::new(request),
                key_id: ReferenceDataId::new(key),
                value: value.to_string(),
            })
            .await;
        }
        let criteria = SearchCriteria::new()
            .with_chip(MetadataChip::new(ReferenceDataId::new(5), "A"))
            .with_chip(MetadataChip::new(ReferenceDataId::new(6), "B"));

        let page = service.search(&criteria, 1, 10).await.unwrap();
        assert_eq!(ids(&page), vec![1]);
    }

    #[tokio::test]
    async fn test_invalid_search_never_reaches_port() {
        let (service, _) = seeded().await;
        let criteria = SearchCriteria::new().sorted_by(SortSpec::new("secretField", "ASC"));

        assert!(matches!(
            service.search(&criteria, 1, 10).await,
            Err(RequestError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_summary_groups_by_status_name() {
        let (service, _) = seeded().await;
        let summary = service.summary(Some(at(2)), None).await.unwrap();

        assert_eq!(summary.total_count, 4);
        assert_eq!(summary.status_counts[0].status_name, "COMPLETED");
        assert_eq!(summary.status_counts[0].count, 3);
        assert_eq!(summary.status_counts[1].status_name, "FAILED");
        assert_eq!(summary.status_counts[1].count, 1);
        assert_eq!(summary.from_date, Some(at(2)));
    }

    #[tokio::test]
    async fn test_summary_rejects_inverted_range() {
        let (service, _) = seeded().await;
        match service.summary(Some(at(5)), Some(at(1))).await {
            Err(RequestError::InvalidRequest(message)) => {
                assert_eq!(message, "fromDate must not be after toDate")
            }
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_metadata_for_unknown_request() {
        let (service, _) = seeded().await;
        match service.metadata(RequestId::new(42)).await {
            Err(RequestError::NotFound(message)) => {
                assert_eq!(message, "Document request not found with ID: 42")
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_content_lookups() {
        let (service, port) = seeded().await;
        port.set_content(
            RequestId::new(1),
            StoredContent { json: Some("{\"a\":1}".into()), xml: None },
        )
        .await;

        let json = service.json_content(RequestId::new(1)).await.unwrap();
        assert_eq!(json.content_type, ContentType::Json);
        assert_eq!(json.content, "{\"a\":1}");

        let xml = service.xml_content(RequestId::new(1)).await;
        assert_eq!(
            xml.unwrap_err().to_string(),
            "XML content not available for document request ID: 1"
        );

        let missing = service.json_content(RequestId::new(2)).await;
        assert_eq!(
            missing.unwrap_err().to_string(),
            "No content available for document request ID: 2"
        );
    }

    #[tokio::test]
    async fn test_batches_newest_first_and_errors() {
        let (service, port) = seeded().await;
        for (batch, day) in [(10, 6), (11, 8), (12, 7)] {
            port.add_batch(Batch {
                id: BatchId::new(batch),
                request_id: RequestId::new(2),
                external_batch_id: Some(format!("EXT-{batch}")),
                status_id: ReferenceDataId::new(1),
                created_at: at(day),
            })
            .await;
        }
        port.add_error(ErrorDetail {
            id: ErrorDetailId::new(1),
            batch_id: BatchId::new(11),
            error_code: Some("E42".into()),
            error_message: "Template missing".into(),
            created_at: at(8),
        })
        .await;

        let batches = service.batches(RequestId::new(2)).await.unwrap();
        let order: Vec<i64> = batches.iter().map(|b| b.id.value()).collect();
        assert_eq!(order, vec![11, 12, 10]);

        assert_eq!(service.batch_errors(BatchId::new(11)).await.unwrap().len(), 1);
        assert!(service.batch_errors(BatchId::new(10)).await.unwrap().is_empty());
        assert_eq!(
            service.batch_errors(BatchId::new(99)).await.unwrap_err().to_string(),
            "Batch not found with ID: 99"
        );
    }
}
