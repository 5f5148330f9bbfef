//! Document request repository
//!
//! Read side of document requests: criteria search, the status summary
//! source and the detail lookups (metadata, content blob, batches, errors).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

use core_kernel::{
    BatchId, DateRange, DomainPort, ErrorDetailId, HealthCheckResult, HealthCheckable,
    MetadataValueId, PortError, ReferenceDataId, RequestId,
};
use domain_requests::{
    Batch, DocumentRequest, DocumentRequestPort, ErrorDetail, MetadataValue, SearchQuery, Slice,
    StatusRef, StoredContent,
};

use crate::criteria::{count_query, search_query, statuses_query};
use crate::error::DatabaseError;
use crate::health::ping;

/// Database row for `document_request`
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRequestRow {
    pub id: i64,
    pub source_system_id: i64,
    pub document_type_id: i64,
    pub document_name_id: i64,
    pub status_id: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl From<DocumentRequestRow> for DocumentRequest {
    fn from(row: DocumentRequestRow) -> Self {
        DocumentRequest {
            id: RequestId::new(row.id),
            source_system_id: ReferenceDataId::new(row.source_system_id),
            document_type_id: ReferenceDataId::new(row.document_type_id),
            document_name_id: ReferenceDataId::new(row.document_name_id),
            status_id: ReferenceDataId::new(row.status_id),
            created_at: row.created_at,
            last_updated_at: row.last_updated_at,
            created_by: row.created_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct StatusRow {
    id: i64,
    name: String,
    description: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct MetadataRow {
    id: i64,
    request_id: i64,
    key_id: i64,
    metadata_value: String,
}

#[derive(Debug, Clone, FromRow)]
struct BlobRow {
    json_request: Option<String>,
    xml_request: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct BatchRow {
    id: i64,
    request_id: i64,
    external_batch_id: Option<String>,
    status_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct ErrorDetailRow {
    id: i64,
    batch_id: i64,
    error_code: Option<String>,
    error_message: String,
    created_at: DateTime<Utc>,
}

/// Repository for document requests and their related rows
#[derive(Debug, Clone)]
pub struct DocumentRequestRepository {
    pool: PgPool,
}

impl DocumentRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn search_rows(&self, query: &SearchQuery) -> Result<Slice<DocumentRequest>, DatabaseError> {
        let total: i64 = count_query(&query.filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let rows = search_query(query)
            .build_query_as::<DocumentRequestRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Slice {
            items: rows.into_iter().map(DocumentRequest::from).collect(),
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn request_exists(&self, id: RequestId) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM document_request WHERE id = $1)",
        )
        .bind(id.value())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn statuses(&self, range: &DateRange) -> Result<Vec<StatusRef>, DatabaseError> {
        let rows = statuses_query(range)
            .build_query_as::<StatusRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| StatusRef {
                id: ReferenceDataId::new(row.id),
                name: row.name,
                description: row.description,
            })
            .collect())
    }

    async fn metadata(&self, id: RequestId) -> Result<Vec<MetadataValue>, DatabaseError> {
        let rows = sqlx::query_as::<_, MetadataRow>(
            "SELECT id, request_id, key_id, metadata_value FROM request_metadata_value \
             WHERE request_id = $1 ORDER BY id",
        )
        .bind(id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MetadataValue {
                id: MetadataValueId::new(row.id),
                request_id: RequestId::new(row.request_id),
                key_id: ReferenceDataId::new(row.key_id),
                value: row.metadata_value,
            })
            .collect())
    }

    async fn blob(&self, id: RequestId) -> Result<Option<StoredContent>, DatabaseError> {
        let row = sqlx::query_as::<_, BlobRow>(
            "SELECT json_request, xml_request FROM document_request_blob WHERE request_id = $1",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StoredContent {
            json: row.json_request,
            xml: row.xml_request,
        }))
    }

    async fn batches(&self, id: RequestId) -> Result<Vec<Batch>, DatabaseError> {
        let rows = sqlx::query_as::<_, BatchRow>(
            "SELECT id, request_id, external_batch_id, status_id, created_at FROM th_batch \
             WHERE request_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Batch {
                id: BatchId::new(row.id),
                request_id: RequestId::new(row.request_id),
                external_batch_id: row.external_batch_id,
                status_id: ReferenceDataId::new(row.status_id),
                created_at: row.created_at,
            })
            .collect())
    }

    async fn batch_exists_row(&self, id: BatchId) -> Result<bool, DatabaseError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM th_batch WHERE id = $1)")
                .bind(id.value())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn errors(&self, id: BatchId) -> Result<Vec<ErrorDetail>, DatabaseError> {
        let rows = sqlx::query_as::<_, ErrorDetailRow>(
            "SELECT id, batch_id, error_code, error_message, created_at FROM error_detail \
             WHERE batch_id = $1 ORDER BY created_at, id",
        )
        .bind(id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ErrorDetail {
                id: ErrorDetailId::new(row.id),
                batch_id: BatchId::new(row.batch_id),
                error_code: row.error_code,
                error_message: row.error_message,
                created_at: row.created_at,
            })
            .collect())
    }
}

impl DomainPort for DocumentRequestRepository {}

#[async_trait]
impl HealthCheckable for DocumentRequestRepository {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "document_request").await
    }
}

#[async_trait]
impl DocumentRequestPort for DocumentRequestRepository {
    #[instrument(skip(self, query), fields(page = query.page.number(), size = query.page.size))]
    async fn search(&self, query: &SearchQuery) -> Result<Slice<DocumentRequest>, PortError> {
        let slice = self.search_rows(query).await?;
        debug!(returned = slice.items.len(), total = slice.total, "Searched document requests");
        Ok(slice)
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: RequestId) -> Result<bool, PortError> {
        Ok(self.request_exists(id).await?)
    }

    #[instrument(skip(self))]
    async fn statuses_matching(&self, range: &DateRange) -> Result<Vec<StatusRef>, PortError> {
        Ok(self.statuses(range).await?)
    }

    #[instrument(skip(self))]
    async fn metadata_for(&self, id: RequestId) -> Result<Vec<MetadataValue>, PortError> {
        Ok(self.metadata(id).await?)
    }

    #[instrument(skip(self))]
    async fn content_for(&self, id: RequestId) -> Result<Option<StoredContent>, PortError> {
        Ok(self.blob(id).await?)
    }

    #[instrument(skip(self))]
    async fn batches_for(&self, id: RequestId) -> Result<Vec<Batch>, PortError> {
        Ok(self.batches(id).await?)
    }

    #[instrument(skip(self))]
    async fn batch_exists(&self, id: BatchId) -> Result<bool, PortError> {
        Ok(self.batch_exists_row(id).await?)
    }

    #[instrument(skip(self))]
    async fn errors_for_batch(&self, id: BatchId) -> Result<Vec<ErrorDetail>, PortError> {
        Ok(self.errors(id).await?)
    }
}
