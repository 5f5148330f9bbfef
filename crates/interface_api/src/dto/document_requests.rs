//! Document request DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, ErrorDetailId, MetadataValueId, ReferenceDataId, RequestId};
use domain_requests::{
    Batch, ContentType, DocumentContent, DocumentRequest, ErrorDetail, MetadataChip,
    MetadataValue, SearchCriteria, SortSpec,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataChipDto {
    pub key_id: i64,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortDto {
    pub property: Option<String>,
    pub direction: Option<String>,
}

/// Body of `POST /document-requests/search`
///
/// Every field is optional; a missing list and an explicit `null` both leave
/// that filter off.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentRequestSearchRequest {
    pub source_systems: Option<Vec<i64>>,
    pub document_types: Option<Vec<i64>>,
    pub document_names: Option<Vec<i64>>,
    pub document_statuses: Option<Vec<i64>>,
    pub request_ids: Option<Vec<i64>>,
    pub batch_ids: Option<Vec<i64>>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub metadata_chips: Option<Vec<MetadataChipDto>>,
    pub sorts: Option<Vec<SortDto>>,
}

impl From<DocumentRequestSearchRequest> for SearchCriteria {
    fn from(request: DocumentRequestSearchRequest) -> Self {
        let ids = |raw: Option<Vec<i64>>| -> Vec<ReferenceDataId> {
            raw.unwrap_or_default().into_iter().map(ReferenceDataId::new).collect()
        };
        SearchCriteria {
            source_systems: ids(request.source_systems),
            document_types: ids(request.document_types),
            document_names: ids(request.document_names),
            statuses: ids(request.document_statuses),
            request_ids: request
                .request_ids
                .unwrap_or_default()
                .into_iter()
                .map(RequestId::new)
                .collect(),
            batch_ids: request
                .batch_ids
                .unwrap_or_default()
                .into_iter()
                .map(BatchId::new)
                .collect(),
            from: request.from_date,
            to: request.to_date,
            metadata_chips: request
                .metadata_chips
                .unwrap_or_default()
                .into_iter()
                .map(|chip| MetadataChip::new(ReferenceDataId::new(chip.key_id), chip.value))
                .collect(),
            sorts: request
                .sorts
                .unwrap_or_default()
                .into_iter()
                .map(|sort| SortSpec {
                    property: sort.property,
                    direction: sort.direction,
                })
                .collect(),
        }
    }
}

/// `?page=&size=` of a search; `page` is 1-based
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// `?fromDate=&toDate=` of the summary
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryParams {
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequestResponse {
    pub id: RequestId,
    pub source_system_id: ReferenceDataId,
    pub document_type_id: ReferenceDataId,
    pub document_name_id: ReferenceDataId,
    pub status_id: ReferenceDataId,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl From<DocumentRequest> for DocumentRequestResponse {
    fn from(request: DocumentRequest) -> Self {
        Self {
            id: request.id,
            source_system_id: request.source_system_id,
            document_type_id: request.document_type_id,
            document_name_id: request.document_name_id,
            status_id: request.status_id,
            created_at: request.created_at,
            last_updated_at: request.last_updated_at,
            created_by: request.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataValueResponse {
    pub id: MetadataValueId,
    pub request_id: RequestId,
    pub key_id: ReferenceDataId,
    pub value: String,
}

impl From<MetadataValue> for MetadataValueResponse {
    fn from(value: MetadataValue) -> Self {
        Self {
            id: value.id,
            request_id: value.request_id,
            key_id: value.key_id,
            value: value.value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContentResponse {
    pub request_id: RequestId,
    pub content_type: ContentType,
    pub content: String,
}

impl From<DocumentContent> for DocumentContentResponse {
    fn from(content: DocumentContent) -> Self {
        Self {
            request_id: content.request_id,
            content_type: content.content_type,
            content: content.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub id: BatchId,
    pub request_id: RequestId,
    pub external_batch_id: Option<String>,
    pub status_id: ReferenceDataId,
    pub created_at: DateTime<Utc>,
}

impl From<Batch> for BatchResponse {
    fn from(batch: Batch) -> Self {
        Self {
            id: batch.id,
            request_id: batch.request_id,
            external_batch_id: batch.external_batch_id,
            status_id: batch.status_id,
            created_at: batch.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetailResponse {
    pub id: ErrorDetailId,
    pub batch_id: BatchId,
    pub error_code: Option<String>,
    pub error_message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ErrorDetail> for ErrorDetailResponse {
    fn from(error: ErrorDetail) -> Self {
        Self {
            id: error.id,
            batch_id: error.batch_id,
            error_code: error.error_code,
            error_message: error.error_message,
            created_at: error.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_body_maps_to_criteria() {
        let request: DocumentRequestSearchRequest = serde_json::from_str(
            r#"{
                "documentStatuses": [4],
                "batchIds": [7, 8],
                "metadataChips": [{"keyId": 5, "value": "A"}],
                "sorts": [{"property": "createdAt", "direction": "ASC"}]
            }"#,
        )
        .unwrap();
        let criteria = SearchCriteria::from(request);

        assert_eq!(criteria.statuses, vec![ReferenceDataId::new(4)]);
        assert_eq!(criteria.batch_ids.len(), 2);
        assert_eq!(
            criteria.metadata_chips,
            vec![MetadataChip::new(ReferenceDataId::new(5), "A")]
        );
        assert_eq!(criteria.sorts, vec![SortSpec::new("createdAt", "ASC")]);
        assert!(criteria.source_systems.is_empty());
    }

    #[test]
    fn test_empty_body_is_unfiltered() {
        let request: DocumentRequestSearchRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(SearchCriteria::from(request), SearchCriteria::default());
    }

    #[test]
    fn test_null_lists_are_unfiltered() {
        let request: DocumentRequestSearchRequest = serde_json::from_str(
            r#"{
                "sourceSystems": null,
                "documentStatuses": null,
                "requestIds": null,
                "batchIds": null,
                "metadataChips": null,
                "sorts": null,
                "fromDate": null
            }"#,
        )
        .unwrap();
        assert_eq!(SearchCriteria::from(request), SearchCriteria::default());
    }
}
