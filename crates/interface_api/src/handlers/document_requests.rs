//! Document request handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};

use core_kernel::RequestId;
use domain_requests::{RequestSummary, SearchCriteria, SearchPage};

use crate::dto::document_requests::{
    BatchResponse, DocumentContentResponse, DocumentRequestResponse,
    DocumentRequestSearchRequest, MetadataValueResponse, PageParams, SummaryParams,
};
use crate::{error::ApiError, AppState};

/// Searches document requests by criteria, one page at a time
pub async fn search_document_requests(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Json(request): Json<DocumentRequestSearchRequest>,
) -> Result<Json<SearchPage<DocumentRequestResponse>>, ApiError> {
    let service = &state.document_requests;
    let page = params.page.unwrap_or(1);
    let size = params
        .size
        .unwrap_or_else(|| i64::from(service.limits().default_page_size));

    let criteria = SearchCriteria::from(request);
    let result = service.search(&criteria, page, size).await?;
    Ok(Json(result.map(Into::into)))
}

/// Counts document requests per status over a creation date range
pub async fn document_request_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<RequestSummary>, ApiError> {
    let summary = state
        .document_requests
        .summary(params.from_date, params.to_date)
        .await?;
    Ok(Json(summary))
}

/// Metadata values of a document request
pub async fn get_metadata(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
) -> Result<Json<Vec<MetadataValueResponse>>, ApiError> {
    let values = state.document_requests.metadata(id).await?;
    Ok(Json(values.into_iter().map(Into::into).collect()))
}

/// JSON content of a document request
pub async fn get_json_content(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
) -> Result<Json<DocumentContentResponse>, ApiError> {
    let content = state.document_requests.json_content(id).await?;
    Ok(Json(content.into()))
}

/// XML content of a document request
pub async fn get_xml_content(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
) -> Result<Json<DocumentContentResponse>, ApiError> {
    let content = state.document_requests.xml_content(id).await?;
    Ok(Json(content.into()))
}

/// Batches of a document request, newest first
pub async fn get_batches(
    State(state): State<AppState>,
    Path(id): Path<RequestId>,
) -> Result<Json<Vec<BatchResponse>>, ApiError> {
    let batches = state.document_requests.batches(id).await?;
    Ok(Json(batches.into_iter().map(Into::into).collect()))
}
