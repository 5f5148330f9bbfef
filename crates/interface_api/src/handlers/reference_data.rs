//! Reference data handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::ReferenceDataId;
use domain_reference::ReferenceDataFilter;

use crate::auth::{permissions, require_permission, RequestContext};
use crate::dto::common::HistoricParams;
use crate::dto::reference_data::{ReferenceDataRequest, ReferenceDataResponse};
use crate::{error::ApiError, AppState};

/// Creates a reference data record effective from now
pub async fn create_reference_data(
    State(state): State<AppState>,
    context: RequestContext,
    Json(request): Json<ReferenceDataRequest>,
) -> Result<(StatusCode, Json<ReferenceDataResponse>), ApiError> {
    require_permission(&context.claims, permissions::REFERENCE_DATA_WRITE)?;
    request.validate()?;

    let record = state
        .reference_data
        .create(request.into_payload(), &context.metadata)
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Replaces a reference data record with a new version
pub async fn update_reference_data(
    State(state): State<AppState>,
    Path(id): Path<ReferenceDataId>,
    context: RequestContext,
    Json(request): Json<ReferenceDataRequest>,
) -> Result<Json<ReferenceDataResponse>, ApiError> {
    require_permission(&context.claims, permissions::REFERENCE_DATA_WRITE)?;
    request.validate()?;

    let record = state
        .reference_data
        .update(id, request.into_payload(), &context.metadata)
        .await?;
    Ok(Json(record.into()))
}

/// Ends a reference data record's effective period
pub async fn delete_reference_data(
    State(state): State<AppState>,
    Path(id): Path<ReferenceDataId>,
    context: RequestContext,
) -> Result<StatusCode, ApiError> {
    require_permission(&context.claims, permissions::REFERENCE_DATA_WRITE)?;

    state.reference_data.delete(id, &context.metadata).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Gets a reference data version by ID, active or not
pub async fn get_reference_data(
    State(state): State<AppState>,
    Path(id): Path<ReferenceDataId>,
) -> Result<Json<ReferenceDataResponse>, ApiError> {
    let record = state.reference_data.get_by_id(id).await?;
    Ok(Json(record.into()))
}

/// Lists reference data
pub async fn list_reference_data(
    State(state): State<AppState>,
    Query(params): Query<HistoricParams>,
) -> Result<Json<Vec<ReferenceDataResponse>>, ApiError> {
    let records = state.reference_data.list(params.historic).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Lists reference data of one type
pub async fn list_reference_data_by_type(
    State(state): State<AppState>,
    Path(ref_data_type): Path<String>,
    Query(params): Query<HistoricParams>,
) -> Result<Json<Vec<ReferenceDataResponse>>, ApiError> {
    let records = state
        .reference_data
        .list_by_key(&ReferenceDataFilter::by_type(ref_data_type), params.historic)
        .await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
