//! Document configuration handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::DocumentConfigId;

use crate::auth::{permissions, require_permission, RequestContext};
use crate::dto::common::HistoricParams;
use crate::dto::document_config::{
    DocumentConfigRequest, DocumentConfigResponse, DocumentConfigSearchParams,
};
use crate::{error::ApiError, AppState};

/// Creates a document configuration effective from now
pub async fn create_document_config(
    State(state): State<AppState>,
    context: RequestContext,
    Json(request): Json<DocumentConfigRequest>,
) -> Result<(StatusCode, Json<DocumentConfigResponse>), ApiError> {
    require_permission(&context.claims, permissions::DOCUMENT_CONFIG_WRITE)?;
    request.validate()?;

    let record = state
        .document_configs
        .create(request.into_payload(), &context.metadata)
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Replaces a document configuration with a new version
pub async fn update_document_config(
    State(state): State<AppState>,
    Path(id): Path<DocumentConfigId>,
    context: RequestContext,
    Json(request): Json<DocumentConfigRequest>,
) -> Result<Json<DocumentConfigResponse>, ApiError> {
    require_permission(&context.claims, permissions::DOCUMENT_CONFIG_WRITE)?;
    request.validate()?;

    let record = state
        .document_configs
        .update(id, request.into_payload(), &context.metadata)
        .await?;
    Ok(Json(record.into()))
}

/// Ends a document configuration's effective period
pub async fn delete_document_config(
    State(state): State<AppState>,
    Path(id): Path<DocumentConfigId>,
    context: RequestContext,
) -> Result<StatusCode, ApiError> {
    require_permission(&context.claims, permissions::DOCUMENT_CONFIG_WRITE)?;

    state.document_configs.delete(id, &context.metadata).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Gets a document configuration version by ID, active or not
pub async fn get_document_config(
    State(state): State<AppState>,
    Path(id): Path<DocumentConfigId>,
) -> Result<Json<DocumentConfigResponse>, ApiError> {
    let record = state.document_configs.get_by_id(id).await?;
    Ok(Json(record.into()))
}

/// Lists document configurations
pub async fn list_document_configs(
    State(state): State<AppState>,
    Query(params): Query<HistoricParams>,
) -> Result<Json<Vec<DocumentConfigResponse>>, ApiError> {
    let records = state.document_configs.list(params.historic).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Lists document configurations matching the given key fields
pub async fn search_document_configs(
    State(state): State<AppState>,
    Query(params): Query<DocumentConfigSearchParams>,
) -> Result<Json<Vec<DocumentConfigResponse>>, ApiError> {
    let records = state
        .document_configs
        .list_by_key(&params.filter(), params.historic)
        .await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
