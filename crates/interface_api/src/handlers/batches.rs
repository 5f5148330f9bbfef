//! Batch handlers

use axum::{
    extract::{Path, State},
    Json,
};

use core_kernel::BatchId;

use crate::dto::document_requests::ErrorDetailResponse;
use crate::{error::ApiError, AppState};

/// Error details recorded against a batch
pub async fn get_batch_errors(
    State(state): State<AppState>,
    Path(id): Path<BatchId>,
) -> Result<Json<Vec<ErrorDetailResponse>>, ApiError> {
    let errors = state.document_requests.batch_errors(id).await?;
    Ok(Json(errors.into_iter().map(Into::into).collect()))
}
