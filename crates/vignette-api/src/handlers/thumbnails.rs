use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use vignette_core::models::ThumbnailResponse;
use vignette_core::AppError;

/// Get a thumbnail job record.
///
/// Derivative failures are asynchronous; this endpoint is how clients observe
/// them.
#[utoipa::path(
    get,
    path = "/api/v0/thumbnails/{id}",
    tag = "thumbnails",
    params(("id" = Uuid, Path, description = "Thumbnail job ID")),
    responses(
        (status = 200, description = "Thumbnail job record", body = ThumbnailResponse),
        (status = 404, description = "Thumbnail job not found", body = ErrorResponse)
    )
)]
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .derivatives
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Thumbnail job not found: {}", id)))?;
    Ok(Json(ThumbnailResponse::from(record)))
}

/// List thumbnail jobs for a file, newest first
#[utoipa::path(
    get,
    path = "/api/v0/files/{file_id}/thumbnails",
    tag = "thumbnails",
    params(("file_id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "Thumbnail job records", body = [ThumbnailResponse]),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn list_file_thumbnails(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state.uploads.find_file(file_id).await?;

    let thumbnails: Vec<ThumbnailResponse> = state
        .derivatives
        .find_by_original_key(&record.storage_key)
        .await?
        .into_iter()
        .map(ThumbnailResponse::from)
        .collect();

    Ok(Json(thumbnails))
}
