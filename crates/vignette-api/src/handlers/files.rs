use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

use vignette_core::models::{
    ConfirmUploadResponse, FileResponse, PresignUploadRequest, PresignUploadResponse,
};
use vignette_core::AppError;

/// Default presigned GET URL lifetime (1 hour)
const DEFAULT_DOWNLOAD_EXPIRY_SECS: u64 = 3600;

/// Generate a presigned URL for direct upload
#[utoipa::path(
    post,
    path = "/api/v0/files/presign",
    tag = "files",
    request_body = PresignUploadRequest,
    responses(
        (status = 200, description = "Presigned URL generated", body = PresignUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn presign_upload(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PresignUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state.uploads.issue_upload_credential(request).await?;
    Ok(Json(response))
}

/// Confirm an upload after the client finished writing to the object store
#[utoipa::path(
    post,
    path = "/api/v0/files/confirm/{file_id}",
    tag = "files",
    params(("file_id" = Uuid, Path, description = "File ID from the presign response")),
    responses(
        (status = 200, description = "Upload confirmed", body = ConfirmUploadResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 409, description = "File already uploaded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn confirm_upload(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state.uploads.confirm_upload(file_id).await?;
    Ok(Json(ConfirmUploadResponse::from(record)))
}

/// Upload a file through the server (multipart)
#[utoipa::path(
    post,
    path = "/api/v0/files/upload",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded", body = FileResponse),
        (status = 400, description = "Invalid multipart request", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn direct_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| AppError::InvalidInput("Missing filename in 'file' field".to_string()))?;
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read upload body: {}", e)))?;

        if data.len() > state.max_upload_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds maximum size of {} bytes",
                state.max_upload_size_bytes
            ))
            .into());
        }

        let record = state
            .uploads
            .direct_upload(filename, content_type, data.to_vec())
            .await?;
        return Ok(Json(FileResponse::from(record)));
    }

    Err(AppError::InvalidInput("Missing 'file' field in multipart request".to_string()).into())
}

/// Get a file record
#[utoipa::path(
    get,
    path = "/api/v0/files/{file_id}",
    tag = "files",
    params(("file_id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "File record", body = FileResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state.uploads.find_file(file_id).await?;
    Ok(Json(FileResponse::from(record)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DownloadUrlQuery {
    /// URL lifetime in seconds (default 3600)
    pub expires_in_seconds: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadUrlResponse {
    pub url: String,
    pub expires_in_seconds: u64,
}

/// Get a presigned GET URL for a file's object
#[utoipa::path(
    get,
    path = "/api/v0/files/{file_id}/download-url",
    tag = "files",
    params(
        ("file_id" = Uuid, Path, description = "File ID"),
        ("expires_in_seconds" = Option<u64>, Query, description = "URL lifetime in seconds")
    ),
    responses(
        (status = 200, description = "Presigned GET URL", body = DownloadUrlResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn download_url(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<Uuid>,
    Query(query): Query<DownloadUrlQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state.uploads.find_file(file_id).await?;

    let expires_in_seconds = query
        .expires_in_seconds
        .unwrap_or(DEFAULT_DOWNLOAD_EXPIRY_SECS);
    let url = state
        .storage
        .presigned_get_url(&record.storage_key, Duration::from_secs(expires_in_seconds))
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    Ok(Json(DownloadUrlResponse {
        url,
        expires_in_seconds,
    }))
}
