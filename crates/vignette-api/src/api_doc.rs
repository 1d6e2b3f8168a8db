//! OpenAPI documentation

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use vignette_core::models::{
    ConfirmUploadResponse, DerivativeStatus, FileResponse, FileStatus, PresignUploadRequest,
    PresignUploadResponse, ThumbnailResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::files::presign_upload,
        handlers::files::confirm_upload,
        handlers::files::direct_upload,
        handlers::files::get_file,
        handlers::files::download_url,
        handlers::thumbnails::get_thumbnail,
        handlers::thumbnails::list_file_thumbnails,
    ),
    components(schemas(
        PresignUploadRequest,
        PresignUploadResponse,
        ConfirmUploadResponse,
        FileResponse,
        FileStatus,
        ThumbnailResponse,
        DerivativeStatus,
        ErrorResponse,
        handlers::files::DownloadUrlResponse,
    )),
    tags(
        (name = "files", description = "Upload credential issuance and confirmation"),
        (name = "thumbnails", description = "Thumbnail job status")
    )
)]
pub struct ApiDoc;
