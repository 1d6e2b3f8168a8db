//! HTTP error response conversion
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`.
//! Use `AppError` for errors so they become `HttpAppError` via `?` and render
//! consistently (status, body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use vignette_core::{AppError, ErrorMetadata, LogLevel};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Retry after a short delay")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules prevent implementing IntoResponse for AppError directly).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = self.0;

        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, "Request failed"),
            LogLevel::Warn => tracing::warn!(error = %err, "Request failed"),
            LogLevel::Error => tracing::error!(error = %err, "Request failed"),
        }

        let status = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: err.client_message(),
            error_type: Some(err.error_type().to_string()),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action().map(String::from),
        };

        (status, Json(body)).into_response()
    }
}
