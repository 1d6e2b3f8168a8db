//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use vignette_core::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait so
/// that the coordinator and the worker can be wired against any backend
/// without coupling to provider details. The coordinator only ever issues
/// credentials and (for direct uploads) writes; the worker reads originals
/// and writes derivatives.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Generate a presigned PUT URL for a direct client upload.
    ///
    /// The credential is write-scoped to `storage_key` and expires after
    /// `expires_in`; expiry is enforced by the backend, not by this crate.
    /// Only supported by S3 backends; other backends return a `ConfigError`.
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Generate a presigned/temporary URL for direct read access (GET).
    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Download an object by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Upload data to a specific storage key, overwriting any existing object.
    /// Returns the public URL for the uploaded object.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
