use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use vignette_core::StorageBackend;

/// Local filesystem storage implementation
///
/// Useful for development and single-node deployments. Presigned PUT URLs
/// are not supported; direct client uploads require an S3 backend.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/vignette/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:4000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with path-traversal validation.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Generate public URL for a key
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn presigned_put_url(
        &self,
        _storage_key: &str,
        _content_type: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::ConfigError(
            "Presigned PUT URLs are not supported by the local storage backend".to_string(),
        ))
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        // Local files are served directly; the URL carries no expiry.
        self.key_to_path(storage_key)?;
        Ok(self.generate_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        file.write_all(&data)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(
            key = %storage_key,
            size_bytes = size,
            "Local upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
