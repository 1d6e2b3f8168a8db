//! Test doubles for the thumbnail pipeline.
//!
//! These allow testing the processor and the end-to-end flow without S3,
//! Redis, or an HTTP callback receiver.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vignette_core::models::DerivativeRecord;
use vignette_core::StorageBackend;
use vignette_infra::CallbackNotifier;
use vignette_storage::{Storage, StorageError, StorageResult};

/// Mock storage implementation that stores objects in memory
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_downloads: bool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            fail_downloads: false,
        }
    }

    /// A storage whose downloads always fail, simulating an unreachable backend.
    pub fn with_download_failure() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            fail_downloads: true,
        }
    }

    /// Seed an object (for test setup)
    pub fn set_file(&self, key: &str, data: Vec<u8>) {
        self.files.lock().unwrap().insert(key.to_string(), data);
    }

    /// Check if an object exists (for test assertions)
    pub fn has_file(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    /// Get object data (for test assertions)
    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(key).cloned()
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        _content_type: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!("https://example.com/upload/{}", storage_key))
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!("https://example.com/{}", storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        if self.fail_downloads {
            return Err(StorageError::DownloadFailed(
                "storage unreachable".to_string(),
            ));
        }
        self.files
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        self.files
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        Ok(format!("https://example.com/{}", storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Callback notifier that records every notification instead of sending it
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<DerivativeRecord>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A notifier whose deliveries always fail.
    pub fn failing() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// All recorded notifications (for test assertions)
    pub fn notifications(&self) -> Vec<DerivativeRecord> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallbackNotifier for RecordingNotifier {
    async fn notify(&self, record: &DerivativeRecord) -> Result<u16> {
        if self.fail {
            return Err(anyhow::anyhow!("callback endpoint unreachable"));
        }
        self.notifications.lock().unwrap().push(record.clone());
        Ok(200)
    }
}

/// Encode a synthetic JPEG of the given dimensions (for test fixtures)
pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    });
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .unwrap();
    buffer
}
