//! Upload coordination.
//!
//! The service is a stateless request handler: all state lives in the
//! metadata store and the object store, injected as trait references at
//! construction.

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use vignette_core::models::{FileRecord, FileStatus, PresignUploadRequest, PresignUploadResponse};
use vignette_core::{AppError, UploadEvent};
use vignette_db::FileStore;
use vignette_events::EventPublisher;
use vignette_storage::{keys, Storage};

/// Coordinates credential issuance, upload confirmation, and event publishing.
#[derive(Clone)]
pub struct UploadService {
    files: Arc<dyn FileStore>,
    storage: Arc<dyn Storage>,
    events: Arc<dyn EventPublisher>,
    topic: String,
    presign_ttl: Duration,
}

impl UploadService {
    pub fn new(
        files: Arc<dyn FileStore>,
        storage: Arc<dyn Storage>,
        events: Arc<dyn EventPublisher>,
        topic: String,
        presign_ttl: Duration,
    ) -> Self {
        Self {
            files,
            storage,
            events,
            topic,
            presign_ttl,
        }
    }

    /// Issue a time-bounded, write-scoped upload credential and record the
    /// pending file.
    ///
    /// The storage key is minted before the object store is contacted, so the
    /// credential always maps to exactly one record. No bytes are transferred
    /// here, and abandoned pending records are not garbage-collected.
    #[tracing::instrument(
        skip(self, request),
        fields(filename = %request.filename, operation = "issue_upload_credential")
    )]
    pub async fn issue_upload_credential(
        &self,
        request: PresignUploadRequest,
    ) -> Result<PresignUploadResponse, AppError> {
        request.validate()?;

        let storage_key = keys::upload_key(&request.filename);

        let upload_url = self
            .storage
            .presigned_put_url(&storage_key, &request.content_type, self.presign_ttl)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let record = FileRecord::pending(storage_key.clone(), request.filename, request.content_type);
        self.files.create(&record).await?;

        tracing::info!(
            file_id = %record.id,
            storage_key = %storage_key,
            "Issued upload credential"
        );

        Ok(PresignUploadResponse {
            file_id: record.id,
            upload_url,
            storage_key,
            expires_in_seconds: self.presign_ttl.as_secs(),
        })
    }

    /// Confirm a completed client upload and publish the upload event.
    ///
    /// Confirmation is strict, not idempotent: a second confirm for the same
    /// id fails with `InvalidState` and publishes nothing. The event is
    /// published only after the status change is durable; if the publish
    /// fails, the record stays `uploaded` with no event sent and the error is
    /// surfaced to the caller.
    #[tracing::instrument(skip(self), fields(file_id = %file_id, operation = "confirm_upload"))]
    pub async fn confirm_upload(&self, file_id: Uuid) -> Result<FileRecord, AppError> {
        let record = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File not found: {}", file_id)))?;

        match record.status {
            FileStatus::Pending => {
                self.files.mark_uploaded(file_id).await?;
                let record = FileRecord {
                    status: FileStatus::Uploaded,
                    ..record
                };

                self.publish_upload_event(&record).await?;

                tracing::info!(
                    file_id = %record.id,
                    storage_key = %record.storage_key,
                    "Upload confirmed"
                );

                Ok(record)
            }
            FileStatus::Uploaded => Err(AppError::InvalidState(
                "File is already uploaded".to_string(),
            )),
        }
    }

    /// Server-side upload: store the bytes, record the file as uploaded, and
    /// publish the event in one call.
    #[tracing::instrument(
        skip(self, data),
        fields(filename = %filename, size_bytes = data.len(), operation = "direct_upload")
    )]
    pub async fn direct_upload(
        &self,
        filename: String,
        content_type: String,
        data: Vec<u8>,
    ) -> Result<FileRecord, AppError> {
        let storage_key = keys::upload_key(&filename);

        self.storage
            .upload_with_key(&storage_key, data, &content_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let record = FileRecord::uploaded(storage_key, filename, content_type);
        self.files.create(&record).await?;

        self.publish_upload_event(&record).await?;

        tracing::info!(
            file_id = %record.id,
            storage_key = %record.storage_key,
            "Direct upload completed"
        );

        Ok(record)
    }

    /// Look up a file record.
    pub async fn find_file(&self, file_id: Uuid) -> Result<FileRecord, AppError> {
        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File not found: {}", file_id)))
    }

    async fn publish_upload_event(&self, record: &FileRecord) -> Result<(), AppError> {
        let event = UploadEvent::from(record);
        let payload = serde_json::to_string(&event)?;
        self.events
            .publish(&self.topic, &payload)
            .await
            .map_err(|e| AppError::EventChannel(e.to_string()))
    }
}
