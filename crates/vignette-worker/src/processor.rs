//! Per-event thumbnail job processing.
//!
//! State machine per job: `received -> processing -> {success | failed}`.
//! There is no transition back to `processing` and no automatic retry of
//! failed jobs; recovery requires re-publishing the event.

use chrono::Utc;
use std::sync::Arc;

use vignette_core::constants::THUMBNAIL_CONTENT_TYPE;
use vignette_core::models::{DerivativeRecord, DerivativeStatus};
use vignette_core::{AppError, UploadEvent};
use vignette_db::DerivativeStore;
use vignette_infra::CallbackNotifier;
use vignette_processing::{ThumbnailSpec, Thumbnailer};
use vignette_storage::{Storage, StorageError};

/// Handles one upload event end to end.
///
/// Dependencies are injected at construction; the processor owns no state of
/// its own beyond the thumbnail dimensions.
pub struct ThumbnailProcessor {
    storage: Arc<dyn Storage>,
    derivatives: Arc<dyn DerivativeStore>,
    notifier: Arc<dyn CallbackNotifier>,
    spec: ThumbnailSpec,
}

impl ThumbnailProcessor {
    pub fn new(
        storage: Arc<dyn Storage>,
        derivatives: Arc<dyn DerivativeStore>,
        notifier: Arc<dyn CallbackNotifier>,
        spec: ThumbnailSpec,
    ) -> Self {
        Self {
            storage,
            derivatives,
            notifier,
            spec,
        }
    }

    /// Process one upload event.
    ///
    /// Never returns an error to the caller: every outcome is recorded in the
    /// derivative record, and the event is considered consumed either way. A
    /// duplicate delivery creates a second, independent record and overwrites
    /// the same derivative key.
    #[tracing::instrument(
        skip(self, event),
        fields(file_id = %event.file_id, storage_key = %event.storage_key)
    )]
    pub async fn handle(&self, event: &UploadEvent) {
        // Persist the job before any transform I/O, so a crash mid-transform
        // leaves an inspectable `processing` record rather than a silent drop.
        let record = DerivativeRecord::processing(event.storage_key.clone());
        if let Err(e) = self.derivatives.create(&record).await {
            tracing::error!(error = %e, "Failed to create derivative record, dropping event");
            return;
        }

        tracing::info!(
            derivative_id = %record.id,
            derivative_key = %record.derivative_storage_key,
            "Thumbnail job started"
        );

        match self.render_and_store(&record).await {
            Ok(()) => self.complete(record).await,
            Err(e) => self.fail(record, e).await,
        }
    }

    /// Fetch the original, render the thumbnail, write the derivative.
    async fn render_and_store(&self, record: &DerivativeRecord) -> Result<(), AppError> {
        let original = self
            .storage
            .download(&record.original_storage_key)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(key) => {
                    AppError::NotFound(format!("Original object not found: {}", key))
                }
                other => AppError::Storage(other.to_string()),
            })?;

        let thumbnail = Thumbnailer::render(&original, self.spec)
            .map_err(|e| AppError::ImageProcessing(e.to_string()))?;

        self.storage
            .upload_with_key(
                &record.derivative_storage_key,
                thumbnail.to_vec(),
                THUMBNAIL_CONTENT_TYPE,
            )
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn complete(&self, mut record: DerivativeRecord) {
        if let Err(e) = self.derivatives.mark_succeeded(record.id).await {
            tracing::error!(
                derivative_id = %record.id,
                error = %e,
                "Failed to persist success status"
            );
            let _ = self
                .derivatives
                .mark_failed(record.id, &e.to_string())
                .await;
            return;
        }

        record.status = DerivativeStatus::Success;
        record.updated_at = Utc::now();

        tracing::info!(
            derivative_id = %record.id,
            derivative_key = %record.derivative_storage_key,
            "Thumbnail job succeeded"
        );

        // Single attempt; a failed notification does not roll back the status.
        match self.notifier.notify(&record).await {
            Ok(status) => {
                tracing::debug!(derivative_id = %record.id, status = status, "Callback sent")
            }
            Err(e) => {
                tracing::warn!(
                    derivative_id = %record.id,
                    error = %e,
                    "Callback delivery failed"
                );
            }
        }
    }

    async fn fail(&self, record: DerivativeRecord, error: AppError) {
        tracing::warn!(
            derivative_id = %record.id,
            error = %error,
            "Thumbnail job failed"
        );

        if let Err(e) = self
            .derivatives
            .mark_failed(record.id, &error.to_string())
            .await
        {
            tracing::error!(
                derivative_id = %record.id,
                error = %e,
                "Failed to persist failure status"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_jpeg, MockStorage, RecordingNotifier};
    use uuid::Uuid;
    use vignette_db::InMemoryDerivativeStore;

    fn test_event(storage_key: &str) -> UploadEvent {
        UploadEvent {
            file_id: Uuid::new_v4(),
            storage_key: storage_key.to_string(),
            original_name: "cat.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        }
    }

    fn test_processor(
        storage: Arc<MockStorage>,
        derivatives: Arc<InMemoryDerivativeStore>,
        notifier: Arc<RecordingNotifier>,
    ) -> ThumbnailProcessor {
        ThumbnailProcessor::new(
            storage,
            derivatives,
            notifier,
            ThumbnailSpec {
                width: 320,
                height: 240,
            },
        )
    }

    #[tokio::test]
    async fn test_valid_image_ends_in_success_and_notifies() {
        let storage = Arc::new(MockStorage::new());
        let derivatives = Arc::new(InMemoryDerivativeStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        storage.set_file("abc_cat.jpg", sample_jpeg(800, 600));

        let processor = test_processor(storage.clone(), derivatives.clone(), notifier.clone());
        processor.handle(&test_event("abc_cat.jpg")).await;

        let records = derivatives.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DerivativeStatus::Success);
        assert_eq!(records[0].derivative_storage_key, "thumbnails/abc_cat.jpg");
        assert!(storage.has_file("thumbnails/abc_cat.jpg"));

        let notified = notifier.notifications();
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].id, records[0].id);
        assert_eq!(notified[0].status, DerivativeStatus::Success);
    }

    #[tokio::test]
    async fn test_missing_original_ends_in_failed_without_callback() {
        let storage = Arc::new(MockStorage::new());
        let derivatives = Arc::new(InMemoryDerivativeStore::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let processor = test_processor(storage.clone(), derivatives.clone(), notifier.clone());
        processor.handle(&test_event("missing.jpg")).await;

        let records = derivatives.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DerivativeStatus::Failed);
        assert!(records[0].error_message.is_some());
        assert!(notifier.notifications().is_empty());
        assert!(!storage.has_file("thumbnails/missing.jpg"));
    }

    #[tokio::test]
    async fn test_undecodable_object_ends_in_failed() {
        let storage = Arc::new(MockStorage::new());
        let derivatives = Arc::new(InMemoryDerivativeStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        storage.set_file("abc_notes.txt", b"not an image".to_vec());

        let processor = test_processor(storage.clone(), derivatives.clone(), notifier.clone());
        processor.handle(&test_event("abc_notes.txt")).await;

        let records = derivatives.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DerivativeStatus::Failed);
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_storage_ends_in_failed() {
        let storage = Arc::new(MockStorage::with_download_failure());
        let derivatives = Arc::new(InMemoryDerivativeStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        storage.set_file("abc_cat.jpg", sample_jpeg(800, 600));

        let processor = test_processor(storage.clone(), derivatives.clone(), notifier.clone());
        processor.handle(&test_event("abc_cat.jpg")).await;

        let records = derivatives.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DerivativeStatus::Failed);
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_delivery_creates_independent_records() {
        let storage = Arc::new(MockStorage::new());
        let derivatives = Arc::new(InMemoryDerivativeStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        storage.set_file("abc_cat.jpg", sample_jpeg(800, 600));

        let processor = test_processor(storage.clone(), derivatives.clone(), notifier.clone());
        let event = test_event("abc_cat.jpg");
        processor.handle(&event).await;
        let first_thumb = storage.get_file("thumbnails/abc_cat.jpg").unwrap();
        processor.handle(&event).await;
        let second_thumb = storage.get_file("thumbnails/abc_cat.jpg").unwrap();

        let records = derivatives.all();
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.status == DerivativeStatus::Success));
        assert!(records
            .iter()
            .all(|r| r.derivative_storage_key == "thumbnails/abc_cat.jpg"));
        // Deterministic transform: redelivery overwrites with equivalent bytes.
        assert_eq!(first_thumb, second_thumb);
        assert_eq!(notifier.notifications().len(), 2);
    }

    #[tokio::test]
    async fn test_callback_failure_does_not_roll_back_success() {
        let storage = Arc::new(MockStorage::new());
        let derivatives = Arc::new(InMemoryDerivativeStore::new());
        let notifier = Arc::new(RecordingNotifier::failing());
        storage.set_file("abc_cat.jpg", sample_jpeg(800, 600));

        let processor = test_processor(storage.clone(), derivatives.clone(), notifier.clone());
        processor.handle(&test_event("abc_cat.jpg")).await;

        let records = derivatives.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DerivativeStatus::Success);
    }
}
