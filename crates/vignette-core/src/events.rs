//! Event contracts between the upload coordinator and the thumbnail worker.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::FileRecord;

/// Wire payload published when an upload is confirmed.
///
/// This is the only contract between the coordinator and the worker; the
/// worker needs the storage key to fetch the original and the rest is
/// carried along for logging and the derivative record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadEvent {
    pub file_id: Uuid,
    pub storage_key: String,
    pub original_name: String,
    pub content_type: String,
}

impl From<&FileRecord> for UploadEvent {
    fn from(record: &FileRecord) -> Self {
        Self {
            file_id: record.id,
            storage_key: record.storage_key.clone(),
            original_name: record.original_name.clone(),
            content_type: record.content_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_round_trips_through_json() {
        let event = UploadEvent {
            file_id: Uuid::new_v4(),
            storage_key: "abc_cat.jpg".to_string(),
            original_name: "cat.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: UploadEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_event_from_file_record() {
        let record = FileRecord::pending(
            "abc_cat.jpg".to_string(),
            "cat.jpg".to_string(),
            "image/jpeg".to_string(),
        );
        let event = UploadEvent::from(&record);
        assert_eq!(event.file_id, record.id);
        assert_eq!(event.storage_key, record.storage_key);
    }
}
