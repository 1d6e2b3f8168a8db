use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Upload lifecycle status of a file record.
///
/// The transition is monotonic: `Pending -> Uploaded`, exactly once.
/// Confirming an already-uploaded record is an error, not a no-op.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Pending,
    Uploaded,
}

impl Display for FileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileStatus::Pending => write!(f, "pending"),
            FileStatus::Uploaded => write!(f, "uploaded"),
        }
    }
}

impl FromStr for FileStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FileStatus::Pending),
            "uploaded" => Ok(FileStatus::Uploaded),
            _ => Err(anyhow::anyhow!("Invalid file status: {}", s)),
        }
    }
}

/// One logical uploaded object.
///
/// The storage key is assigned before any round trip to the object store, so
/// an issued upload credential always maps to exactly one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub storage_key: String,
    pub original_name: String,
    pub content_type: String,
    pub status: FileStatus,
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a new pending record for a freshly issued upload credential.
    pub fn pending(storage_key: String, original_name: String, content_type: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            storage_key,
            original_name,
            content_type,
            status: FileStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Create a record for an object the server itself has already written.
    pub fn uploaded(storage_key: String, original_name: String, content_type: String) -> Self {
        Self {
            status: FileStatus::Uploaded,
            ..Self::pending(storage_key, original_name, content_type)
        }
    }
}

/// Request to generate a presigned URL for direct upload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PresignUploadRequest {
    /// Original filename
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters"
    ))]
    pub filename: String,
    /// Content type (MIME type)
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
}

/// Response containing the presigned URL and upload information
#[derive(Debug, Serialize, ToSchema)]
pub struct PresignUploadResponse {
    /// File ID (used to confirm the upload)
    pub file_id: Uuid,
    /// Presigned URL for direct PUT upload
    pub upload_url: String,
    /// Storage key where the file will be stored
    pub storage_key: String,
    /// Credential lifetime in seconds
    pub expires_in_seconds: u64,
}

/// Response after confirming an upload
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmUploadResponse {
    pub file_id: Uuid,
    pub storage_key: String,
    pub status: FileStatus,
}

impl From<FileRecord> for ConfirmUploadResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            file_id: record.id,
            storage_key: record.storage_key,
            status: record.status,
        }
    }
}

/// Full file record as returned by lookup endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: Uuid,
    pub storage_key: String,
    pub original_name: String,
    pub content_type: String,
    pub status: FileStatus,
    pub created_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            storage_key: record.storage_key,
            original_name: record.original_name,
            content_type: record.content_type,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_status_display() {
        assert_eq!(FileStatus::Pending.to_string(), "pending");
        assert_eq!(FileStatus::Uploaded.to_string(), "uploaded");
    }

    #[test]
    fn test_file_status_from_str() {
        assert_eq!("pending".parse::<FileStatus>().unwrap(), FileStatus::Pending);
        assert_eq!(
            "uploaded".parse::<FileStatus>().unwrap(),
            FileStatus::Uploaded
        );
        assert!("confirmed".parse::<FileStatus>().is_err());
    }

    #[test]
    fn test_pending_record_starts_pending() {
        let record = FileRecord::pending(
            "abc_cat.jpg".to_string(),
            "cat.jpg".to_string(),
            "image/jpeg".to_string(),
        );
        assert_eq!(record.status, FileStatus::Pending);
        assert_eq!(record.storage_key, "abc_cat.jpg");
    }

    #[test]
    fn test_uploaded_record_starts_uploaded() {
        let record = FileRecord::uploaded(
            "abc_cat.jpg".to_string(),
            "cat.jpg".to_string(),
            "image/jpeg".to_string(),
        );
        assert_eq!(record.status, FileStatus::Uploaded);
    }

    #[test]
    fn test_presign_request_validation() {
        let ok = PresignUploadRequest {
            filename: "cat.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = PresignUploadRequest {
            filename: String::new(),
            content_type: "image/jpeg".to_string(),
        };
        assert!(empty.validate().is_err());
    }
}
