use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::THUMBNAIL_KEY_PREFIX;

/// Compute the derivative storage key for an original storage key.
///
/// This is a pure string function rather than a stored mapping: repeated jobs
/// for the same original always target the same key, so redelivered events
/// overwrite rather than accumulate.
pub fn thumbnail_key(original_storage_key: &str) -> String {
    format!("{}{}", THUMBNAIL_KEY_PREFIX, original_storage_key)
}

/// Processing status of a thumbnail job.
///
/// A job is created in `Processing` before any I/O happens. `Success` and
/// `Failed` are terminal; failed jobs are not retried automatically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeStatus {
    Processing,
    Success,
    Failed,
}

impl Display for DerivativeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DerivativeStatus::Processing => write!(f, "processing"),
            DerivativeStatus::Success => write!(f, "success"),
            DerivativeStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for DerivativeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(DerivativeStatus::Processing),
            "success" => Ok(DerivativeStatus::Success),
            "failed" => Ok(DerivativeStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid derivative status: {}", s)),
        }
    }
}

/// One thumbnail job for one original object.
///
/// A duplicate event delivery creates a second, independent record for the
/// same original; both write the same derivative key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivativeRecord {
    pub id: Uuid,
    pub original_storage_key: String,
    pub derivative_storage_key: String,
    pub status: DerivativeStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DerivativeRecord {
    /// Create a new job record in `Processing` for the given original.
    pub fn processing(original_storage_key: String) -> Self {
        let now = Utc::now();
        let derivative_storage_key = thumbnail_key(&original_storage_key);
        Self {
            id: Uuid::new_v4(),
            original_storage_key,
            derivative_storage_key,
            status: DerivativeStatus::Processing,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Thumbnail job record as returned by lookup endpoints and posted to the
/// callback endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ThumbnailResponse {
    pub id: Uuid,
    pub original_storage_key: String,
    pub derivative_storage_key: String,
    pub status: DerivativeStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DerivativeRecord> for ThumbnailResponse {
    fn from(record: DerivativeRecord) -> Self {
        Self {
            id: record.id,
            original_storage_key: record.original_storage_key,
            derivative_storage_key: record.derivative_storage_key,
            status: record.status,
            error_message: record.error_message,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
