//! In-memory store implementations.
//!
//! Used by tests and local development runs that have no PostgreSQL
//! available. Behavior mirrors the PostgreSQL stores, including the
//! unconditional status writes.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use vignette_core::models::{DerivativeRecord, DerivativeStatus, FileRecord, FileStatus};
use vignette_core::AppError;

use crate::{DerivativeStore, FileStore};

/// In-memory file store
#[derive(Clone, Default)]
pub struct InMemoryFileStore {
    records: Arc<Mutex<HashMap<Uuid, FileRecord>>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (for test assertions)
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn create(&self, record: &FileRecord) -> Result<(), AppError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn mark_uploaded(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(record) = self.records.lock().unwrap().get_mut(&id) {
            record.status = FileStatus::Uploaded;
        }
        Ok(())
    }
}

/// In-memory derivative store
#[derive(Clone, Default)]
pub struct InMemoryDerivativeStore {
    records: Arc<Mutex<HashMap<Uuid, DerivativeRecord>>>,
}

impl InMemoryDerivativeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (for test assertions)
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, in no particular order (for test assertions)
    pub fn all(&self) -> Vec<DerivativeRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl DerivativeStore for InMemoryDerivativeStore {
    async fn create(&self, record: &DerivativeRecord) -> Result<(), AppError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DerivativeRecord>, AppError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_original_key(
        &self,
        original_storage_key: &str,
    ) -> Result<Vec<DerivativeRecord>, AppError> {
        let mut records: Vec<DerivativeRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.original_storage_key == original_storage_key)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn mark_succeeded(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(record) = self.records.lock().unwrap().get_mut(&id) {
            record.status = DerivativeStatus::Success;
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), AppError> {
        if let Some(record) = self.records.lock().unwrap().get_mut(&id) {
            record.status = DerivativeStatus::Failed;
            record.error_message = Some(error_message.to_string());
            record.updated_at = Utc::now();
        }
        Ok(())
    }
}
