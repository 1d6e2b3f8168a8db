use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vignette_core::models::{FileRecord, FileStatus};
use vignette_core::AppError;

/// Metadata-store access for file records.
///
/// The coordinator is the sole writer of file records; status writes are
/// unconditional (no optimistic-concurrency check).
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist a new record.
    async fn create(&self, record: &FileRecord) -> Result<(), AppError>;

    /// Look up a record by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, AppError>;

    /// Set a record's status to `uploaded`.
    async fn mark_uploaded(&self, id: Uuid) -> Result<(), AppError>;
}

/// PostgreSQL-backed file store
#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn create(&self, record: &FileRecord) -> Result<(), AppError> {
        // Dynamic SQLx queries to avoid requiring DATABASE_URL at build time
        sqlx::query(
            r#"
            INSERT INTO files (id, storage_key, original_name, content_type, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(&record.storage_key)
        .bind(&record.original_name)
        .bind(&record.content_type)
        .bind(record.status.to_string())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, storage_key, original_name, content_type, status, created_at
            FROM files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let status: FileStatus = row
                .get::<String, _>("status")
                .parse()
                .map_err(|e| AppError::Internal(format!("Failed to parse file status: {}", e)))?;
            Ok(FileRecord {
                id: row.get("id"),
                storage_key: row.get("storage_key"),
                original_name: row.get("original_name"),
                content_type: row.get("content_type"),
                status,
                created_at: row.get("created_at"),
            })
        })
        .transpose()
    }

    async fn mark_uploaded(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE files
            SET status = 'uploaded'
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
