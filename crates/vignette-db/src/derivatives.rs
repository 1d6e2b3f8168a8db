use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vignette_core::models::{DerivativeRecord, DerivativeStatus};
use vignette_core::AppError;

/// Metadata-store access for thumbnail job records.
///
/// The worker is the sole writer; a record is created in `processing` before
/// any transform I/O and mutated exactly once more on completion.
#[async_trait]
pub trait DerivativeStore: Send + Sync {
    /// Persist a new job record.
    async fn create(&self, record: &DerivativeRecord) -> Result<(), AppError>;

    /// Look up a job record by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DerivativeRecord>, AppError>;

    /// All job records for one original, newest first. Duplicate event
    /// deliveries produce multiple records for the same key.
    async fn find_by_original_key(
        &self,
        original_storage_key: &str,
    ) -> Result<Vec<DerivativeRecord>, AppError>;

    /// Mark a job as succeeded.
    async fn mark_succeeded(&self, id: Uuid) -> Result<(), AppError>;

    /// Mark a job as failed with a reason.
    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), AppError>;
}

/// PostgreSQL-backed derivative store
#[derive(Clone)]
pub struct PgDerivativeStore {
    pool: PgPool,
}

impl PgDerivativeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<DerivativeRecord, AppError> {
        let status: DerivativeStatus = row
            .get::<String, _>("status")
            .parse()
            .map_err(|e| AppError::Internal(format!("Failed to parse derivative status: {}", e)))?;
        Ok(DerivativeRecord {
            id: row.get("id"),
            original_storage_key: row.get("original_storage_key"),
            derivative_storage_key: row.get("derivative_storage_key"),
            status,
            error_message: row.get("error_message"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl DerivativeStore for PgDerivativeStore {
    async fn create(&self, record: &DerivativeRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO thumbnails (
                id, original_storage_key, derivative_storage_key,
                status, error_message, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.original_storage_key)
        .bind(&record.derivative_storage_key)
        .bind(record.status.to_string())
        .bind(&record.error_message)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DerivativeRecord>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, original_storage_key, derivative_storage_key,
                   status, error_message, created_at, updated_at
            FROM thumbnails
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::record_from_row(&row)).transpose()
    }

    async fn find_by_original_key(
        &self,
        original_storage_key: &str,
    ) -> Result<Vec<DerivativeRecord>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, original_storage_key, derivative_storage_key,
                   status, error_message, created_at, updated_at
            FROM thumbnails
            WHERE original_storage_key = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(original_storage_key)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::record_from_row).collect()
    }

    async fn mark_succeeded(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE thumbnails
            SET status = 'success', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE thumbnails
            SET status = 'failed', error_message = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
