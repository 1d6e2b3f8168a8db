//! Vignette DB Library
//!
//! Metadata-store access for the pipeline: the `FileStore` and
//! `DerivativeStore` traits, their PostgreSQL implementations, and in-memory
//! implementations used by tests and local development.

pub mod derivatives;
pub mod files;
pub mod memory;

pub use derivatives::{DerivativeStore, PgDerivativeStore};
pub use files::{FileStore, PgFileStore};
pub use memory::{InMemoryDerivativeStore, InMemoryFileStore};

use sqlx::PgPool;
use vignette_core::AppError;

/// Run embedded migrations against the given pool.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
    Ok(())
}
