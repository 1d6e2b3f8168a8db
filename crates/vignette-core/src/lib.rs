//! Vignette Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! event contracts shared by the upload coordinator and the thumbnail worker.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use events::UploadEvent;
pub use storage_types::StorageBackend;
