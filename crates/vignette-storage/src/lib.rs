//! Vignette Storage Library
//!
//! Object-store abstraction used by the upload coordinator and the thumbnail
//! worker. It includes the `Storage` trait and implementations for S3 and the
//! local filesystem.
//!
//! # Storage key format
//!
//! Upload keys are generated once, at credential-issue time, as
//! `{uuid}_{sanitized original name}` (see the `keys` module) and never
//! reused. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use vignette_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
