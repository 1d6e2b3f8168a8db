//! Application state.
//!
//! All collaborators are trait objects injected at startup, so tests can wire
//! in-memory implementations without touching the router.

use std::sync::Arc;

use vignette_db::{DerivativeStore, FileStore};
use vignette_storage::Storage;

use crate::services::UploadService;

pub struct AppState {
    pub uploads: UploadService,
    pub files: Arc<dyn FileStore>,
    pub derivatives: Arc<dyn DerivativeStore>,
    pub storage: Arc<dyn Storage>,
    pub max_upload_size_bytes: usize,
}
