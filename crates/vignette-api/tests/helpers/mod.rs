//! Shared wiring for API tests: a router backed by in-memory stores, mock
//! storage, and an in-memory event channel.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use vignette_api::routes::setup_routes;
use vignette_api::services::UploadService;
use vignette_api::state::AppState;
use vignette_core::{Config, StorageBackend};
use vignette_db::{InMemoryDerivativeStore, InMemoryFileStore};
use vignette_events::InMemoryEventChannel;
use vignette_worker::test_helpers::MockStorage;

pub const TOPIC: &str = "upload-events";

pub struct TestApp {
    pub router: Router,
    pub files: Arc<InMemoryFileStore>,
    pub derivatives: Arc<InMemoryDerivativeStore>,
    pub storage: Arc<MockStorage>,
    pub channel: InMemoryEventChannel,
}

pub fn test_config() -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        database_url: "postgresql://localhost/vignette_test".to_string(),
        db_max_connections: 5,
        db_timeout_seconds: 5,
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: None,
        redis_url: "redis://localhost:6379".to_string(),
        upload_events_stream: TOPIC.to_string(),
        consumer_group: "thumbnail-workers".to_string(),
        consumer_name: None,
        event_block_ms: 100,
        presign_ttl_seconds: 900,
        max_upload_size_bytes: 5 * 1024 * 1024,
        thumbnail_width: 320,
        thumbnail_height: 240,
        callback_url: "http://localhost:9/callbacks/thumbnails".to_string(),
        callback_timeout_seconds: 1,
    }
}

pub fn test_app() -> TestApp {
    let files = Arc::new(InMemoryFileStore::new());
    let derivatives = Arc::new(InMemoryDerivativeStore::new());
    let storage = Arc::new(MockStorage::new());
    let channel = InMemoryEventChannel::new(TOPIC);

    let uploads = UploadService::new(
        files.clone(),
        storage.clone(),
        Arc::new(channel.clone()),
        TOPIC.to_string(),
        Duration::from_secs(900),
    );

    let state = Arc::new(AppState {
        uploads,
        files: files.clone(),
        derivatives: derivatives.clone(),
        storage: storage.clone(),
        max_upload_size_bytes: test_config().max_upload_size_bytes,
    });

    let router = setup_routes(&test_config(), state).expect("router setup failed");

    TestApp {
        router,
        files,
        derivatives,
        storage,
        channel,
    }
}
