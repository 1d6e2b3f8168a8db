use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use vignette_api::routes::setup_routes;
use vignette_api::services::UploadService;
use vignette_api::state::AppState;
use vignette_core::Config;
use vignette_db::{PgDerivativeStore, PgFileStore};
use vignette_events::RedisEventPublisher;
use vignette_storage::create_storage;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    vignette_infra::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await?;
    vignette_db::run_migrations(&pool).await?;

    let storage = create_storage(&config).await?;
    let files = Arc::new(PgFileStore::new(pool.clone()));
    let derivatives = Arc::new(PgDerivativeStore::new(pool));
    let events = Arc::new(RedisEventPublisher::new(&config.redis_url)?);

    let uploads = UploadService::new(
        files.clone(),
        storage.clone(),
        events,
        config.upload_events_stream.clone(),
        Duration::from_secs(config.presign_ttl_seconds),
    );

    let state = Arc::new(AppState {
        uploads,
        files,
        derivatives,
        storage,
        max_upload_size_bytes: config.max_upload_size_bytes,
    });

    let router = setup_routes(&config, state)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server_port)).await?;
    tracing::info!(
        port = config.server_port,
        environment = %config.environment,
        "Starting vignette API"
    );
    axum::serve(listener, router).await?;

    Ok(())
}
