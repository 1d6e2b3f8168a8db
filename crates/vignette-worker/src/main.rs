use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use vignette_core::Config;
use vignette_db::PgDerivativeStore;
use vignette_events::RedisEventConsumer;
use vignette_infra::HttpCallbackNotifier;
use vignette_processing::ThumbnailSpec;
use vignette_storage::create_storage;
use vignette_worker::{ThumbnailProcessor, ThumbnailWorker};

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
    let derivatives = Arc::new(PgDerivativeStore::new(pool));

    let consumer_name = config.consumer_name.clone().unwrap_or_else(|| {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "thumbnail-worker".to_string())
    });
    let consumer = RedisEventConsumer::new(
        &config.redis_url,
        config.upload_events_stream.clone(),
        config.consumer_group.clone(),
        consumer_name.clone(),
        config.event_block_ms,
    )?;
    consumer.init().await?;

    let notifier = Arc::new(HttpCallbackNotifier::new(
        config.callback_url.clone(),
        config.callback_timeout_seconds,
    )?);

    let processor = Arc::new(ThumbnailProcessor::new(
        storage,
        derivatives,
        notifier,
        ThumbnailSpec {
            width: config.thumbnail_width,
            height: config.thumbnail_height,
        },
    ));

    tracing::info!(
        stream = %config.upload_events_stream,
        group = %config.consumer_group,
        consumer = %consumer_name,
        thumbnail_width = config.thumbnail_width,
        thumbnail_height = config.thumbnail_height,
        "Starting thumbnail worker"
    );

    let worker = ThumbnailWorker::spawn(Arc::new(consumer), processor);

    tokio::signal::ctrl_c().await?;
    worker.shutdown().await;

    Ok(())
}
