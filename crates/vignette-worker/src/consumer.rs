//! Consumer loop.
//!
//! Blocks on event arrival and processes one event at a time per instance;
//! scale-out happens by running more worker instances in the same consumer
//! group. Every delivery is acknowledged regardless of processing outcome,
//! so a poisoned event fails its job record instead of wedging the stream.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use vignette_core::UploadEvent;
use vignette_events::EventConsumer;

use crate::processor::ThumbnailProcessor;

/// Backoff when a poll returns no event (the Redis consumer already blocks
/// server-side; this mainly keeps the in-memory channel from spinning).
const IDLE_BACKOFF_MS: u64 = 200;
/// Backoff after a channel error before reconnecting.
const ERROR_BACKOFF_MS: u64 = 5000;

/// Handle to a spawned worker loop.
pub struct ThumbnailWorker {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl ThumbnailWorker {
    /// Spawn the consumer loop on the current runtime.
    pub fn spawn(consumer: Arc<dyn EventConsumer>, processor: Arc<ThumbnailProcessor>) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            run_loop(consumer, processor, shutdown_rx).await;
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signal the loop to stop and wait for it to finish.
    pub async fn shutdown(self) {
        tracing::info!("Initiating thumbnail worker shutdown");
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.handle.await;
    }
}

async fn run_loop(
    consumer: Arc<dyn EventConsumer>,
    processor: Arc<ThumbnailProcessor>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    tracing::info!("Thumbnail worker started");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("Thumbnail worker shutting down");
                break;
            }
            result = consumer.next() => {
                match result {
                    Ok(Some(delivery)) => {
                        match serde_json::from_str::<UploadEvent>(&delivery.payload) {
                            Ok(event) => processor.handle(&event).await,
                            Err(e) => {
                                tracing::warn!(
                                    delivery_id = %delivery.id,
                                    error = %e,
                                    "Discarding malformed event payload"
                                );
                            }
                        }
                        if let Err(e) = consumer.ack(&delivery).await {
                            tracing::error!(
                                delivery_id = %delivery.id,
                                error = %e,
                                "Failed to acknowledge event"
                            );
                        }
                    }
                    Ok(None) => {
                        sleep(Duration::from_millis(IDLE_BACKOFF_MS)).await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Event channel poll failed");
                        sleep(Duration::from_millis(ERROR_BACKOFF_MS)).await;
                    }
                }
            }
        }
    }

    tracing::info!("Thumbnail worker stopped");
}
