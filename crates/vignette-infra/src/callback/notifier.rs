use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use vignette_core::models::DerivativeRecord;

/// Delivery side of the completion callback.
#[async_trait]
pub trait CallbackNotifier: Send + Sync {
    /// POST the record to the configured endpoint once. Returns the HTTP
    /// status code of the response.
    async fn notify(&self, record: &DerivativeRecord) -> Result<u16>;
}

/// HTTP callback notifier
#[derive(Clone)]
pub struct HttpCallbackNotifier {
    http_client: Client,
    url: String,
}

impl HttpCallbackNotifier {
    pub fn new(url: String, timeout_seconds: u64) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create HTTP client for callbacks")?;

        Ok(Self { http_client, url })
    }
}

#[async_trait]
impl CallbackNotifier for HttpCallbackNotifier {
    #[tracing::instrument(skip(self, record), fields(derivative_id = %record.id))]
    async fn notify(&self, record: &DerivativeRecord) -> Result<u16> {
        let response = self
            .http_client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .context("Callback request failed")?;

        let status = response.status().as_u16();

        tracing::info!(
            derivative_id = %record.id,
            url = %self.url,
            status = status,
            "Thumbnail callback delivered"
        );

        Ok(status)
    }
}
