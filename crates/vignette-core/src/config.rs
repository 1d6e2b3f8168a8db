//! Configuration module
//!
//! Environment-driven configuration shared by the upload coordinator (API)
//! and the thumbnail worker. Both binaries read the same struct; each uses
//! the subset of fields it needs.

use std::env;

use crate::storage_types::StorageBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const PRESIGN_TTL_SECS: u64 = 15 * 60;
const THUMBNAIL_WIDTH: u32 = 320;
const THUMBNAIL_HEIGHT: u32 = 240;
const EVENT_BLOCK_MS: u64 = 5000;
const CALLBACK_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 25;

/// Application configuration for both services.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    // Metadata store
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Object store
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Event channel
    pub redis_url: String,
    pub upload_events_stream: String,
    pub consumer_group: String,
    pub consumer_name: Option<String>,
    pub event_block_ms: u64,
    // Upload coordinator
    pub presign_ttl_seconds: u64,
    pub max_upload_size_bytes: usize,
    // Thumbnail worker
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub callback_url: String,
    pub callback_timeout_seconds: u64,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| s.parse::<StorageBackend>().ok())
            .unwrap_or(StorageBackend::S3);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok().or(env::var("AWS_REGION").ok()),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            upload_events_stream: env::var("UPLOAD_EVENTS_STREAM")
                .unwrap_or_else(|_| "upload-events".to_string()),
            consumer_group: env::var("UPLOAD_EVENTS_CONSUMER_GROUP")
                .unwrap_or_else(|_| "thumbnail-workers".to_string()),
            consumer_name: env::var("CONSUMER_NAME").ok().filter(|s| !s.is_empty()),
            event_block_ms: env::var("EVENT_BLOCK_MS")
                .unwrap_or_else(|_| EVENT_BLOCK_MS.to_string())
                .parse()
                .unwrap_or(EVENT_BLOCK_MS),
            presign_ttl_seconds: env::var("PRESIGN_TTL_SECONDS")
                .unwrap_or_else(|_| PRESIGN_TTL_SECS.to_string())
                .parse()
                .unwrap_or(PRESIGN_TTL_SECS),
            max_upload_size_bytes: env::var("MAX_UPLOAD_SIZE_MB")
                .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_UPLOAD_SIZE_MB)
                * 1024
                * 1024,
            thumbnail_width: env::var("THUMBNAIL_WIDTH")
                .unwrap_or_else(|_| THUMBNAIL_WIDTH.to_string())
                .parse()
                .unwrap_or(THUMBNAIL_WIDTH),
            thumbnail_height: env::var("THUMBNAIL_HEIGHT")
                .unwrap_or_else(|_| THUMBNAIL_HEIGHT.to_string())
                .parse()
                .unwrap_or(THUMBNAIL_HEIGHT),
            callback_url: env::var("THUMBNAIL_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:4000/callbacks/thumbnails".to_string()),
            callback_timeout_seconds: env::var("CALLBACK_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CALLBACK_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CALLBACK_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_WIDTH and THUMBNAIL_HEIGHT must be greater than zero"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
