use thiserror::Error;

/// Event channel operation errors
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed delivery: {0}")]
    MalformedDelivery(String),
}

/// Result type for event channel operations
pub type EventResult<T> = Result<T, EventError>;
