//! Vignette Events Library
//!
//! Event-channel abstraction between the upload coordinator and the thumbnail
//! worker: `EventPublisher`/`EventConsumer` traits, a Redis Streams
//! implementation with consumer groups (at-least-once delivery, one consumer
//! per group per event), and an in-memory channel for tests and local runs.

pub mod error;
pub mod memory;
pub mod redis_channel;
pub mod traits;

pub use error::{EventError, EventResult};
pub use memory::InMemoryEventChannel;
pub use redis_channel::{RedisEventConsumer, RedisEventPublisher};
pub use traits::{EventConsumer, EventDelivery, EventPublisher};
