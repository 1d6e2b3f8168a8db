//! Event channel traits.
//!
//! The transport guarantees at-least-once delivery of each published event to
//! one consumer per group. Consumers must tolerate duplicates; ordering
//! across events is not guaranteed.

use async_trait::async_trait;

use crate::error::EventResult;

/// One delivered event, pending acknowledgement.
#[derive(Debug, Clone)]
pub struct EventDelivery {
    /// Transport-assigned delivery id (used for acknowledgement).
    pub id: String,
    /// Raw JSON payload as published.
    pub payload: String,
}

/// Publishing side of the event channel.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a payload to a topic. Returns once the transport has accepted
    /// the event; delivery to consumers is asynchronous.
    async fn publish(&self, topic: &str, payload: &str) -> EventResult<()>;
}

/// Consuming side of the event channel.
///
/// A consumer is bound to one (topic, consumer group, consumer name) at
/// construction time.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    /// Wait for the next event. Returns `None` when the wait times out with
    /// nothing delivered; callers loop.
    async fn next(&self) -> EventResult<Option<EventDelivery>>;

    /// Acknowledge a processed delivery. Events are acknowledged regardless
    /// of processing outcome; the outcome lives in the derivative record.
    async fn ack(&self, delivery: &EventDelivery) -> EventResult<()>;
}
