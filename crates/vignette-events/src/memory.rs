//! In-memory event channel.
//!
//! Delivers published payloads to a single shared queue per topic. Used by
//! tests and local runs without Redis; `next` never blocks, so callers are
//! expected to back off when it returns `None`.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::EventResult;
use crate::traits::{EventConsumer, EventDelivery, EventPublisher};

/// In-memory channel implementing both sides of the transport. Clones share
/// the same queues, so a cloned publisher feeds a cloned consumer.
#[derive(Clone, Default)]
pub struct InMemoryEventChannel {
    topics: Arc<Mutex<HashMap<String, VecDeque<EventDelivery>>>>,
    consume_topic: String,
    next_id: Arc<Mutex<u64>>,
}

impl InMemoryEventChannel {
    pub fn new(consume_topic: impl Into<String>) -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            consume_topic: consume_topic.into(),
            next_id: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of undelivered events on a topic (for test assertions)
    pub fn pending(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .unwrap()
            .get(topic)
            .map(|q| q.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventChannel {
    async fn publish(&self, topic: &str, payload: &str) -> EventResult<()> {
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            format!("{}-0", *next_id)
        };

        self.topics
            .lock()
            .unwrap()
            .entry(topic.to_string())
            .or_default()
            .push_back(EventDelivery {
                id,
                payload: payload.to_string(),
            });
        Ok(())
    }
}

#[async_trait]
impl EventConsumer for InMemoryEventChannel {
    async fn next(&self) -> EventResult<Option<EventDelivery>> {
        Ok(self
            .topics
            .lock()
            .unwrap()
            .get_mut(&self.consume_topic)
            .and_then(|q| q.pop_front()))
    }

    async fn ack(&self, _delivery: &EventDelivery) -> EventResult<()> {
        // Delivery already removed the event from the queue.
        Ok(())
    }
}
