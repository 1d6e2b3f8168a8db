//! Redis Streams event channel.
//!
//! Events are appended with `XADD` and consumed through a consumer group
//! (`XREADGROUP` + `XACK`), so each event is delivered to exactly one
//! consumer per group and redelivered if a consumer dies before
//! acknowledging (at-least-once).

use async_trait::async_trait;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::{EventError, EventResult};
use crate::traits::{EventConsumer, EventDelivery, EventPublisher};

/// Field name under which the JSON payload is stored in each stream entry.
const PAYLOAD_FIELD: &str = "payload";

/// Publishing side of the Redis Streams channel.
#[derive(Clone)]
pub struct RedisEventPublisher {
    client: redis::Client,
}

impl RedisEventPublisher {
    pub fn new(redis_url: &str) -> EventResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> EventResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let message_id: String = redis::cmd("XADD")
            .arg(topic)
            .arg("*")
            .arg(PAYLOAD_FIELD)
            .arg(payload)
            .query_async(&mut conn)
            .await?;

        debug!(topic = %topic, message_id = %message_id, "Published event");
        Ok(())
    }
}

/// Consuming side of the Redis Streams channel, bound to one
/// (stream, consumer group, consumer name).
#[derive(Clone)]
pub struct RedisEventConsumer {
    client: redis::Client,
    stream: String,
    group: String,
    consumer: String,
    block_ms: u64,
}

impl RedisEventConsumer {
    pub fn new(
        redis_url: &str,
        stream: String,
        group: String,
        consumer: String,
        block_ms: u64,
    ) -> EventResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            stream,
            group,
            consumer,
            block_ms,
        })
    }

    /// Create the consumer group if it does not exist yet.
    pub async fn init(&self) -> EventResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.stream)
            .arg(&self.group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => info!(
                stream = %self.stream,
                group = %self.group,
                "Created consumer group"
            ),
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(
                    stream = %self.stream,
                    group = %self.group,
                    "Consumer group already exists"
                );
            }
            Err(e) => return Err(EventError::Redis(e)),
        }

        Ok(())
    }
}

#[async_trait]
impl EventConsumer for RedisEventConsumer {
    async fn next(&self) -> EventResult<Option<EventDelivery>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let options = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .count(1)
            .block(self.block_ms as usize);

        let reply: StreamReadReply = conn
            .xread_options(&[self.stream.as_str()], &[">"], &options)
            .await?;

        let entry = reply
            .keys
            .into_iter()
            .flat_map(|key| key.ids)
            .next();

        let Some(entry) = entry else {
            return Ok(None);
        };

        let value = entry.map.get(PAYLOAD_FIELD).ok_or_else(|| {
            EventError::MalformedDelivery(format!(
                "Stream entry {} has no '{}' field",
                entry.id, PAYLOAD_FIELD
            ))
        })?;
        let payload: String = redis::from_redis_value(value)?;

        Ok(Some(EventDelivery {
            id: entry.id,
            payload,
        }))
    }

    async fn ack(&self, delivery: &EventDelivery) -> EventResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        redis::cmd("XACK")
            .arg(&self.stream)
            .arg(&self.group)
            .arg(&delivery.id)
            .query_async::<()>(&mut conn)
            .await?;

        redis::cmd("XDEL")
            .arg(&self.stream)
            .arg(&delivery.id)
            .query_async::<()>(&mut conn)
            .await?;

        debug!(delivery_id = %delivery.id, "Acknowledged event");
        Ok(())
    }
}
