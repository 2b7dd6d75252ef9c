use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

/// One message taken off the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub body: Vec<u8>,
}

/// A single named queue carrying opaque byte payloads with at-least-once
/// delivery.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Hand a payload to the transport. Returns once the transport has accepted it.
    async fn publish(&self, payload: &[u8]) -> Result<(), QueueError>;

    /// Wait for the next delivery. `Ok(None)` means the wait timed out with
    /// nothing to deliver.
    async fn receive(&self) -> Result<Option<Delivery>, QueueError>;

    /// Tell the transport the delivery was consumed and must not be redelivered.
    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;
}

/// Redis list used as a durable named queue.
///
/// Producers `LPUSH` onto `<name>`; the consumer moves the oldest entry onto
/// `<name>:processing` with `BRPOPLPUSH` and removes it from there on ack.
///
/// Connections are opened once in [`RedisQueue::connect`] and reused. The
/// blocking receive runs on its own connection so a long `BRPOPLPUSH` never
/// holds up publishes and acks queued behind it.
pub struct RedisQueue {
    conn: ConnectionManager,
    blocking: ConnectionManager,
    queue_key: String,
    processing_key: String,
    poll_timeout: Duration,
}

impl RedisQueue {
    pub async fn connect(
        redis_url: &str,
        name: &str,
        poll_timeout: Duration,
    ) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(QueueError::Redis)?;
        let conn = ConnectionManager::new(client.clone())
            .await
            .map_err(QueueError::Redis)?;
        let blocking = ConnectionManager::new(client)
            .await
            .map_err(QueueError::Redis)?;

        Ok(Self {
            conn,
            blocking,
            queue_key: name.to_string(),
            processing_key: processing_key(name),
            poll_timeout,
        })
    }

    pub fn name(&self) -> &str {
        &self.queue_key
    }

    /// Check Redis connectivity. Called once at startup and by health checks.
    pub async fn ensure_ready(&self) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Number of messages waiting to be received.
    pub async fn queue_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.conn.clone();
        let depth: u64 = conn.llen(&self.queue_key).await.map_err(QueueError::Redis)?;
        Ok(depth)
    }
}

fn processing_key(name: &str) -> String {
    format!("{name}:processing")
}

#[async_trait]
impl MessageQueue for RedisQueue {
    async fn publish(&self, payload: &[u8]) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(&self.queue_key, payload)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    async fn receive(&self) -> Result<Option<Delivery>, QueueError> {
        let mut conn = self.blocking.clone();
        let body: Option<Vec<u8>> = redis::cmd("BRPOPLPUSH")
            .arg(&self.queue_key)
            .arg(&self.processing_key)
            .arg(self.poll_timeout.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(QueueError::Redis)?;

        Ok(body.map(|body| Delivery { body }))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        conn.lrem::<_, _, ()>(&self.processing_key, 1, delivery.body.as_slice())
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Queue closed")]
    Closed,
}
