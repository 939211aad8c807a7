use crate::config::StoreConfig;
use crate::domain::message::Message;
use crate::storage::MessageStore;
use anyhow::Context;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;

const KEY_PREFIX: &str = "msg:";

/// Message store backed by Redis. Expiry is delegated to the engine's native
/// per-key TTL (`SET ... EX`); no sweeping happens on this side.
#[derive(Debug, Clone)]
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
    op_timeout: Duration,
}

impl RedisStore {
    /// Opens a multiplexed connection to the configured Redis instance.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn connect(config: &StoreConfig) -> anyhow::Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let conn = client.get_connection_manager().await.context("failed to connect to redis")?;
        Ok(Self { conn, op_timeout: Duration::from_secs(config.op_timeout_secs) })
    }

    fn key(id: &str) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    // A store operation that outlives its deadline is an infrastructure
    // failure; it must never read as an absent record.
    async fn with_timeout<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = redis::RedisResult<T>> + Send,
    ) -> anyhow::Result<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.with_context(|| format!("redis {op} failed")),
            Err(_) => anyhow::bail!("redis {op} timed out after {:?}", self.op_timeout),
        }
    }
}

#[async_trait]
impl MessageStore for RedisStore {
    async fn put(&self, record: &Message, ttl_secs: i64) -> anyhow::Result<()> {
        debug_assert!(!record.id.is_empty());
        debug_assert!(ttl_secs > 0);
        let ttl = u64::try_from(ttl_secs).context("ttl must be strictly positive")?;
        let payload = serde_json::to_string(record)?;
        let key = Self::key(&record.id);
        let mut conn = self.conn.clone();
        self.with_timeout("set", async move { conn.set_ex::<_, _, ()>(key, payload, ttl).await }).await
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Message>> {
        let key = Self::key(id);
        let mut conn = self.conn.clone();
        let payload: Option<String> = self.with_timeout("get", async move { conn.get(key).await }).await?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json).context("stored record failed to deserialize")?)),
            None => Ok(None),
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        self.with_timeout("ping", async move { redis::cmd("PING").query_async::<String>(&mut conn).await }).await?;
        Ok(())
    }
}
