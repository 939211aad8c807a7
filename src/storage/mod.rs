use crate::config::{StoreBackend, StoreConfig};
use crate::domain::message::Message;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub mod memory;
pub mod redis;

/// The time-bounded key-value record abstraction the message lifecycle is
/// built on. Implementations must enforce expiry themselves; the application
/// never re-checks it.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Persists the whole record under its id with an expiry of `ttl_secs`
    /// from now. A same-id overwrite is accepted risk, not guarded against.
    ///
    /// # Errors
    /// Any backend failure must surface here; it must never turn into a
    /// false "absent" on a later read.
    async fn put(&self, record: &Message, ttl_secs: i64) -> anyhow::Result<()>;

    /// Returns the record if present and unexpired. "Never existed" and
    /// "expired" both come back as `None` and are indistinguishable.
    ///
    /// # Errors
    /// Returns an error on backend failure or timeout, never `None`.
    async fn get(&self, id: &str) -> anyhow::Result<Option<Message>>;

    /// Connectivity probe for readiness checks.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable.
    async fn ping(&self) -> anyhow::Result<()>;
}

/// Connects the configured backend and spawns any background tasks it needs.
///
/// # Errors
/// Returns an error if the backend is unreachable.
pub async fn init_store(
    config: &StoreConfig,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<(Arc<dyn MessageStore>, Vec<JoinHandle<()>>)> {
    match config.backend {
        StoreBackend::Redis => {
            let store = redis::RedisStore::connect(config).await?;
            Ok((Arc::new(store), Vec::new()))
        }
        StoreBackend::Memory => {
            let store = memory::MemoryStore::new();
            let sweeper = store.spawn_sweeper(config.sweep_interval_secs, shutdown);
            Ok((store, vec![sweeper]))
        }
    }
}
