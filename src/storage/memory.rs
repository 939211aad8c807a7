use crate::domain::message::Message;
use crate::storage::MessageStore;
use anyhow::Context;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// In-process message store for deployments and tests that run without
/// Redis. Contents do not survive a restart.
///
/// Native per-key TTL is emulated with a deadline per entry: reads drop
/// expired entries on contact, and a periodic sweep evicts the ones nobody
/// asks for. Either way, an expired record is indistinguishable from one
/// that never existed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredEntry>,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    record: Message,
    deadline: Instant,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Spawns the sweep loop that evicts expired entries until shutdown.
    pub fn spawn_sweeper(self: &Arc<Self>, interval_secs: u64, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            while !*shutdown.borrow() {
                tokio::select! {
                    _ = interval.tick() => {
                        let swept = store.sweep(Instant::now());
                        if swept > 0 {
                            tracing::debug!(swept, "Evicted expired messages");
                        }
                    }
                    _ = shutdown.changed() => {}
                }
            }
            tracing::info!("Sweep loop shutting down...");
        })
    }

    /// Number of resident entries, counting expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.deadline > now);
        before - self.entries.len()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn put(&self, record: &Message, ttl_secs: i64) -> anyhow::Result<()> {
        debug_assert!(!record.id.is_empty());
        debug_assert!(ttl_secs > 0);
        let ttl = u64::try_from(ttl_secs).context("ttl must be strictly positive")?;
        let deadline = Instant::now() + Duration::from_secs(ttl);
        self.entries.insert(record.id.clone(), StoredEntry { record: record.clone(), deadline });
        Ok(())
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Message>> {
        let Some(entry) = self.entries.get(id) else {
            return Ok(None);
        };
        if entry.deadline <= Instant::now() {
            // Guard must be released before mutating the map.
            drop(entry);
            self.entries.remove(id);
            return Ok(None);
        }
        Ok(Some(entry.record.clone()))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
