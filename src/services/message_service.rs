use crate::config::MessageConfig;
use crate::domain::id::generate_id;
use crate::domain::message::Message;
use crate::error::{AppError, Result};
use crate::storage::MessageStore;
use opentelemetry::{
    KeyValue, global,
    metrics::Counter,
};
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct Metrics {
    stored_total: Counter<u64>,
    fetched_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("vanish-server");
        Self {
            stored_total: meter
                .u64_counter("vanish_messages_stored_total")
                .with_description("Total messages handed to the store")
                .build(),
            fetched_total: meter
                .u64_counter("vanish_messages_fetched_total")
                .with_description("Total message fetch attempts")
                .build(),
        }
    }
}

/// Owns the message lifecycle: validation policy, identifier generation,
/// validity-window computation, and the read/write contract with the store.
#[derive(Clone, Debug)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    config: MessageConfig,
    root_path: String,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(store: Arc<dyn MessageStore>, config: MessageConfig, root_path: &str) -> Self {
        let root_path =
            if root_path.ends_with('/') { root_path.to_string() } else { format!("{root_path}/") };
        Self { store, config, root_path, metrics: Metrics::new() }
    }

    /// Creates a message: validates the raw input, assembles the record with
    /// its validity window, and hands it to the store for TTL-bound
    /// persistence.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the raw length is out of bounds or
    /// the expiry override is not strictly positive.
    /// Returns `AppError::Storage` if the record cannot be persisted.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, raw_message),
        fields(length = raw_message.chars().count())
    )]
    pub async fn create(&self, raw_message: &str, expiry_override: Option<i64>) -> Result<Message> {
        // Length policy applies to the raw input, before escaping.
        let length = raw_message.chars().count();
        if length < self.config.min_length || length > self.config.max_length {
            return Err(AppError::Validation(format!(
                "message must contain between {} and {} characters",
                self.config.min_length, self.config.max_length
            )));
        }

        let validity_secs = match expiry_override {
            Some(secs) if secs <= 0 => {
                return Err(AppError::Validation("test_expiry must be a positive number of seconds".to_string()));
            }
            Some(secs) => secs,
            None => self.config.validity_secs,
        };

        let id = generate_id(self.config.id_length);
        let created = OffsetDateTime::now_utc().unix_timestamp();
        let record = Message {
            url: format!("{}{id}", self.root_path),
            id,
            created,
            expires: created + validity_secs,
            message: html_escape::encode_safe(raw_message).into_owned(),
        };

        match self.store.put(&record, validity_secs).await {
            Ok(()) => {
                tracing::debug!(id = %record.id, expires = record.expires, "Message stored");
                self.metrics.stored_total.add(1, &[KeyValue::new("status", "success")]);
                Ok(record)
            }
            Err(e) => {
                self.metrics.stored_total.add(1, &[KeyValue::new("status", "failure")]);
                Err(AppError::Storage(e))
            }
        }
    }

    /// Fetches a message by id. Expired and never-issued identifiers are
    /// deliberately indistinguishable.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the record is absent.
    /// Returns `AppError::Storage` on backend failure; absence is never
    /// fabricated from an infrastructure error.
    #[tracing::instrument(err(level = "debug"), skip(self, id))]
    pub async fn fetch(&self, id: &str) -> Result<Message> {
        match self.store.get(id).await.map_err(AppError::Storage)? {
            Some(record) => {
                self.metrics.fetched_total.add(1, &[KeyValue::new("status", "hit")]);
                Ok(record)
            }
            None => {
                self.metrics.fetched_total.add(1, &[KeyValue::new("status", "miss")]);
                Err(AppError::NotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    fn test_config() -> MessageConfig {
        MessageConfig { id_length: 32, min_length: 1, max_length: 100, validity_secs: 600 }
    }

    fn setup_service() -> MessageService {
        MessageService::new(MemoryStore::new(), test_config(), "/")
    }

    #[tokio::test]
    async fn create_then_fetch_roundtrips() {
        let service = setup_service();
        let created = service.create("hello world this is fine", None).await.expect("create failed");

        assert_eq!(created.id.len(), 32);
        assert_eq!(created.expires, created.created + 600);
        assert_eq!(created.url, format!("/{}", created.id));

        let fetched = service.fetch(&created.id).await.expect("fetch failed");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn content_is_html_escaped() {
        let service = setup_service();
        let created = service.create("<script>alert('hi')</script>", None).await.expect("create failed");
        assert!(created.message.starts_with("&lt;script&gt;"));
        assert!(!created.message.contains('<'));
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let service = setup_service();
        let err = service.create("", None).await.expect_err("expected validation error");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn oversized_message_is_rejected() {
        let service = setup_service();
        let raw = "a".repeat(101);
        let err = service.create(&raw, None).await.expect_err("expected validation error");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn length_policy_counts_characters_not_bytes() {
        let service = setup_service();
        // 100 two-byte characters stay within a 100-character bound.
        let raw = "é".repeat(100);
        assert!(service.create(&raw, None).await.is_ok());
    }

    #[tokio::test]
    async fn expiry_override_shrinks_the_window() {
        let service = setup_service();
        let created = service.create("short-lived", Some(3)).await.expect("create failed");
        assert_eq!(created.ttl_secs(), 3);
    }

    #[tokio::test]
    async fn non_positive_expiry_override_is_rejected() {
        let service = setup_service();
        for bad in [0, -1, -600] {
            let err = service.create("still valid", Some(bad)).await.expect_err("expected validation error");
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn rejected_message_is_not_persisted() {
        let store = MemoryStore::new();
        let service = MessageService::new(Arc::clone(&store) as Arc<dyn MessageStore>, test_config(), "/");
        let _ = service.create("", None).await;
        let _ = service.create("fine", Some(-1)).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn fetch_of_unknown_id_is_not_found() {
        let service = setup_service();
        let err = service.fetch("never-issued").await.expect_err("expected not found");
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn root_path_is_normalized() {
        let service = MessageService::new(MemoryStore::new(), test_config(), "/notes");
        let created = service.create("hello", None).await.expect("create failed");
        assert!(created.url.starts_with("/notes/"));
    }
}
