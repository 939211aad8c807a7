use serde::{Deserialize, Serialize};

/// A single self-destructing message, exactly as persisted and as returned
/// to clients. Immutable once created; its disappearance is owned entirely
/// by the backing store's expiry mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// Seconds since epoch (UTC), set at write time.
    pub created: i64,
    /// Seconds since epoch (UTC); always strictly greater than `created`.
    pub expires: i64,
    /// HTML-escaped content.
    pub message: String,
    /// Retrieval path, derived from `id` and the configured root path.
    pub url: String,
}

impl Message {
    /// Width of the validity window in seconds.
    #[must_use]
    pub const fn ttl_secs(&self) -> i64 {
        self.expires - self.created
    }
}
