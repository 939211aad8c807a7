use crate::storage::MessageStore;
use std::sync::Arc;

/// Readiness checks for the management endpoints.
#[derive(Clone, Debug)]
pub struct HealthService {
    store: Arc<dyn MessageStore>,
}

impl HealthService {
    #[must_use]
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Probes the backing store.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable.
    pub async fn check_store(&self) -> anyhow::Result<()> {
        self.store.ping().await
    }
}
