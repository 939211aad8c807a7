use serde::Deserialize;

/// Request body for posting a new message.
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub message: String,
}

/// Query parameters accepted by the posting endpoint.
#[derive(Debug, Deserialize)]
pub struct PostQuery {
    /// Overrides the configured validity window, in seconds. Exists so
    /// expiry behavior can be exercised with short-lived messages.
    pub test_expiry: Option<i64>,
}
