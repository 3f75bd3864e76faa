//! Error types for the live hub.

use thiserror::Error;

/// Errors produced while serving live viewers.
///
/// None of these ever reach the HTTP layer; they end the unit of work that
/// produced them (one broadcast or one connection) and are logged.
#[derive(Error, Debug)]
pub enum HubError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Send timed out after {0:?}")]
    SendTimeout(std::time::Duration),

    #[error("Connection closed")]
    Closed,
}

/// Result type for hub operations.
pub type HubResult<T> = Result<T, HubError>;

impl HubError {
    /// Create a send error from any displayable transport error.
    pub fn send(err: impl std::fmt::Display) -> Self {
        Self::Send(err.to_string())
    }
}
