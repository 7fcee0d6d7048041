//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while parsing a client message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed JSON message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Control message without a direction")]
    MissingDirection,

    #[error("Unknown direction: {0:?}")]
    InvalidDirection(String),
}
