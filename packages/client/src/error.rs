//! Client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the upgrade; retrying will not help.
    #[error("server rejected the connection with HTTP {0}")]
    Rejected(u16),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

impl ClientError {
    /// Whether reconnecting may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::ConnectionError(_))
    }
}
