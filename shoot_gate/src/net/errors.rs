//! Network error types for serialization and protocol operations.

use thiserror::Error;

/// Errors that can occur while encoding or decoding a frame.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Failed to encode a message
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failed to decode a message
    #[error("Failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    /// Frame payload wasn't valid text
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),
}

/// Result type for serialization operations
pub type Result<T> = std::result::Result<T, SerializationError>;
