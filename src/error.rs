//! Error types for array state containers.

use thiserror::Error;

/// Main error type for container operations.
#[derive(Debug, Error)]
pub enum ArrayStateError {
    #[error("Index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Subscription dropped")]
    SubscriptionDropped,
}

impl From<serde_json::Error> for ArrayStateError {
    fn from(e: serde_json::Error) -> Self {
        ArrayStateError::Serialization(e.to_string())
    }
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, ArrayStateError>;
