//! Error types for the persist crate.

use thiserror::Error;

/// Errors a sink can report for an append.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink has not finished initializing.
    #[error("sink is not initialized")]
    NotInitialized,

    /// The sink refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
