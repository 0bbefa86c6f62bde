//! Centralized error types for KGQA.

use thiserror::Error;

/// Main error type for KGQA operations.
#[derive(Error, Debug)]
pub enum KgqaError {
    /// An intent definition is missing required fields or names an unknown strategy.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No entry nodes supplied: traversal needs at least one anchor")]
    NoEntryNodes,

    #[error("Strategy '{strategy}' needs at least {required} distinct entry nodes, found {found}")]
    InsufficientEntryNodes {
        strategy: String,
        required: usize,
        found: usize,
    },

    #[error("Graph store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for KGQA operations.
pub type KgqaResult<T> = Result<T, KgqaError>;

impl KgqaError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Wrap a graph store failure, keeping the full cause chain in the message.
    pub fn store_unavailable(err: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}
