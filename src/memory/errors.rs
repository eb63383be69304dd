//! # In-Memory Loader Errors

use thiserror::Error;

/// Result type for in-memory loader operations
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Errors raised by [`super::InMemoryLoader`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The execution context lacks the required credential
    #[error("Unauthorized: execution context is missing '{0}'")]
    Unauthorized(String),

    /// A criteria entry cannot be evaluated
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    /// A writer panicked while holding the collection lock
    #[error("Collection store lock poisoned")]
    Poisoned,
}

impl MemoryError {
    /// Whether the caller can fix this by changing the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, MemoryError::Poisoned)
    }
}
