//! # Query Errors
//!
//! Error types for descriptor construction, criteria merging and realization.

use serde_json::Value;
use thiserror::Error;

/// Boxed error produced by an injected capability (loader or merge function)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query descriptor errors
#[derive(Debug, Error)]
pub enum QueryError {
    /// A required constructor argument is missing or invalid
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The merge function supplied to `add_criteria` failed
    #[error("Criteria merge failed: {0}")]
    Merge(#[source] BoxError),

    /// The loader failed while realizing the query
    #[error("Realization failed: {0}")]
    Realization(#[source] BoxError),
}

impl QueryError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Get a stable error code for logs and callers
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Merge(_) => "MERGE_FAILED",
            Self::Realization(_) => "REALIZATION_FAILED",
        }
    }

    /// Borrow the capability error carried by merge and realization failures
    pub fn capability_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::Merge(e) | Self::Realization(e) => Some(e.as_ref()),
        }
    }
}

/// Conflict raised by [`crate::query::merge::strict`]
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Conflicting values for criteria key '{key}': {current} vs {incoming}")]
pub struct MergeConflict {
    pub key: String,
    pub current: Value,
    pub incoming: Value,
}
