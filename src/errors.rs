//! # Temporal Errors
//!
//! Crate-wide failure vocabulary. Read outcomes such as "no data recorded"
//! or "deleted at that time" are values of [`crate::resolver::Resolution`],
//! not errors.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for temporal operations
pub type TemporalResult<T> = Result<T, TemporalError>;

/// Temporal versioning errors
#[derive(Debug, Clone, Error)]
pub enum TemporalError {
    /// Request rejected before any state was touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// Optimistic concurrency retries exhausted
    #[error("Concurrent modification of {key} not resolved after {attempts} attempts")]
    Conflict { key: String, attempts: u32 },

    /// Failure reported by the document store adapter
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Ledger or configuration document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TemporalError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "TEMPORAL_VALIDATION",
            Self::Conflict { .. } => "TEMPORAL_CONFLICT",
            Self::Store(_) => "TEMPORAL_STORE",
            Self::Serialization(_) => "TEMPORAL_SERIALIZATION",
            Self::Internal(_) => "TEMPORAL_INTERNAL",
        }
    }

    /// Whether the caller may retry the whole operation
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Conflict { .. } | Self::Store(StoreError::Conflict { .. })
        )
    }

    /// True when this error is a store-level version mismatch
    pub(crate) fn is_store_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::Conflict { .. }))
    }
}

impl From<serde_json::Error> for TemporalError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
