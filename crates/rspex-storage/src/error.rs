//! Storage error types.

use rspex_domain::DomainError;
use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Subject not found.
    #[error("subject not found: {subject}")]
    SubjectNotFound { subject: String },

    /// Invalid input error.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Serialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },

    /// Concurrent writers kept replacing the subject between read and swap.
    #[error("update conflict on {subject} after {attempts} attempts")]
    UpdateConflict { subject: String, attempts: u32 },

    /// Malformed identifier in stored or supplied data.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
