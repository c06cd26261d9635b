//! Domain error types for subject data operations.

use thiserror::Error;

/// Domain-specific errors.
///
/// Update and query operations on subject data are total; these errors only
/// surface when parsing or validating externally supplied identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Context token not in `key=value` form.
    #[error("invalid context '{value}': {reason}")]
    InvalidContext { value: String, reason: &'static str },

    /// Subject reference with an empty type or identifier.
    #[error("invalid subject reference '{value}': {reason}")]
    InvalidSubjectRef { value: String, reason: &'static str },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
