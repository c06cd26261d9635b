//! Subject references and their `type:identifier` encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Subject type assumed when an encoded reference carries no separator.
pub const DEFAULT_SUBJECT_TYPE: &str = "group";

/// Separator between subject type and identifier in the encoded form.
pub const SUBJECT_SEPARATOR: char = ':';

/// A `(type, identifier)` pair naming a subject (e.g., `group:admin`).
///
/// Parent lists are stored in encoded form; this type is what callers see
/// after decoding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectRef {
    /// The subject type (e.g., "group", "user").
    pub subject_type: String,
    /// The identifier within that type (e.g., "admin").
    pub identifier: String,
}

impl SubjectRef {
    /// Creates a new SubjectRef from type and identifier.
    pub fn new(subject_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            subject_type: subject_type.into(),
            identifier: identifier.into(),
        }
    }

    /// Shorthand for a reference of the default `group` type.
    pub fn group(identifier: impl Into<String>) -> Self {
        Self::new(DEFAULT_SUBJECT_TYPE, identifier)
    }

    /// Encodes this reference as `type:identifier`.
    pub fn encode(&self) -> String {
        encode_parts(&self.subject_type, &self.identifier)
    }

    /// Decodes a stored reference.
    ///
    /// Never fails: only the first `:` splits type from identifier, and a
    /// string without `:` is an identifier of type `group`. Whether a decoded
    /// value is acceptable is decided separately by [`SubjectRef::validate`].
    pub fn decode(raw: &str) -> Self {
        match raw.split_once(SUBJECT_SEPARATOR) {
            Some((subject_type, identifier)) => Self::new(subject_type, identifier),
            None => Self::group(raw),
        }
    }

    /// Rejects references with an empty type or identifier.
    pub fn validate(&self) -> DomainResult<()> {
        if self.subject_type.is_empty() {
            return Err(DomainError::InvalidSubjectRef {
                value: self.encode(),
                reason: "subject type cannot be empty",
            });
        }
        if self.identifier.is_empty() {
            return Err(DomainError::InvalidSubjectRef {
                value: self.encode(),
                reason: "subject identifier cannot be empty",
            });
        }
        Ok(())
    }
}

/// Encodes a type/identifier pair without building a `SubjectRef`.
pub(crate) fn encode_parts(subject_type: &str, identifier: &str) -> String {
    format!("{subject_type}{SUBJECT_SEPARATOR}{identifier}")
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.subject_type, SUBJECT_SEPARATOR, self.identifier)
    }
}
