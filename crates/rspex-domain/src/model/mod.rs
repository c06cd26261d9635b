//! Subject data model types.
//!
//! This module contains:
//! - Context tokens and context sets used as lookup keys
//! - Subject references (parents) and their string encoding
//! - The per-context-set entry and the versioned subject data structure

mod context;
mod entry;
mod field;
mod subject;
mod subject_data;
#[cfg(test)]
mod types_proptest;

pub use context::{Context, ContextSet};
pub use entry::{ContextualEntry, Options, Parents, Permissions};
pub use field::{Collection, FieldState};
pub use subject::{SubjectRef, DEFAULT_SUBJECT_TYPE, SUBJECT_SEPARATOR};
pub use subject_data::SubjectDataStore;
