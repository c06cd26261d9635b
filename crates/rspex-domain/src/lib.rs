//! rspex-domain: Core subject data model
//!
//! This crate contains the per-subject authorization state consumed by the
//! permission resolver:
//! - Context tokens and context sets
//! - Parent (subject) references and their `type:identifier` encoding
//! - The immutable, context-partitioned subject data structure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                rspex-domain                  │
//! ├─────────────────────────────────────────────┤
//! │  model/context      - Context tokens/sets   │
//! │  model/subject      - Subject references    │
//! │  model/entry        - Per-context entries   │
//! │  model/subject_data - Versioned subject data│
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod model;

// Re-export commonly used types at the crate root
pub use error::{DomainError, DomainResult};
pub use model::{
    Context, ContextSet, ContextualEntry, FieldState, Options, Parents, Permissions,
    SubjectDataStore, SubjectRef,
};
