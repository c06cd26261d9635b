//! rspex-storage: Subject data backends
//!
//! This crate provides the storage side of rspex subject data, including:
//! - SubjectBackend trait: generation-based reads and compare-and-set writes
//! - In-memory implementation
//! - The persisted per-context layout shared by every backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               rspex-storage                  │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs     - SubjectBackend trait       │
//! │  memory.rs     - In-memory implementation   │
//! │  serialized.rs - Persisted entry layout     │
//! │  config.rs     - Backend configuration      │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod serialized;
pub mod traits;

// Re-export commonly used types
pub use config::MemoryBackendConfig;
pub use error::{StorageError, StorageResult};
pub use memory::{register_storage_metrics, MemorySubjectBackend};
pub use serialized::SerializedEntry;
pub use traits::{SubjectBackend, SubjectUpdate};
