//! Configuration for subject backends.

use serde::{Deserialize, Serialize};

/// Default number of read-transform-swap attempts per update.
pub const DEFAULT_MAX_UPDATE_RETRIES: u32 = 16;

fn default_max_update_retries() -> u32 {
    DEFAULT_MAX_UPDATE_RETRIES
}

/// Configuration for the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemoryBackendConfig {
    /// Attempts made by `update_subject` before giving up with
    /// `StorageError::UpdateConflict`. Values below 1 are treated as 1.
    #[serde(default = "default_max_update_retries")]
    pub max_update_retries: u32,
}

impl Default for MemoryBackendConfig {
    fn default() -> Self {
        Self {
            max_update_retries: default_max_update_retries(),
        }
    }
}

impl MemoryBackendConfig {
    /// Sets the maximum number of update attempts.
    pub fn with_max_update_retries(mut self, max_update_retries: u32) -> Self {
        self.max_update_retries = max_update_retries;
        self
    }

    /// Attempts actually made per update.
    pub(crate) fn update_attempts(&self) -> u32 {
        self.max_update_retries.max(1)
    }
}
