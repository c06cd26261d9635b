//! In-memory subject backend.
//!
//! Holds the current [`SubjectDataStore`] generation of every subject in a
//! `DashMap`. Generations are immutable, so readers clone one out in O(1)
//! and never hold a shard lock while querying it.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rspex_domain::{SubjectDataStore, SubjectRef};
use tracing::{debug, instrument, warn};

use crate::config::MemoryBackendConfig;
use crate::error::{StorageError, StorageResult};
use crate::traits::{validate_subject, SubjectBackend, SubjectUpdate};

/// In-memory implementation of SubjectBackend.
///
/// # Performance Characteristics
///
/// - **Get subject**: O(1) average (DashMap lookup + generation clone)
/// - **Compare-and-set**: O(1) average (entry lock + pointer comparison)
/// - **Update subject**: one transform per attempt; the transform runs
///   without any lock held, so a slow update only costs its own retries
/// - **List subjects**: O(N) over all stored subjects
#[derive(Debug, Default)]
pub struct MemorySubjectBackend {
    subjects: DashMap<SubjectRef, SubjectDataStore>,
    config: MemoryBackendConfig,
}

impl MemorySubjectBackend {
    /// Creates a new in-memory backend with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with the given configuration.
    pub fn with_config(config: MemoryBackendConfig) -> Self {
        Self {
            subjects: DashMap::new(),
            config,
        }
    }

    /// Creates a new in-memory backend wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &MemoryBackendConfig {
        &self.config
    }

    fn current(&self, subject: &SubjectRef) -> SubjectDataStore {
        self.subjects
            .get(subject)
            .map(|data| data.value().clone())
            .unwrap_or_default()
    }

    fn swap_if_current(
        &self,
        subject: &SubjectRef,
        expected: &SubjectDataStore,
        data: SubjectDataStore,
    ) -> bool {
        match self.subjects.entry(subject.clone()) {
            Entry::Occupied(mut entry) => {
                if !entry.get().ptr_eq(expected) {
                    return false;
                }
                entry.insert(data);
                true
            }
            Entry::Vacant(entry) => {
                if !expected.is_empty() {
                    return false;
                }
                entry.insert(data);
                true
            }
        }
    }
}

#[async_trait]
impl SubjectBackend for MemorySubjectBackend {
    async fn get_subject(&self, subject: &SubjectRef) -> StorageResult<SubjectDataStore> {
        Ok(self.current(subject))
    }

    async fn subject_exists(&self, subject: &SubjectRef) -> StorageResult<bool> {
        Ok(self.subjects.contains_key(subject))
    }

    #[instrument(skip_all, fields(subject = %subject))]
    async fn set_subject(&self, subject: &SubjectRef, data: SubjectDataStore) -> StorageResult<()> {
        validate_subject(subject)?;
        self.subjects.insert(subject.clone(), data);
        debug!("subject replaced");
        Ok(())
    }

    #[instrument(skip_all, fields(subject = %subject))]
    async fn compare_and_set(
        &self,
        subject: &SubjectRef,
        expected: &SubjectDataStore,
        data: SubjectDataStore,
    ) -> StorageResult<bool> {
        validate_subject(subject)?;
        Ok(self.swap_if_current(subject, expected, data))
    }

    #[instrument(skip_all, fields(subject = %subject))]
    async fn update_subject(
        &self,
        subject: &SubjectRef,
        update: &SubjectUpdate<'_>,
    ) -> StorageResult<SubjectDataStore> {
        validate_subject(subject)?;

        let attempts = self.config.update_attempts();
        for attempt in 1..=attempts {
            let current = self.current(subject);
            let updated = update(&current);

            if updated.ptr_eq(&current) {
                metrics::counter!("rspex_noop_writes_total").increment(1);
                debug!(attempt, "update changed nothing, skipping write");
                return Ok(current);
            }
            if self.swap_if_current(subject, &current, updated.clone()) {
                debug!(attempt, "update committed");
                return Ok(updated);
            }
            metrics::counter!("rspex_update_conflicts_total").increment(1);
        }

        warn!(attempts, "update abandoned after repeated conflicts");
        Err(StorageError::UpdateConflict {
            subject: subject.to_string(),
            attempts,
        })
    }

    #[instrument(skip_all, fields(subject = %subject))]
    async fn delete_subject(&self, subject: &SubjectRef) -> StorageResult<()> {
        if self.subjects.remove(subject).is_none() {
            return Err(StorageError::SubjectNotFound {
                subject: subject.to_string(),
            });
        }
        debug!("subject deleted");
        Ok(())
    }

    async fn list_subjects(&self, subject_type: &str) -> StorageResult<Vec<SubjectRef>> {
        let mut subjects: Vec<SubjectRef> = self
            .subjects
            .iter()
            .filter(|entry| entry.key().subject_type == subject_type)
            .map(|entry| entry.key().clone())
            .collect();
        subjects.sort();
        Ok(subjects)
    }
}

/// Register storage metric descriptions.
///
/// Call this once during application initialization to register metric
/// descriptions with the metrics recorder.
///
/// # Example
///
/// ```ignore
/// use rspex_storage::register_storage_metrics;
///
/// // During application initialization
/// register_storage_metrics();
/// ```
pub fn register_storage_metrics() {
    metrics::describe_counter!(
        "rspex_update_conflicts_total",
        "Total number of subject updates retried after a concurrent write"
    );
    metrics::describe_counter!(
        "rspex_noop_writes_total",
        "Total number of subject updates that changed nothing"
    );
}
