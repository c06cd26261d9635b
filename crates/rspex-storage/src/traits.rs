//! SubjectBackend trait definition.

use async_trait::async_trait;
use rspex_domain::{SubjectDataStore, SubjectRef};

use crate::error::{StorageError, StorageResult};
use crate::serialized;

/// Maximum length of a subject type or identifier.
pub const MAX_SUBJECT_PART_LENGTH: usize = 256;

/// A pure transform from one generation to the next.
pub type SubjectUpdate<'a> = dyn Fn(&SubjectDataStore) -> SubjectDataStore + Send + Sync + 'a;

/// Validates a subject reference used as a storage key.
pub fn validate_subject(subject: &SubjectRef) -> StorageResult<()> {
    subject.validate()?;
    if subject.subject_type.len() > MAX_SUBJECT_PART_LENGTH
        || subject.identifier.len() > MAX_SUBJECT_PART_LENGTH
    {
        return Err(StorageError::InvalidInput {
            message: format!(
                "subject type and identifier must be at most {MAX_SUBJECT_PART_LENGTH} bytes"
            ),
        });
    }
    Ok(())
}

/// Abstract storage interface for subject data.
///
/// Backends hold one current generation per subject. Writers read a
/// generation, derive a new one with the pure update operations of
/// [`SubjectDataStore`], and publish it with [`compare_and_set`]; a writer
/// that lost the race re-reads and tries again.
///
/// Implementations must be thread-safe (Send + Sync).
///
/// [`compare_and_set`]: SubjectBackend::compare_and_set
#[async_trait]
pub trait SubjectBackend: Send + Sync + 'static {
    /// Gets the current generation; an unknown subject yields an empty one.
    async fn get_subject(&self, subject: &SubjectRef) -> StorageResult<SubjectDataStore>;

    /// Checks whether a generation is stored for the subject.
    async fn subject_exists(&self, subject: &SubjectRef) -> StorageResult<bool>;

    /// Replaces the current generation unconditionally.
    async fn set_subject(&self, subject: &SubjectRef, data: SubjectDataStore) -> StorageResult<()>;

    /// Replaces the current generation only if it is still `expected`.
    ///
    /// For an unknown subject, any empty `expected` matches. Returns whether
    /// the swap happened.
    async fn compare_and_set(
        &self,
        subject: &SubjectRef,
        expected: &SubjectDataStore,
        data: SubjectDataStore,
    ) -> StorageResult<bool>;

    /// Applies `update` to the current generation and publishes the result,
    /// retrying on conflicting writes.
    ///
    /// If `update` returns its input unchanged nothing is written. Returns the
    /// generation that is current once the call completes.
    async fn update_subject(
        &self,
        subject: &SubjectRef,
        update: &SubjectUpdate<'_>,
    ) -> StorageResult<SubjectDataStore>;

    /// Deletes a subject.
    async fn delete_subject(&self, subject: &SubjectRef) -> StorageResult<()>;

    /// Lists stored subjects of one type, sorted by identifier.
    async fn list_subjects(&self, subject_type: &str) -> StorageResult<Vec<SubjectRef>>;

    /// Serializes the current generation of a subject to JSON.
    async fn export_subject(&self, subject: &SubjectRef) -> StorageResult<String> {
        let data = self.get_subject(subject).await?;
        serialized::to_json(&data)
    }

    /// Replaces a subject with data parsed from JSON.
    async fn import_subject(&self, subject: &SubjectRef, json: &str) -> StorageResult<()> {
        let data = serialized::from_json(json)?;
        self.set_subject(subject, data).await
    }
}
