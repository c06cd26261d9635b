//! Persisted layout of subject data.
//!
//! Each context set is written as one record:
//!
//! ```json
//! {
//!   "contexts": ["world=nether"],
//!   "permissions": { "build": 1 },
//!   "options": { "prefix": "[N]" },
//!   "parents": ["group:admin", "moderators"],
//!   "permissions-default": 0
//! }
//! ```
//!
//! Unset fields are omitted so that "never written" and "written then
//! emptied" survive a save/load cycle. A parent without `:` is a `group`.

use std::collections::{BTreeMap, HashSet};

use rspex_domain::model::Collection;
use rspex_domain::{
    ContextSet, ContextualEntry, FieldState, Options, Parents, Permissions, SubjectDataStore,
    SubjectRef,
};
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// One persisted context-set record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedEntry {
    /// Context tokens in `key=value` form; empty for the global context set.
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeMap<String, i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    #[serde(rename = "permissions-default", default)]
    pub default_value: i32,
}

impl SerializedEntry {
    fn from_entry(contexts: &ContextSet, entry: &ContextualEntry) -> Self {
        Self {
            contexts: contexts.iter().map(ToString::to_string).collect(),
            permissions: entry
                .permissions()
                .to_present()
                .map(|m| m.into_iter().collect()),
            options: entry.options().to_present().map(|m| m.into_iter().collect()),
            parents: entry.parents().to_present().map(|v| v.into_iter().collect()),
            default_value: entry.default_value(),
        }
    }

    fn into_entry(self) -> StorageResult<(ContextSet, ContextualEntry)> {
        let contexts = ContextSet::parse_all(&self.contexts)?;
        if let Some(parents) = &self.parents {
            for raw in parents {
                SubjectRef::decode(raw).validate()?;
            }
        }

        let permissions: Option<Permissions> = self.permissions.map(|m| m.into_iter().collect());
        let options: Option<Options> = self.options.map(|m| m.into_iter().collect());
        let parents: Option<Parents> = self.parents.map(|v| v.into_iter().collect());

        let entry = ContextualEntry::from_parts(
            to_field(permissions),
            to_field(options),
            to_field(parents),
            self.default_value,
        );
        Ok((contexts, entry))
    }
}

fn to_field<T: Collection>(value: Option<T>) -> FieldState<T> {
    value.map_or(FieldState::Unset, FieldState::present)
}

/// Converts a generation into records, ordered by context set.
pub fn to_serialized(data: &SubjectDataStore) -> Vec<SerializedEntry> {
    let mut entries: Vec<_> = data.entries().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    entries
        .into_iter()
        .map(|(contexts, entry)| SerializedEntry::from_entry(contexts, entry))
        .collect()
}

/// Builds a generation from records.
///
/// Rejects malformed context tokens, parents with an empty type or
/// identifier, and records repeating a context set.
pub fn from_serialized(records: Vec<SerializedEntry>) -> StorageResult<SubjectDataStore> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let (contexts, entry) = record.into_entry()?;
        if !seen.insert(contexts.clone()) {
            return Err(StorageError::InvalidInput {
                message: format!("duplicate context set {contexts}"),
            });
        }
        entries.push((contexts, entry));
    }
    Ok(SubjectDataStore::from_entries(entries))
}

/// Serializes a generation as pretty-printed JSON.
pub fn to_json(data: &SubjectDataStore) -> StorageResult<String> {
    serde_json::to_string_pretty(&to_serialized(data)).map_err(|e| {
        StorageError::SerializationError {
            message: format!("failed to serialize subject data: {e}"),
        }
    })
}

/// Parses a generation from JSON produced by [`to_json`].
pub fn from_json(json: &str) -> StorageResult<SubjectDataStore> {
    let records: Vec<SerializedEntry> =
        serde_json::from_str(json).map_err(|e| StorageError::SerializationError {
            message: format!("failed to parse subject data: {e}"),
        })?;
    from_serialized(records)
}
