//! Versioned, context-partitioned subject data.
//!
//! [`SubjectDataStore`] is a persistent structure: every update returns a new
//! generation and leaves the receiver untouched, so concurrent readers never
//! observe a partial write.
//!
//! # Structure
//!
//! ```text
//! SubjectDataStore ──Arc──▶ HashMap<ContextSet, Arc<ContextualEntry>>
//!                                 │  (hash trie, shared between generations)
//!                                 ▼
//!                     ContextualEntry { permissions, options, parents, default }
//! ```
//!
//! A single-context update rebuilds one path of the trie and one entry;
//! every other entry is shared with the previous generation.
//!
//! # No-op detection
//!
//! Updates that change nothing return a clone sharing the receiver's
//! mapping, so [`SubjectDataStore::ptr_eq`] reports `true`. This holds for:
//! - removing an option or permission that is not set
//! - removing a parent that is not in the list (or whose context set has no entry)
//! - clearing a single context set that has no entry
//! - clearing all context sets of an empty store

use std::collections::HashMap as StdHashMap;
use std::sync::Arc;

use im::HashMap;
use tracing::trace;

use super::context::ContextSet;
use super::entry::{ContextualEntry, Options, Permissions};
use super::subject::{encode_parts, SubjectRef};

type ContextMap = HashMap<ContextSet, Arc<ContextualEntry>>;

/// One generation of a subject's permissions, options and parents.
///
/// Cloning is O(1) and yields the same generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectDataStore {
    contexts: Arc<ContextMap>,
}

impl SubjectDataStore {
    /// Creates an empty store with no context sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a generation from loaded entries.
    ///
    /// Later pairs replace earlier ones with an equal context set.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ContextSet, ContextualEntry)>,
    {
        let contexts: ContextMap = entries
            .into_iter()
            .map(|(contexts, entry)| (contexts, Arc::new(entry)))
            .collect();
        Self {
            contexts: Arc::new(contexts),
        }
    }

    /// Whether `self` and `other` are the same generation.
    ///
    /// An update that returned a generation `ptr_eq` to its receiver was a no-op.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.contexts, &other.contexts)
    }

    /// Whether no context set has an entry.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Number of context sets with an entry.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// The stored entry for an exact context-set match.
    pub fn entry(&self, contexts: &ContextSet) -> Option<&Arc<ContextualEntry>> {
        self.contexts.get(contexts)
    }

    /// Iterates every stored entry, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&ContextSet, &Arc<ContextualEntry>)> + '_ {
        self.contexts.iter()
    }

    /// Iterates every context set that has an entry, whichever fields it holds.
    ///
    /// The iterator is lazy; call again to restart.
    pub fn active_contexts(&self) -> impl Iterator<Item = &ContextSet> + '_ {
        self.contexts.keys()
    }

    // Queries

    /// Options under `contexts`; empty when there is no entry or the field is unset.
    pub fn get_options(&self, contexts: &ContextSet) -> Options {
        self.entry(contexts)
            .map(|e| e.options().to_collection())
            .unwrap_or_default()
    }

    /// Permissions under `contexts`; empty when there is no entry or the field is unset.
    pub fn get_permissions(&self, contexts: &ContextSet) -> Permissions {
        self.entry(contexts)
            .map(|e| e.permissions().to_collection())
            .unwrap_or_default()
    }

    /// Decoded parents under `contexts`, highest priority first.
    pub fn get_parents(&self, contexts: &ContextSet) -> Vec<SubjectRef> {
        self.entry(contexts)
            .and_then(|e| e.parents().populated())
            .map(|parents| parents.iter().map(|p| SubjectRef::decode(p)).collect())
            .unwrap_or_default()
    }

    /// Default value under `contexts`; 0 when there is no entry.
    pub fn get_default_value(&self, contexts: &ContextSet) -> i32 {
        self.entry(contexts).map_or(0, |e| e.default_value())
    }

    /// Options of every context set whose options field is present.
    ///
    /// Context sets whose options were never set (or were cleared) are
    /// omitted, not reported as empty.
    pub fn get_all_options(&self) -> StdHashMap<ContextSet, Options> {
        self.entries()
            .filter_map(|(contexts, e)| Some((contexts.clone(), e.options().to_present()?)))
            .collect()
    }

    /// Permissions of every context set whose permissions field is present.
    pub fn get_all_permissions(&self) -> StdHashMap<ContextSet, Permissions> {
        self.entries()
            .filter_map(|(contexts, e)| Some((contexts.clone(), e.permissions().to_present()?)))
            .collect()
    }

    /// Decoded parents of every context set whose parents field is present.
    pub fn get_all_parents(&self) -> StdHashMap<ContextSet, Vec<SubjectRef>> {
        self.entries()
            .filter_map(|(contexts, e)| {
                let parents = e.parents().to_present()?;
                let decoded: Vec<SubjectRef> =
                    parents.iter().map(|p| SubjectRef::decode(p)).collect();
                Some((contexts.clone(), decoded))
            })
            .collect()
    }

    // Updates

    /// Sets an option, or removes it when `value` is `None`.
    #[must_use = "updates return a new generation"]
    pub fn set_option(&self, contexts: &ContextSet, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.update_entry(contexts, |e| e.with_option(key, value)),
            None => self.update_entry(contexts, |e| e.without_option(key)),
        }
    }

    /// Unsets the options of one context set.
    #[must_use = "updates return a new generation"]
    pub fn clear_options(&self, contexts: &ContextSet) -> Self {
        self.update_existing(contexts, |e| e.without_options())
    }

    /// Unsets the options of every context set.
    #[must_use = "updates return a new generation"]
    pub fn clear_all_options(&self) -> Self {
        self.map_entries(|e| e.without_options())
    }

    /// Sets a permission node, or removes it when `value` is 0.
    #[must_use = "updates return a new generation"]
    pub fn set_permission(&self, contexts: &ContextSet, node: &str, value: i32) -> Self {
        if value == 0 {
            self.update_entry(contexts, |e| e.without_permission(node))
        } else {
            self.update_entry(contexts, |e| e.with_permission(node, value))
        }
    }

    /// Unsets the permissions of one context set.
    #[must_use = "updates return a new generation"]
    pub fn clear_permissions(&self, contexts: &ContextSet) -> Self {
        self.update_existing(contexts, |e| e.without_permissions())
    }

    /// Unsets the permissions of every context set.
    #[must_use = "updates return a new generation"]
    pub fn clear_all_permissions(&self) -> Self {
        self.map_entries(|e| e.without_permissions())
    }

    /// Adds `type:identifier` as the highest-priority parent.
    #[must_use = "updates return a new generation"]
    pub fn add_parent(&self, contexts: &ContextSet, subject_type: &str, identifier: &str) -> Self {
        let encoded = encode_parts(subject_type, identifier);
        self.update_entry(contexts, |e| e.with_added_parent(encoded))
    }

    /// Removes the first occurrence of `type:identifier`.
    #[must_use = "updates return a new generation"]
    pub fn remove_parent(
        &self,
        contexts: &ContextSet,
        subject_type: &str,
        identifier: &str,
    ) -> Self {
        let encoded = encode_parts(subject_type, identifier);
        match self.entry(contexts) {
            Some(entry) if entry.contains_parent(&encoded) => {
                self.replace_entry(contexts, entry.with_removed_parent(&encoded))
            }
            _ => self.clone(),
        }
    }

    /// Unsets the parents of one context set.
    #[must_use = "updates return a new generation"]
    pub fn clear_parents(&self, contexts: &ContextSet) -> Self {
        self.update_existing(contexts, |e| e.without_parents())
    }

    /// Unsets the parents of every context set.
    #[must_use = "updates return a new generation"]
    pub fn clear_all_parents(&self) -> Self {
        self.map_entries(|e| e.without_parents())
    }

    /// Sets the default value, creating the entry if needed.
    #[must_use = "updates return a new generation"]
    pub fn set_default_value(&self, contexts: &ContextSet, default_value: i32) -> Self {
        self.update_entry(contexts, |e| e.with_default_value(default_value))
    }

    // Copy-on-write helpers

    /// Applies `f` to the entry for `contexts`, or to a fresh empty entry.
    ///
    /// When `f` hands back its input the receiver is returned, so a no-op
    /// never persists the fresh entry.
    fn update_entry<F>(&self, contexts: &ContextSet, f: F) -> Self
    where
        F: FnOnce(&Arc<ContextualEntry>) -> Arc<ContextualEntry>,
    {
        let current = self.entry(contexts).cloned().unwrap_or_default();
        let updated = f(&current);
        if Arc::ptr_eq(&current, &updated) {
            return self.clone();
        }
        self.replace_entry(contexts, updated)
    }

    /// Applies `f` only if `contexts` already has an entry.
    fn update_existing<F>(&self, contexts: &ContextSet, f: F) -> Self
    where
        F: FnOnce(&Arc<ContextualEntry>) -> Arc<ContextualEntry>,
    {
        match self.entry(contexts) {
            Some(entry) => self.replace_entry(contexts, f(entry)),
            None => self.clone(),
        }
    }

    fn replace_entry(&self, contexts: &ContextSet, entry: Arc<ContextualEntry>) -> Self {
        Self {
            contexts: Arc::new(self.contexts.update(contexts.clone(), entry)),
        }
    }

    fn map_entries<F>(&self, f: F) -> Self
    where
        F: Fn(&Arc<ContextualEntry>) -> Arc<ContextualEntry>,
    {
        if self.contexts.is_empty() {
            return self.clone();
        }
        trace!(contexts = self.contexts.len(), "rewriting every context entry");
        let contexts: ContextMap = self
            .contexts
            .iter()
            .map(|(contexts, entry)| (contexts.clone(), f(entry)))
            .collect();
        Self {
            contexts: Arc::new(contexts),
        }
    }
}
