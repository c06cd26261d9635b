//! Per-context-set subject data.

use std::sync::Arc;

use im::{OrdMap, Vector};

use super::field::FieldState;

/// Permission node -> value. Positive grants, negative denies; zero is never stored.
pub type Permissions = OrdMap<String, i32>;

/// Option key -> value.
pub type Options = OrdMap<String, String>;

/// Encoded parent references (`type:identifier`), highest priority first.
pub type Parents = Vector<String>;

/// The data a subject holds under one context set.
///
/// Entries are immutable. Every `with*` method returns a new entry behind a
/// fresh `Arc`, except the removals documented as returning `self` when the
/// key is absent; callers detect those no-ops with [`Arc::ptr_eq`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextualEntry {
    permissions: FieldState<Permissions>,
    options: FieldState<Options>,
    parents: FieldState<Parents>,
    default_value: i32,
}

impl ContextualEntry {
    /// Creates an entry with every field unset and a default value of 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an entry from loaded field states.
    ///
    /// Zero-valued permissions are dropped and present-but-empty collections
    /// become [`FieldState::Empty`].
    pub fn from_parts(
        permissions: FieldState<Permissions>,
        options: FieldState<Options>,
        parents: FieldState<Parents>,
        default_value: i32,
    ) -> Self {
        let permissions = match permissions {
            FieldState::Populated(map) => {
                let granted: Permissions = map.into_iter().filter(|(_, v)| *v != 0).collect();
                FieldState::present(granted)
            }
            other => other,
        };
        let options = match options {
            FieldState::Populated(map) => FieldState::present(map),
            other => other,
        };
        let parents = match parents {
            FieldState::Populated(list) => FieldState::present(list),
            other => other,
        };
        Self {
            permissions,
            options,
            parents,
            default_value,
        }
    }

    pub fn permissions(&self) -> &FieldState<Permissions> {
        &self.permissions
    }

    pub fn options(&self) -> &FieldState<Options> {
        &self.options
    }

    pub fn parents(&self) -> &FieldState<Parents> {
        &self.parents
    }

    /// Fallback permission value for nodes with no explicit match.
    pub fn default_value(&self) -> i32 {
        self.default_value
    }

    /// Whether `encoded` appears anywhere in the parent list.
    pub fn contains_parent(&self, encoded: &str) -> bool {
        self.parents
            .populated()
            .is_some_and(|parents| parents.iter().any(|p| p == encoded))
    }

    // Options

    pub fn with_option(
        self: &Arc<Self>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Arc<Self> {
        let options = self.options.to_collection().update(key.into(), value.into());
        Arc::new(Self {
            options: FieldState::present(options),
            ..(**self).clone()
        })
    }

    /// Removes `key`; returns `self` unchanged when the key is not set.
    pub fn without_option(self: &Arc<Self>, key: &str) -> Arc<Self> {
        match self.options.populated() {
            Some(options) if options.contains_key(key) => Arc::new(Self {
                options: FieldState::present(options.without(key)),
                ..(**self).clone()
            }),
            _ => Arc::clone(self),
        }
    }

    /// Unsets the whole options field.
    pub fn without_options(self: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            options: FieldState::Unset,
            ..(**self).clone()
        })
    }

    // Permissions

    /// Sets `node` to `value`. A value of 0 removes the node instead.
    pub fn with_permission(self: &Arc<Self>, node: impl Into<String>, value: i32) -> Arc<Self> {
        let node = node.into();
        if value == 0 {
            return self.without_permission(&node);
        }
        let permissions = self.permissions.to_collection().update(node, value);
        Arc::new(Self {
            permissions: FieldState::present(permissions),
            ..(**self).clone()
        })
    }

    /// Removes `node`; returns `self` unchanged when the node is not set.
    pub fn without_permission(self: &Arc<Self>, node: &str) -> Arc<Self> {
        match self.permissions.populated() {
            Some(permissions) if permissions.contains_key(node) => Arc::new(Self {
                permissions: FieldState::present(permissions.without(node)),
                ..(**self).clone()
            }),
            _ => Arc::clone(self),
        }
    }

    /// Unsets the whole permissions field.
    pub fn without_permissions(self: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            permissions: FieldState::Unset,
            ..(**self).clone()
        })
    }

    pub fn with_default_value(self: &Arc<Self>, default_value: i32) -> Arc<Self> {
        Arc::new(Self {
            default_value,
            ..(**self).clone()
        })
    }

    // Parents

    /// Prepends an encoded parent, giving it the highest priority.
    /// Duplicates are kept.
    pub fn with_added_parent(self: &Arc<Self>, encoded: impl Into<String>) -> Arc<Self> {
        let mut parents = self.parents.to_collection();
        parents.push_front(encoded.into());
        Arc::new(Self {
            parents: FieldState::present(parents),
            ..(**self).clone()
        })
    }

    /// Removes the first occurrence of an encoded parent.
    ///
    /// Always returns a new entry, even if `encoded` is not in the list.
    pub fn with_removed_parent(self: &Arc<Self>, encoded: &str) -> Arc<Self> {
        let position = self
            .parents
            .populated()
            .and_then(|parents| parents.iter().position(|p| p == encoded));
        let parents = match position {
            Some(index) => {
                let mut parents = self.parents.to_collection();
                parents.remove(index);
                FieldState::present(parents)
            }
            None => self.parents.clone(),
        };
        Arc::new(Self {
            parents,
            ..(**self).clone()
        })
    }

    /// Unsets the whole parents field.
    pub fn without_parents(self: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            parents: FieldState::Unset,
            ..(**self).clone()
        })
    }
}
