//! Context tokens and context sets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single condition token (e.g., `world=nether`).
///
/// The key is never empty and never contains `=`, so the `key=value` form
/// parses back to the same token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Context {
    key: String,
    value: String,
}

impl Context {
    /// Creates a new Context from key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> DomainResult<Self> {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            return Err(DomainError::InvalidContext {
                value: format!("{key}={value}"),
                reason: "context key cannot be empty",
            });
        }
        if key.contains('=') {
            return Err(DomainError::InvalidContext {
                value: format!("{key}={value}"),
                reason: "context key cannot contain '='",
            });
        }
        Ok(Self { key, value })
    }

    /// Parses a context from "key=value" format.
    ///
    /// Only the first `=` separates key from value, so values may contain `=`.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let Some((key, val)) = value.split_once('=') else {
            return Err(DomainError::InvalidContext {
                value: value.to_string(),
                reason: "context must be in 'key=value' format",
            });
        };
        Self::new(key, val)
    }

    /// The context key (e.g., "world").
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The context value (e.g., "nether").
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl TryFrom<String> for Context {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::parse(&value)
    }
}

impl From<Context> for String {
    fn from(context: Context) -> Self {
        context.to_string()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An unordered, deduplicated set of context tokens.
///
/// Two sets are equal iff they contain the same tokens. Context sets are
/// only ever used as exact-match lookup keys; `{A}` and `{A, B}` are
/// unrelated keys even though they overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextSet(BTreeSet<Context>);

impl ContextSet {
    /// Returns the empty context set (the global scope).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses every token in `values` as `key=value`.
    pub fn parse_all<S: AsRef<str>>(values: &[S]) -> DomainResult<Self> {
        values
            .iter()
            .map(|v| Context::parse(v.as_ref()))
            .collect()
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the empty (global) context set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `context` is a member of this set.
    pub fn contains(&self, context: &Context) -> bool {
        self.0.contains(context)
    }

    /// Iterates the tokens in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Context> {
        self.0.iter()
    }
}

impl FromIterator<Context> for ContextSet {
    fn from_iter<I: IntoIterator<Item = Context>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ContextSet {
    type Item = &'a Context;
    type IntoIter = std::collections::btree_set::Iter<'a, Context>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ContextSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, ctx) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ctx}")?;
        }
        f.write_str("}")
    }
}
