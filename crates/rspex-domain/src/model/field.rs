//! Tri-state field storage for per-context data.

use im::{OrdMap, Vector};

/// Storage state of one collection field of a [`ContextualEntry`].
///
/// `Unset` (never written, or cleared wholesale) and `Empty` (written, then
/// emptied by removals) both read as "nothing found" through single-context
/// queries, but only present fields (`Empty` or `Populated`) are exported by
/// the `all_*` queries and by serializers.
///
/// [`ContextualEntry`]: super::ContextualEntry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldState<T> {
    /// The field was never written.
    #[default]
    Unset,
    /// The field is present but holds nothing.
    Empty,
    /// The field holds a non-empty collection.
    Populated(T),
}

/// Collections that can back a [`FieldState`].
pub trait Collection: Clone + Default {
    fn is_empty(&self) -> bool;
}

impl<K: Ord + Clone, V: Clone> Collection for OrdMap<K, V> {
    fn is_empty(&self) -> bool {
        OrdMap::is_empty(self)
    }
}

impl<A: Clone> Collection for Vector<A> {
    fn is_empty(&self) -> bool {
        Vector::is_empty(self)
    }
}

impl<T> FieldState<T> {
    /// Whether the field was never written.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Whether the field is present (`Empty` or `Populated`).
    pub fn is_present(&self) -> bool {
        !self.is_unset()
    }

    /// The populated collection, if any.
    pub fn populated(&self) -> Option<&T> {
        match self {
            Self::Populated(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Collection> FieldState<T> {
    /// Wraps a present collection, collapsing an empty one to `Empty`.
    pub fn present(value: T) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Populated(value)
        }
    }

    /// The collection for reading; `Unset` and `Empty` both yield an empty one.
    pub fn to_collection(&self) -> T {
        self.populated().cloned().unwrap_or_default()
    }

    /// The collection if the field is present, `None` if unset.
    pub fn to_present(&self) -> Option<T> {
        match self {
            Self::Unset => None,
            Self::Empty => Some(T::default()),
            Self::Populated(value) => Some(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_collapses_empty_collection() {
        let state = FieldState::present(OrdMap::<String, i32>::new());
        assert_eq!(state, FieldState::Empty);
        assert!(state.is_present());
    }

    #[test]
    fn test_unset_and_empty_read_the_same() {
        let unset: FieldState<Vector<String>> = FieldState::Unset;
        let empty: FieldState<Vector<String>> = FieldState::Empty;
        assert_eq!(unset.to_collection(), empty.to_collection());
        assert_eq!(unset.to_present(), None);
        assert_eq!(empty.to_present(), Some(Vector::new()));
    }

    #[test]
    fn test_populated() {
        let state = FieldState::present(Vector::unit("group:admin".to_string()));
        assert_eq!(state.populated().map(|v| v.len()), Some(1));
    }
}
