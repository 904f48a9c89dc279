//! Option records and their projections.
//!
//! A lookup field never assumes anything about the records it offers. Two
//! caller-supplied projections turn a record into the text shown in the
//! input and the key used for identity and selection.
//!
//! # Example
//!
//! ```rust
//! use lookup::option::Projection;
//!
//! #[derive(Clone)]
//! struct User { id: u32, name: String }
//!
//! let projection = Projection::new(|u: &User| u.name.clone(), |u: &User| u.id);
//! let ada = User { id: 7, name: "Ada".into() };
//! assert_eq!(projection.label(&ada), "Ada");
//! assert_eq!(projection.key(&ada), 7);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Extracts the display label of an option.
pub type LabelFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Extracts the identity key of an option.
pub type KeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;

/// The default option record: a label and a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice<K> {
    /// Text shown to the user.
    pub label: String,
    /// Identity used for equality and selection.
    pub value: K,
}

impl<K> Choice<K> {
    /// Creates a new choice.
    pub fn new(value: K, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// The pair of projections applied to every option.
pub struct Projection<T, K> {
    label: LabelFn<T>,
    key: KeyFn<T, K>,
}

impl<T, K> Projection<T, K> {
    /// Creates a projection from a label extractor and a key extractor.
    pub fn new<L, F>(label: L, key: F) -> Self
    where
        L: Fn(&T) -> String + Send + Sync + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            label: Arc::new(label),
            key: Arc::new(key),
        }
    }

    /// Returns the label of `option`.
    pub fn label(&self, option: &T) -> String {
        (self.label)(option)
    }

    /// Returns the key of `option`.
    pub fn key(&self, option: &T) -> K {
        (self.key)(option)
    }
}

impl<T, K: PartialEq> Projection<T, K> {
    /// Finds the first option whose key equals `key`.
    pub fn find<'a>(&self, options: &'a [T], key: &K) -> Option<&'a T> {
        options.iter().find(|option| self.key(option) == *key)
    }

    /// Returns whether any option carries `key`.
    pub fn contains(&self, options: &[T], key: &K) -> bool {
        self.find(options, key).is_some()
    }
}

impl<K: Clone + 'static> Projection<Choice<K>, K> {
    /// The default projection: `.label` and `.value`.
    pub fn choice() -> Self {
        Self::new(|c: &Choice<K>| c.label.clone(), |c: &Choice<K>| c.value.clone())
    }
}

impl<T, K> Clone for Projection<T, K> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            key: Arc::clone(&self.key),
        }
    }
}

impl<T, K> fmt::Debug for Projection<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> Vec<Choice<u32>> {
        vec![
            Choice::new(1, "Apple"),
            Choice::new(2, "Banana"),
            Choice::new(2, "Duplicate banana"),
        ]
    }

    #[test]
    fn test_choice_projection_uses_label_and_value() {
        let projection = Projection::choice();
        let apple = Choice::new(1u32, "Apple");
        assert_eq!(projection.label(&apple), "Apple");
        assert_eq!(projection.key(&apple), 1);
    }

    #[test]
    fn test_find_returns_first_match() {
        let options = fruits();
        let projection = Projection::choice();
        let found = projection.find(&options, &2).unwrap();
        assert_eq!(found.label, "Banana");
        assert!(projection.contains(&options, &1));
        assert!(!projection.contains(&options, &9));
    }

    #[test]
    fn test_custom_projection_ignores_field_names() {
        #[derive(Clone)]
        struct Row {
            code: &'static str,
            title: &'static str,
        }
        let projection = Projection::new(|r: &Row| r.title.to_uppercase(), |r: &Row| r.code);
        let row = Row {
            code: "de",
            title: "Germany",
        };
        assert_eq!(projection.label(&row), "GERMANY");
        assert_eq!(projection.key(&row), "de");
    }
}
