//! Local option filtering.
//!
//! The filter is a pure function of the query and the option list. It never
//! mutates its input and always returns a fresh vector in the input order.

use std::fmt;
use std::sync::Arc;

use crate::option::Projection;

/// A caller-supplied match predicate: `(query, option) -> keep?`.
pub type FilterPredicate<T> = Arc<dyn Fn(&str, &T) -> bool + Send + Sync>;

/// Filters options against the text typed into the field.
///
/// # Example
///
/// ```rust
/// use lookup::filter::OptionFilter;
/// use lookup::option::{Choice, Projection};
///
/// let options = vec![Choice::new(1, "Apple"), Choice::new(2, "Banana")];
/// let filter = OptionFilter::new();
/// let visible = filter.apply("an", &options, &Projection::choice());
/// assert_eq!(visible, vec![Choice::new(2, "Banana")]);
/// ```
pub struct OptionFilter<T> {
    min_query_len: usize,
    predicate: Option<FilterPredicate<T>>,
}

impl<T> OptionFilter<T> {
    /// Creates a filter with no threshold and the default substring match.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_query_len: 0,
            predicate: None,
        }
    }

    /// Sets the minimum query length, in characters, before filtering applies.
    #[must_use]
    pub fn min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len;
        self
    }

    /// Replaces the default match with `predicate`.
    #[must_use]
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &T) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Sets the minimum query length (mutable version).
    pub fn set_min_query_len(&mut self, len: usize) {
        self.min_query_len = len;
    }

    /// Returns the minimum query length.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.min_query_len
    }

    /// Returns whether `query` is long enough to filter on.
    #[must_use]
    pub fn meets_threshold(&self, query: &str) -> bool {
        !query.is_empty() && self.allows_search(query)
    }

    /// Returns whether `query` is long enough to send to a remote search.
    ///
    /// With a zero threshold the empty query is searched too.
    #[must_use]
    pub fn allows_search(&self, query: &str) -> bool {
        query.chars().count() >= self.min_query_len
    }
}

impl<T: Clone> OptionFilter<T> {
    /// Returns the options that match `query`.
    ///
    /// An empty query, or one shorter than the threshold, keeps every option.
    pub fn apply<K>(&self, query: &str, options: &[T], projection: &Projection<T, K>) -> Vec<T> {
        if !self.meets_threshold(query) {
            return options.to_vec();
        }
        match &self.predicate {
            Some(predicate) => options
                .iter()
                .filter(|option| predicate(query, option))
                .cloned()
                .collect(),
            None => {
                let needle = query.to_lowercase();
                options
                    .iter()
                    .filter(|option| projection.label(option).to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
        }
    }
}

impl<T> Default for OptionFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for OptionFilter<T> {
    fn clone(&self) -> Self {
        Self {
            min_query_len: self.min_query_len,
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> fmt::Debug for OptionFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionFilter")
            .field("min_query_len", &self.min_query_len)
            .field("custom_predicate", &self.predicate.is_some())
            .finish()
    }
}
