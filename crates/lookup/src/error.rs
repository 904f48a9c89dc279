//! Error types for the lookup field.

use std::fmt;
use std::sync::Arc;

/// Errors reported by a lookup field.
///
/// Neither variant is fatal. The field always falls back to a safe state and
/// reports the error through its `on_error` or `on_search_error` callback.
#[derive(thiserror::Error, Debug, Clone)]
pub enum LookupError {
    /// A commit or seed named a key that is not in the option set.
    ///
    /// # Recovery
    ///
    /// The field falls back to no selection and empty text. Callers seeding
    /// a value should make sure the matching option is present, or call
    /// `set_options` first.
    #[error("no option with key {key} in the option set")]
    InvalidSelection {
        /// Debug rendering of the rejected key.
        key: String,
    },

    /// The remote search failed.
    ///
    /// # Recovery
    ///
    /// The loading state is cleared and the locally filtered options are
    /// shown again. Typing retries the search.
    #[error("search for {query:?} failed: {source}")]
    SearchFailure {
        /// The query that was sent.
        query: String,
        /// The collaborator's error.
        #[source]
        source: SearchError,
    },
}

impl LookupError {
    pub(crate) fn invalid_selection<K: fmt::Debug>(key: &K) -> Self {
        Self::InvalidSelection {
            key: format!("{key:?}"),
        }
    }
}

/// An opaque failure returned by a remote search.
///
/// Cheap to clone so that it can be handed to both the field and the caller's
/// error callback.
#[derive(Clone)]
pub struct SearchError(Arc<dyn std::error::Error + Send + Sync>);

impl SearchError {
    /// Wraps any error.
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Creates an error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        #[derive(Debug, thiserror::Error)]
        #[error("{0}")]
        struct Message(String);

        Self::new(Message(message.into()))
    }
}

impl fmt::Debug for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// A specialized [`Result`] type for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invalid_selection_display() {
        let err = LookupError::invalid_selection(&42);
        assert_eq!(err.to_string(), "no option with key 42 in the option set");
        let err = LookupError::invalid_selection(&"de");
        assert_eq!(err.to_string(), "no option with key \"de\" in the option set");
    }

    #[test]
    fn test_search_failure_keeps_source() {
        let err = LookupError::SearchFailure {
            query: "ap".into(),
            source: SearchError::msg("timeout"),
        };
        assert_eq!(err.to_string(), "search for \"ap\" failed: timeout");
        assert_eq!(err.source().unwrap().to_string(), "timeout");
    }

    #[test]
    fn test_search_error_wraps_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream timed out");
        let err = SearchError::new(io);
        let cloned = err.clone();
        assert_eq!(cloned.to_string(), "upstream timed out");
    }
}
