//! Country data and a simulated remote search over it.

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use lookup::{Choice, SearchError};

const LOCAL: &[(&str, &str)] = &[
    ("AT", "Austria"),
    ("BE", "Belgium"),
    ("CA", "Canada"),
    ("DK", "Denmark"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("NO", "Norway"),
    ("ES", "Spain"),
];

const REMOTE_ONLY: &[(&str, &str)] = &[
    ("AR", "Argentina"),
    ("AU", "Australia"),
    ("BR", "Brazil"),
    ("CL", "Chile"),
    ("FI", "Finland"),
    ("GR", "Greece"),
    ("IS", "Iceland"),
    ("IE", "Ireland"),
    ("NL", "Netherlands"),
    ("NZ", "New Zealand"),
    ("PT", "Portugal"),
    ("SE", "Sweden"),
    ("CH", "Switzerland"),
];

/// The options the field starts with.
pub fn local_options() -> Vec<Choice<String>> {
    LOCAL
        .iter()
        .map(|&(code, name)| Choice::new(code.to_string(), name))
        .collect()
}

/// A stand-in for a country search service.
///
/// Every query takes `latency` to answer. A query equal to `fail_on`
/// (case-insensitive) fails instead.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    latency: Duration,
    fail_on: Option<String>,
}

impl RemoteCatalog {
    /// Creates a catalog that answers after `latency`.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fail_on: None,
        }
    }

    /// Makes the given query fail.
    #[must_use]
    pub fn fail_on(mut self, query: Option<String>) -> Self {
        self.fail_on = query.map(|q| q.to_lowercase());
        self
    }

    /// Returns every known country whose name contains `query`.
    pub fn matches(query: &str) -> Vec<Choice<String>> {
        let needle = query.to_lowercase();
        LOCAL
            .iter()
            .chain(REMOTE_ONLY)
            .filter(|(_, name)| name.to_lowercase().contains(&needle))
            .map(|&(code, name)| Choice::new(code.to_string(), name))
            .collect()
    }

    /// Runs one search.
    pub fn search(
        &self,
        query: String,
    ) -> BoxFuture<'static, Result<Vec<Choice<String>>, SearchError>> {
        let latency = self.latency;
        let fails = self.fail_on.as_deref() == Some(query.to_lowercase().as_str());
        async move {
            tokio::time::sleep(latency).await;
            tracing::debug!(%query, fails, "remote catalog answered");
            if fails {
                Err(SearchError::msg(format!("catalog unavailable for {query:?}")))
            } else {
                Ok(Self::matches(&query))
            }
        }
        .boxed()
    }
}
