//! Debounced remote search with last-request-wins ordering.
//!
//! Each text change restarts the debounce window. When the window closes the
//! dispatcher hands out the next request sequence number and remembers it as
//! current; only the response carrying the current number is applied. Older
//! responses are dropped without touching the field. Futures that were
//! superseded keep running to completion, their output is simply ignored.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use lookup_runtime::{Cmd, Message};

use crate::error::SearchError;
use crate::messages::{DebounceMsg, SearchResultMsg};
use crate::timer::TimerSlot;

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// The remote search collaborator.
pub type SearchFn<T> =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<Vec<T>, SearchError>> + Send + Sync>;

/// What to do with a search response.
#[derive(Debug)]
pub enum Resolution<T> {
    /// The response is current; show these options.
    Replace(Vec<T>),
    /// The current request failed.
    Failed(SearchError),
    /// A newer request superseded this one.
    Stale,
}

/// A request that left the debounce window.
pub struct Dispatched {
    /// Sequence number of the request.
    pub seq: u64,
    /// The async command performing the search, if a remote search is set.
    pub cmd: Option<Cmd>,
}

/// Debounces text changes into numbered search requests.
pub struct SearchDispatcher<T> {
    search: Option<SearchFn<T>>,
    debounce: Duration,
    timer: TimerSlot,
    next_seq: u64,
    current: Option<u64>,
    searching: bool,
}

impl<T> SearchDispatcher<T> {
    /// Creates a dispatcher with no remote search.
    #[must_use]
    pub fn new() -> Self {
        Self {
            search: None,
            debounce: DEFAULT_DEBOUNCE,
            timer: TimerSlot::new(),
            next_seq: 0,
            current: None,
            searching: false,
        }
    }

    /// Sets the remote search.
    pub fn set_search(&mut self, search: SearchFn<T>) {
        self.search = Some(search);
    }

    /// Sets the debounce window.
    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    /// Returns the debounce window.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Whether a remote search is configured.
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.search.is_some()
    }

    /// Whether a remote request is pending or in flight.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// Whether the debounce window is open.
    #[must_use]
    pub fn is_debouncing(&self) -> bool {
        self.timer.is_pending()
    }

    /// Sequence number of the request whose response will be accepted.
    #[must_use]
    pub fn current_seq(&self) -> Option<u64> {
        self.current
    }

    /// Restarts the debounce window for field `id`.
    ///
    /// Marks the dispatcher as searching right away when a remote search is
    /// configured.
    pub fn schedule(&mut self, id: u64) -> Cmd {
        if self.search.is_some() {
            self.searching = true;
        }
        tracing::debug!(
            field = id,
            debounce_ms = self.debounce.as_millis() as u64,
            "debounce scheduled"
        );
        self.timer
            .schedule(self.debounce, move |tag| DebounceMsg { id, tag })
    }

    /// Decides what a response with sequence number `seq` means.
    pub fn resolve(&mut self, seq: u64, result: Result<Vec<T>, SearchError>) -> Resolution<T> {
        if self.current != Some(seq) {
            tracing::trace!(seq, current = ?self.current, "discarding stale search response");
            return Resolution::Stale;
        }
        self.current = None;
        self.searching = false;
        match result {
            Ok(options) => Resolution::Replace(options),
            Err(err) => Resolution::Failed(err),
        }
    }

    /// Cancels the debounce window and ignores any in-flight response.
    pub fn supersede(&mut self) {
        self.timer.cancel();
        self.current = None;
        self.searching = false;
    }
}

impl<T: Send + 'static> SearchDispatcher<T> {
    /// Handles the end of a debounce window.
    ///
    /// Returns `None` for an expiry that was cancelled or replaced.
    pub fn fire(&mut self, id: u64, tag: u64, query: &str) -> Option<Dispatched> {
        if !self.timer.accept(tag) {
            tracing::trace!(field = id, tag, "ignoring superseded debounce expiry");
            return None;
        }
        self.next_seq += 1;
        let seq = self.next_seq;
        self.current = Some(seq);
        tracing::debug!(field = id, seq, query, "search dispatched");

        let cmd = self.search.as_ref().map(|search| {
            let query = query.to_string();
            let fut = search(query.clone());
            Cmd::future(async move {
                let result = fut.await;
                Message::new(SearchResultMsg {
                    id,
                    seq,
                    query,
                    result,
                })
            })
        });
        Some(Dispatched { seq, cmd })
    }
}

impl<T> Default for SearchDispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SearchDispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchDispatcher")
            .field("remote", &self.search.is_some())
            .field("debounce", &self.debounce)
            .field("timer", &self.timer)
            .field("next_seq", &self.next_seq)
            .field("current", &self.current)
            .field("searching", &self.searching)
            .finish()
    }
}

impl fmt::Debug for Dispatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatched")
            .field("seq", &self.seq)
            .field("cmd", &self.cmd.is_some())
            .finish()
    }
}
