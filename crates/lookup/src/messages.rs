//! Messages understood by [`LookupField`](crate::LookupField).
//!
//! Every message carries the id of the field it is meant for, so several
//! fields can share one program. Keys and focus changes use the runtime's
//! [`KeyMsg`](lookup_runtime::KeyMsg), [`FocusMsg`](lookup_runtime::FocusMsg)
//! and [`BlurMsg`](lookup_runtime::BlurMsg) and go to whichever field the
//! parent routes them to.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SearchError;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// The input's text was replaced by the platform (typing, paste, IME).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMsg {
    /// Target field.
    pub id: u64,
    /// The full new text.
    pub text: String,
}

/// An option in the panel was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionClickMsg {
    /// Target field.
    pub id: u64,
    /// Index into the visible options.
    pub index: usize,
}

/// The pointer moved over an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionHoverMsg {
    /// Target field.
    pub id: u64,
    /// Index into the visible options.
    pub index: usize,
}

/// The clear affordance was activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearMsg {
    /// Target field.
    pub id: u64,
}

/// The debounce window closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceMsg {
    /// Target field.
    pub id: u64,
    pub(crate) tag: u64,
}

/// The grace delay after a blur elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurGraceMsg {
    /// Target field.
    pub id: u64,
    pub(crate) tag: u64,
}

/// A remote search finished.
#[derive(Debug, Clone)]
pub struct SearchResultMsg<T> {
    /// Target field.
    pub id: u64,
    /// Request sequence number.
    pub seq: u64,
    /// The query that was sent.
    pub query: String,
    /// The collaborator's answer.
    pub result: Result<Vec<T>, SearchError>,
}
