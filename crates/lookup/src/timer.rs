//! Cancellable one-shot timers.
//!
//! A [`TimerSlot`] holds at most one pending timer. Scheduling a new timer
//! cancels the previous one twice over: its [`CancelToken`] is tripped so
//! executors skip it, and the slot's tag moves on so that an expiry which was
//! already in a queue is rejected by [`TimerSlot::accept`].
//!
//! # Example
//!
//! ```rust
//! use lookup::timer::TimerSlot;
//! use std::time::Duration;
//!
//! struct Expired(u64);
//!
//! let mut slot = TimerSlot::new();
//! let first = slot.schedule(Duration::from_millis(300), Expired);
//! let _second = slot.schedule(Duration::from_millis(300), Expired);
//! assert!(first.is_cancelled());
//! assert!(slot.is_pending());
//! ```

use std::time::Duration;

use lookup_runtime::{CancelToken, Cmd, Message};

/// A slot for one pending, cancellable timer.
#[derive(Debug, Default)]
pub struct TimerSlot {
    tag: u64,
    token: Option<CancelToken>,
}

impl TimerSlot {
    /// Creates an idle slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any pending timer with one that fires after `delay`.
    ///
    /// `make` receives the new tag and builds the expiry message.
    pub fn schedule<F, M>(&mut self, delay: Duration, make: F) -> Cmd
    where
        F: FnOnce(u64) -> M + Send + 'static,
        M: Send + 'static,
    {
        self.cancel();
        self.tag = self.tag.wrapping_add(1);
        let tag = self.tag;
        let token = CancelToken::new();
        self.token = Some(token.clone());
        Cmd::new(move || Message::new(make(tag)))
            .delayed(delay)
            .cancel_with(token)
    }

    /// Cancels the pending timer, if any.
    ///
    /// Returns whether a timer was pending.
    pub fn cancel(&mut self) -> bool {
        match self.token.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns whether a timer is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the current tag.
    #[must_use]
    pub fn tag(&self) -> u64 {
        self.tag
    }

    /// Consumes an expiry carrying `tag`.
    ///
    /// Returns `true` only for the expiry of the timer still pending; the slot
    /// is idle afterwards. Expiries of replaced or cancelled timers return
    /// `false`.
    pub fn accept(&mut self, tag: u64) -> bool {
        if tag != self.tag || self.token.is_none() {
            return false;
        }
        self.token = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Fired(u64);

    #[test]
    fn test_schedule_builds_delayed_command() {
        let mut slot = TimerSlot::new();
        let cmd = slot.schedule(Duration::from_millis(200), Fired);
        assert_eq!(cmd.delay(), Some(Duration::from_millis(200)));
        assert!(slot.is_pending());
        let msg = cmd.execute().unwrap();
        assert_eq!(msg.downcast::<Fired>(), Some(Fired(1)));
    }

    #[test]
    fn test_reschedule_cancels_previous() {
        let mut slot = TimerSlot::new();
        let first = slot.schedule(Duration::from_millis(300), Fired);
        let second = slot.schedule(Duration::from_millis(300), Fired);
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!slot.accept(1));
        assert!(slot.accept(2));
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_accept_is_one_shot() {
        let mut slot = TimerSlot::new();
        let _cmd = slot.schedule(Duration::from_millis(10), Fired);
        let tag = slot.tag();
        assert!(slot.accept(tag));
        assert!(!slot.accept(tag));
    }

    #[test]
    fn test_cancel_rejects_queued_expiry() {
        let mut slot = TimerSlot::new();
        let cmd = slot.schedule(Duration::from_millis(10), Fired);
        assert!(slot.cancel());
        assert!(cmd.is_cancelled());
        assert!(!slot.accept(slot.tag()));
        assert!(!slot.cancel());
    }
}
