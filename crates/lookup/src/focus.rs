//! Panel visibility and the blur grace period.
//!
//! Blurring the input does not close the panel right away. Clicking an option
//! blurs the input before the click lands, so the close is deferred by a
//! grace delay; a commit inside that window closes the panel itself and the
//! deferred close then finds nothing left to do.

use std::time::Duration;

use lookup_runtime::Cmd;

use crate::messages::BlurGraceMsg;
use crate::timer::TimerSlot;

/// Default grace delay between blur and close.
pub const DEFAULT_BLUR_GRACE: Duration = Duration::from_millis(200);

/// Tracks whether the panel is open and whether the input has focus.
#[derive(Debug)]
pub struct PanelController {
    open: bool,
    focused: bool,
    touched: bool,
    grace: Duration,
    timer: TimerSlot,
}

impl PanelController {
    /// Creates a closed, unfocused controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            open: false,
            focused: false,
            touched: false,
            grace: DEFAULT_BLUR_GRACE,
            timer: TimerSlot::new(),
        }
    }

    /// Sets the grace delay.
    pub fn set_grace(&mut self, grace: Duration) {
        self.grace = grace;
    }

    /// Returns the grace delay.
    #[must_use]
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Whether the panel is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the input has focus.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether the field has been blurred at least once.
    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Whether a deferred close is pending.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.timer.is_pending()
    }

    /// Opens the panel. Returns whether it was closed before.
    pub fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    /// Closes the panel. Returns whether it was open before.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// Marks the input focused and drops any pending close.
    pub fn focus(&mut self) {
        self.focused = true;
        if self.timer.cancel() {
            tracing::trace!("focus returned inside the grace window");
        }
    }

    /// Marks the input blurred and schedules the deferred close for field `id`.
    pub fn blur(&mut self, id: u64) -> Cmd {
        self.focused = false;
        self.timer
            .schedule(self.grace, move |tag| BlurGraceMsg { id, tag })
    }

    /// Handles the end of the grace window.
    ///
    /// Returns `false` for an expiry that was cancelled or replaced. On an
    /// accepted expiry the panel is closed and the field becomes touched; the
    /// caller reconciles the text.
    pub fn expire(&mut self, tag: u64) -> bool {
        if !self.timer.accept(tag) {
            return false;
        }
        self.open = false;
        self.touched = true;
        true
    }

    /// Drops any pending close.
    pub fn cancel(&mut self) {
        self.timer.cancel();
    }
}

impl Default for PanelController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close_report_transitions() {
        let mut panel = PanelController::new();
        assert!(panel.open());
        assert!(!panel.open());
        assert!(panel.close());
        assert!(!panel.close());
    }

    #[test]
    fn test_blur_defers_close() {
        let mut panel = PanelController::new();
        panel.focus();
        panel.open();
        let cmd = panel.blur(7);
        assert_eq!(cmd.delay(), Some(DEFAULT_BLUR_GRACE));
        assert!(panel.is_open());
        assert!(!panel.is_focused());
        assert!(panel.is_closing());

        let msg = cmd.execute().unwrap().downcast::<BlurGraceMsg>().unwrap();
        assert_eq!(msg.id, 7);
        assert!(panel.expire(msg.tag));
        assert!(!panel.is_open());
        assert!(panel.is_touched());
    }

    #[test]
    fn test_refocus_cancels_deferred_close() {
        let mut panel = PanelController::new();
        panel.open();
        let cmd = panel.blur(1);
        panel.focus();
        assert!(cmd.is_cancelled());
        assert!(!panel.expire(1));
        assert!(panel.is_open());
        assert!(!panel.is_touched());
    }

    #[test]
    fn test_custom_grace() {
        let mut panel = PanelController::new();
        panel.set_grace(Duration::from_millis(50));
        let cmd = panel.blur(1);
        assert_eq!(cmd.delay(), Some(Duration::from_millis(50)));
    }
}
