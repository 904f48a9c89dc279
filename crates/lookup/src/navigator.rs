//! Keyboard navigation.
//!
//! [`KeyMap`] turns a [`KeyMsg`] into a [`NavAction`]; the field applies the
//! action according to whether its panel is open. Highlight movement is
//! cyclic: moving past either end wraps to the other.

use lookup_runtime::KeyMsg;

use crate::key::{Binding, Hint};

/// What a key press asks the field to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Move the highlight down, opening the panel if it is closed.
    Next,
    /// Move the highlight up.
    Prev,
    /// Commit the highlighted option.
    Select,
    /// Close the panel without touching the value.
    Dismiss,
    /// Close the panel and let focus move on.
    TabOut,
    /// Delete the last grapheme of the text.
    DeleteBackward,
    /// Empty the text.
    ClearText,
    /// Append text.
    Insert(String),
    /// Nothing to do.
    Ignore,
}

/// Key bindings for a lookup field.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Highlight the next option.
    pub next: Binding,
    /// Highlight the previous option.
    pub prev: Binding,
    /// Commit the highlighted option.
    pub select: Binding,
    /// Close the panel.
    pub dismiss: Binding,
    /// Close the panel and move focus.
    pub tab_out: Binding,
    /// Delete one character backward.
    pub delete_backward: Binding,
    /// Delete all text.
    pub clear_text: Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            next: Binding::new(&["down", "ctrl+n"]).hint("↓", "next option"),
            prev: Binding::new(&["up", "ctrl+p"]).hint("↑", "previous option"),
            select: Binding::new(&["enter"]).hint("enter", "select"),
            dismiss: Binding::new(&["esc"]).hint("esc", "close"),
            tab_out: Binding::new(&["tab", "shift+tab"]).hint("tab", "leave field"),
            delete_backward: Binding::new(&["backspace"]),
            clear_text: Binding::new(&["ctrl+u"]),
        }
    }
}

impl KeyMap {
    /// Resolves a key press. Bindings take precedence over text input.
    pub fn action(&self, key: &KeyMsg) -> NavAction {
        let bound = [
            (&self.next, NavAction::Next),
            (&self.prev, NavAction::Prev),
            (&self.select, NavAction::Select),
            (&self.dismiss, NavAction::Dismiss),
            (&self.tab_out, NavAction::TabOut),
            (&self.delete_backward, NavAction::DeleteBackward),
            (&self.clear_text, NavAction::ClearText),
        ];
        for (binding, action) in bound {
            if binding.triggered_by(key) {
                return action;
            }
        }
        key.text().map_or(NavAction::Ignore, NavAction::Insert)
    }

    /// Hints for the active bindings that carry one, in navigation order.
    pub fn hints(&self) -> Vec<&Hint> {
        [
            &self.next,
            &self.prev,
            &self.select,
            &self.dismiss,
            &self.tab_out,
            &self.delete_backward,
            &self.clear_text,
        ]
        .into_iter()
        .filter(|b| b.is_active())
        .filter_map(Binding::get_hint)
        .collect()
    }
}

/// The highlight after moving down through `len` options.
#[must_use]
pub fn next_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i < len => (i + 1) % len,
        _ => 0,
    })
}

/// The highlight after moving up through `len` options.
#[must_use]
pub fn prev_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i < len => (i + len - 1) % len,
        _ => len - 1,
    })
}
