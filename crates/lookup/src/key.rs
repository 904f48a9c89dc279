//! Named key bindings.
//!
//! A [`Binding`] lists key names in the form
//! [`KeyType::name`](lookup_runtime::KeyType::name) prints them (`"down"`,
//! `"ctrl+n"`, `"shift+tab"`) or, for printable input, the typed text itself.
//! A binding is triggered when the key press renders to one of its names.
//!
//! # Example
//!
//! ```rust
//! use lookup::key::Binding;
//! use lookup_runtime::{KeyMsg, KeyType};
//!
//! let next = Binding::new(&["down", "ctrl+n"]).hint("↓", "next option");
//!
//! assert!(next.triggered_by(&KeyMsg::from_type(KeyType::CtrlN)));
//! assert!(!next.triggered_by(&KeyMsg::from_char('x')));
//! ```

use lookup_runtime::KeyMsg;

/// A short description of a binding for on-screen hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    /// How the keys are shown, e.g. `"↓"`.
    pub keys: String,
    /// What the keys do.
    pub action: String,
}

/// A set of key names that trigger one action.
#[derive(Debug, Clone)]
pub struct Binding {
    names: Vec<String>,
    hint: Option<Hint>,
    active: bool,
}

impl Binding {
    /// Creates an active binding for `names`.
    #[must_use]
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(ToString::to_string).collect(),
            hint: None,
            active: true,
        }
    }

    /// Attaches a hint.
    #[must_use]
    pub fn hint(mut self, keys: impl Into<String>, action: impl Into<String>) -> Self {
        self.hint = Some(Hint {
            keys: keys.into(),
            action: action.into(),
        });
        self
    }

    /// Replaces the key names.
    pub fn rebind(&mut self, names: &[&str]) {
        self.names = names.iter().map(ToString::to_string).collect();
    }

    /// The key names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The hint, if one was attached.
    #[must_use]
    pub fn get_hint(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }

    /// Turns the binding on or off.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the binding can trigger: it is on and has at least one name.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active && !self.names.is_empty()
    }

    /// Whether `key` triggers this binding.
    ///
    /// Alt-modified keys only match names with an `alt+` prefix.
    #[must_use]
    pub fn triggered_by(&self, key: &KeyMsg) -> bool {
        if !self.is_active() {
            return false;
        }
        let name = key.to_string();
        self.names.iter().any(|n| *n == name)
    }
}
