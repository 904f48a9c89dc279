//! The committed selection and the text in the input.
//!
//! [`ValueStore`] only tracks state. Firing `on_change` and validating keys
//! against the option set is the field's job, so the store can be reasoned
//! about on its own.

/// Holds the committed key, its label, and the display text.
#[derive(Debug, Clone)]
pub struct ValueStore<K> {
    committed: Option<(K, String)>,
    text: String,
}

impl<K> ValueStore<K> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            committed: None,
            text: String::new(),
        }
    }

    /// Returns the committed key.
    pub fn committed_key(&self) -> Option<&K> {
        self.committed.as_ref().map(|(key, _)| key)
    }

    /// Returns the label of the committed option.
    pub fn committed_label(&self) -> Option<&str> {
        self.committed.as_ref().map(|(_, label)| label.as_str())
    }

    /// Returns the display text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Updates the display text only.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Commits `key` and shows `label`.
    pub fn commit(&mut self, key: K, label: String) {
        self.text.clone_from(&label);
        self.committed = Some((key, label));
    }

    /// Updates the label of the committed option.
    ///
    /// The text follows unless the user is editing it.
    pub fn relabel(&mut self, label: String) {
        let editing = self.is_editing();
        if let Some((_, current)) = self.committed.as_mut() {
            if !editing {
                self.text.clone_from(&label);
            }
            *current = label;
        }
    }

    /// Drops the selection and empties the text.
    pub fn clear(&mut self) {
        self.committed = None;
        self.text.clear();
    }

    /// Whether the text differs from what the committed state implies.
    pub fn is_editing(&self) -> bool {
        match self.committed_label() {
            Some(label) => self.text != label,
            None => !self.text.is_empty(),
        }
    }

    /// Restores the text after editing ends.
    ///
    /// Free text with no selection is dropped; a selection whose label was
    /// typed over gets its label back. Returns whether the text changed.
    pub fn reconcile(&mut self) -> bool {
        if !self.is_editing() {
            return false;
        }
        match &self.committed {
            Some((_, label)) => self.text.clone_from(label),
            None => self.text.clear(),
        }
        true
    }
}

impl<K> Default for ValueStore<K> {
    fn default() -> Self {
        Self::new()
    }
}
