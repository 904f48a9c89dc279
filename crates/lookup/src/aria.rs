//! Accessibility attributes for a lookup field.
//!
//! The field exposes the combobox pattern: the input carries `aria-expanded`,
//! `aria-controls` and `aria-activedescendant`; the panel is a `listbox`
//! whose children are `option`s with stable ids.

/// Id of the listbox for the field rendered as `element_id`.
#[must_use]
pub fn listbox_id(element_id: &str) -> String {
    format!("{element_id}-listbox")
}

/// Id of the option at `index` for the field rendered as `element_id`.
#[must_use]
pub fn option_id(element_id: &str, index: usize) -> String {
    format!("{element_id}-option-{index}")
}

/// Attributes of one option in the listbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionAria {
    /// Element id.
    pub id: String,
    /// Always `"option"`.
    pub role: &'static str,
    /// Whether the option is highlighted.
    pub selected: bool,
}

/// Attributes of the input and its listbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AriaAttrs {
    /// Element id of the input.
    pub id: String,
    /// Always `"combobox"`.
    pub role: &'static str,
    /// Whether the panel is open.
    pub expanded: bool,
    /// Id of the listbox.
    pub controls: String,
    /// Id of the highlighted option while the panel is open.
    pub active_descendant: Option<String>,
    /// Always `"list"`.
    pub autocomplete: &'static str,
    /// Whether an error is shown.
    pub invalid: bool,
    /// Whether a value is required.
    pub required: bool,
    /// Ids of the error and helper text.
    pub described_by: String,
    /// Always `"listbox"`.
    pub listbox_role: &'static str,
    /// One entry per visible option, present only while the panel is open.
    pub options: Vec<OptionAria>,
}

impl AriaAttrs {
    /// Builds the attributes for a field.
    #[must_use]
    pub fn new(
        element_id: &str,
        expanded: bool,
        highlighted: Option<usize>,
        option_count: usize,
    ) -> Self {
        let active = if expanded { highlighted } else { None };
        let options = if expanded {
            (0..option_count)
                .map(|index| OptionAria {
                    id: option_id(element_id, index),
                    role: "option",
                    selected: active == Some(index),
                })
                .collect()
        } else {
            Vec::new()
        };
        Self {
            id: element_id.to_string(),
            role: "combobox",
            expanded,
            controls: listbox_id(element_id),
            active_descendant: active.map(|index| option_id(element_id, index)),
            autocomplete: "list",
            invalid: false,
            required: false,
            described_by: format!("{element_id}-error {element_id}-helper"),
            listbox_role: "listbox",
            options,
        }
    }

    /// Sets `aria-invalid`.
    #[must_use]
    pub fn invalid(mut self, invalid: bool) -> Self {
        self.invalid = invalid;
        self
    }

    /// Sets `aria-required`.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// The input's attributes as name/value pairs, in a stable order.
    #[must_use]
    pub fn input_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("id", self.id.clone()),
            ("role", self.role.to_string()),
            ("aria-expanded", self.expanded.to_string()),
            ("aria-controls", self.controls.clone()),
            ("aria-autocomplete", self.autocomplete.to_string()),
            ("aria-invalid", self.invalid.to_string()),
            ("aria-required", self.required.to_string()),
            ("aria-describedby", self.described_by.clone()),
        ];
        if let Some(active) = &self.active_descendant {
            attrs.push(("aria-activedescendant", active.clone()));
        }
        attrs
    }
}
