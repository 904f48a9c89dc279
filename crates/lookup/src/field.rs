//! The lookup field component.
//!
//! [`LookupField`] composes the value store, the option filter, the search
//! dispatcher, the keyboard navigator and the panel controller into one
//! [`Model`]. It can be driven by messages (inside a program) or by calling
//! its methods directly from a parent model; both paths share the same code.
//!
//! # Example
//!
//! ```rust
//! use lookup::{Choice, LookupField};
//! use lookup_runtime::{FocusMsg, KeyMsg, KeyType, Message, Model};
//!
//! let mut field = LookupField::choices(vec![
//!     Choice::new(1, "Apple"),
//!     Choice::new(2, "Banana"),
//! ]);
//!
//! field.update(Message::new(FocusMsg));
//! for c in "an".chars() {
//!     field.update(Message::new(KeyMsg::from_char(c)));
//! }
//! assert_eq!(field.visible_options().len(), 1);
//!
//! field.update(Message::new(KeyMsg::from_type(KeyType::Down)));
//! field.update(Message::new(KeyMsg::from_type(KeyType::Enter)));
//! assert_eq!(field.committed_key(), Some(&2));
//! assert_eq!(field.display_text(), "Banana");
//! assert!(!field.is_open());
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use lookup_runtime::{BlurMsg, Cmd, FocusMsg, KeyMsg, Message, Model};
use unicode_segmentation::UnicodeSegmentation;

use crate::aria::AriaAttrs;
use crate::config::LookupConfig;
use crate::dispatch::{Resolution, SearchDispatcher};
use crate::error::{LookupError, Result, SearchError};
use crate::filter::OptionFilter;
use crate::focus::PanelController;
use crate::messages::{
    BlurGraceMsg, ClearMsg, DebounceMsg, InputMsg, OptionClickMsg, OptionHoverMsg,
    SearchResultMsg, next_id,
};
use crate::navigator::{KeyMap, NavAction, next_index, prev_index};
use crate::option::{Choice, Projection};
use crate::value::ValueStore;

/// Called with the new selection after a commit or clear.
pub type ChangeFn<K> = Arc<dyn Fn(Option<&K>) + Send + Sync>;
/// Called with the query when a search is dispatched.
pub type QueryFn = Arc<dyn Fn(&str) + Send + Sync>;
/// Called with a recoverable error.
pub type ErrorFn = Arc<dyn Fn(&LookupError) + Send + Sync>;
/// Called on focus or blur.
pub type NotifyFn = Arc<dyn Fn() + Send + Sync>;
/// Renders one option line; the flag is set for the highlighted option.
pub type RenderFn<T> = Arc<dyn Fn(&T, bool) -> String + Send + Sync>;

/// Marker appended to the input line while the panel is open.
pub const OPEN_MARKER: char = '▴';
/// Marker appended to the input line while the panel is closed.
pub const CLOSED_MARKER: char = '▾';

/// What the option panel currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// The panel is closed.
    Hidden,
    /// A remote search is pending or in flight.
    Loading,
    /// Nothing matches the text.
    Empty,
    /// The visible options.
    Options,
}

/// A searchable selection field.
pub struct LookupField<T, K> {
    id: u64,
    element_id: String,
    label: String,
    helper_text: String,
    error_text: Option<String>,
    placeholder: String,
    no_options_message: String,
    loading_message: String,
    required: bool,
    disabled: bool,
    read_only: bool,
    controlled: bool,
    pending_error: Option<LookupError>,

    options: Vec<T>,
    remote: Vec<T>,
    visible: Vec<T>,
    highlighted: Option<usize>,

    projection: Projection<T, K>,
    filter: OptionFilter<T>,
    store: ValueStore<K>,
    dispatcher: SearchDispatcher<T>,
    panel: PanelController,
    keymap: KeyMap,
    render_option: Option<RenderFn<T>>,

    on_change: Option<ChangeFn<K>>,
    on_search: Option<QueryFn>,
    on_search_error: Option<ErrorFn>,
    on_error: Option<ErrorFn>,
    on_focus: Option<NotifyFn>,
    on_blur: Option<NotifyFn>,
}

impl<K> LookupField<Choice<K>, K>
where
    K: Clone + PartialEq + fmt::Debug + Send + 'static,
{
    /// Creates a field over [`Choice`] records.
    #[must_use]
    pub fn choices(options: Vec<Choice<K>>) -> Self {
        Self::new(options, Projection::choice())
    }
}

impl<T, K> LookupField<T, K>
where
    T: Clone + Send + 'static,
    K: Clone + PartialEq + fmt::Debug + Send + 'static,
{
    /// Creates a field over `options`, read through `projection`.
    #[must_use]
    pub fn new(options: Vec<T>, projection: Projection<T, K>) -> Self {
        let defaults = LookupConfig::default();
        let id = next_id();
        Self {
            id,
            element_id: format!("lookup-{id}"),
            label: String::new(),
            helper_text: String::new(),
            error_text: None,
            placeholder: defaults.placeholder,
            no_options_message: defaults.no_options_message,
            loading_message: defaults.loading_message,
            required: false,
            disabled: false,
            read_only: false,
            controlled: false,
            pending_error: None,
            visible: options.clone(),
            options,
            remote: Vec::new(),
            highlighted: None,
            projection,
            filter: OptionFilter::new(),
            store: ValueStore::new(),
            dispatcher: SearchDispatcher::new(),
            panel: PanelController::new(),
            keymap: KeyMap::default(),
            render_option: None,
            on_change: None,
            on_search: None,
            on_search_error: None,
            on_error: None,
            on_focus: None,
            on_blur: None,
        }
    }

    // ---------------------------------------------------------------------
    // Builder
    // ---------------------------------------------------------------------

    /// Sets the element id used for ARIA ids.
    #[must_use]
    pub fn element_id(mut self, element_id: impl Into<String>) -> Self {
        self.element_id = element_id.into();
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the helper text.
    #[must_use]
    pub fn helper_text(mut self, text: impl Into<String>) -> Self {
        self.helper_text = text.into();
        self
    }

    /// Sets the error text; the field is marked invalid while it is set.
    #[must_use]
    pub fn error_text(mut self, text: impl Into<String>) -> Self {
        self.error_text = Some(text.into());
        self
    }

    /// Sets the placeholder.
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the panel text shown when nothing matches.
    #[must_use]
    pub fn no_options_message(mut self, message: impl Into<String>) -> Self {
        self.no_options_message = message.into();
        self
    }

    /// Sets the panel text shown while searching.
    #[must_use]
    pub fn loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = message.into();
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Disables the field.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Makes the field read-only.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets how many characters are needed before filtering and searching.
    #[must_use]
    pub fn min_search_length(mut self, len: usize) -> Self {
        self.filter.set_min_query_len(len);
        self
    }

    /// Replaces the default case-insensitive label match.
    #[must_use]
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &T) -> bool + Send + Sync + 'static,
    {
        self.filter = self.filter.predicate(predicate);
        self
    }

    /// Sets the remote search.
    #[must_use]
    pub fn search<F, Fut>(mut self, search: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Vec<T>, SearchError>> + Send + 'static,
    {
        self.dispatcher
            .set_search(Arc::new(move |query| search(query).boxed()));
        self
    }

    /// Sets the debounce window.
    #[must_use]
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.dispatcher.set_debounce(debounce);
        self
    }

    /// Sets the delay between blur and close.
    #[must_use]
    pub fn blur_grace(mut self, grace: Duration) -> Self {
        self.panel.set_grace(grace);
        self
    }

    /// Applies a [`LookupConfig`].
    #[must_use]
    pub fn config(mut self, config: &LookupConfig) -> Self {
        self.dispatcher.set_debounce(config.debounce());
        self.panel.set_grace(config.blur_grace());
        self.filter.set_min_query_len(config.min_search_length);
        self.placeholder.clone_from(&config.placeholder);
        self.no_options_message.clone_from(&config.no_options_message);
        self.loading_message.clone_from(&config.loading_message);
        self
    }

    /// Replaces the key bindings.
    #[must_use]
    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Called after every commit and clear.
    #[must_use]
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&K>) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// Called when a search is dispatched. Enables debouncing even without a
    /// remote search.
    #[must_use]
    pub fn on_search<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_search = Some(Arc::new(f));
        self
    }

    /// Called when the remote search fails.
    #[must_use]
    pub fn on_search_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&LookupError) + Send + Sync + 'static,
    {
        self.on_search_error = Some(Arc::new(f));
        self
    }

    /// Called when a selection is rejected.
    ///
    /// A seed rejected by an earlier [`default_value`](Self::default_value)
    /// or [`value`](Self::value) call is reported here right away.
    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&LookupError) + Send + Sync + 'static,
    {
        if let Some(err) = self.pending_error.take() {
            f(&err);
        }
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Renders each option line in place of its label.
    #[must_use]
    pub fn render_option<F>(mut self, f: F) -> Self
    where
        F: Fn(&T, bool) -> String + Send + Sync + 'static,
    {
        self.render_option = Some(Arc::new(f));
        self
    }

    /// Called when the input gains focus.
    #[must_use]
    pub fn on_focus<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_focus = Some(Arc::new(f));
        self
    }

    /// Called when the input loses focus.
    #[must_use]
    pub fn on_blur<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_blur = Some(Arc::new(f));
        self
    }

    /// Seeds the initial selection of an uncontrolled field.
    ///
    /// A key missing from the options leaves the field empty and is
    /// reported through `on_error`, whether that is installed before or
    /// after this call.
    #[must_use]
    pub fn default_value(mut self, key: K) -> Self {
        self.controlled = false;
        self.seed_on_build(Some(key));
        self
    }

    /// Makes the field controlled and seeds its selection.
    ///
    /// The parent keeps the value in sync with [`set_value`](Self::set_value).
    #[must_use]
    pub fn value(mut self, key: Option<K>) -> Self {
        self.controlled = true;
        self.seed_on_build(key);
        self
    }

    // ---------------------------------------------------------------------
    // Rendering contract
    // ---------------------------------------------------------------------

    /// Returns the field's message id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the element id used for ARIA ids.
    #[must_use]
    pub fn get_element_id(&self) -> &str {
        &self.element_id
    }

    /// Returns the label.
    #[must_use]
    pub fn get_label(&self) -> &str {
        &self.label
    }

    /// Returns the placeholder.
    #[must_use]
    pub fn get_placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Returns the text in the input.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.store.text()
    }

    /// Returns the committed key.
    #[must_use]
    pub fn committed_key(&self) -> Option<&K> {
        self.store.committed_key()
    }

    /// Returns the committed option, if it is still among the known options.
    #[must_use]
    pub fn committed_option(&self) -> Option<&T> {
        let key = self.store.committed_key()?;
        self.find(key)
    }

    /// Whether the panel is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.panel.is_open()
    }

    /// The options the panel lists, in filter or search order.
    #[must_use]
    pub fn visible_options(&self) -> &[T] {
        &self.visible
    }

    /// The highlighted position in [`visible_options`](Self::visible_options).
    #[must_use]
    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted
    }

    /// The highlighted option.
    #[must_use]
    pub fn highlighted_option(&self) -> Option<&T> {
        self.highlighted.and_then(|i| self.visible.get(i))
    }

    /// Whether a remote search is pending or in flight.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.dispatcher.is_searching()
    }

    /// Whether the input has focus.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.panel.is_focused()
    }

    /// Whether the field has been blurred at least once.
    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.panel.is_touched()
    }

    /// Whether the field is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether the field is read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether the field is controlled by its parent.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    /// What the panel shows.
    #[must_use]
    pub fn panel(&self) -> PanelState {
        if !self.panel.is_open() {
            PanelState::Hidden
        } else if self.dispatcher.is_searching() {
            PanelState::Loading
        } else if self.visible.is_empty() {
            PanelState::Empty
        } else {
            PanelState::Options
        }
    }

    /// The status text of the panel, if it shows one.
    #[must_use]
    pub fn panel_message(&self) -> Option<&str> {
        match self.panel() {
            PanelState::Loading => Some(&self.loading_message),
            PanelState::Empty => Some(&self.no_options_message),
            PanelState::Hidden | PanelState::Options => None,
        }
    }

    /// Whether the clear affordance is offered.
    #[must_use]
    pub fn show_clear_button(&self) -> bool {
        self.store.committed_key().is_some() && !self.is_inert()
    }

    /// Whether the busy indicator is shown.
    #[must_use]
    pub fn show_spinner(&self) -> bool {
        self.dispatcher.is_searching()
    }

    /// The accessibility attributes for the current state.
    #[must_use]
    pub fn aria(&self) -> AriaAttrs {
        AriaAttrs::new(
            &self.element_id,
            self.panel.is_open(),
            self.highlighted,
            self.visible.len(),
        )
        .invalid(self.error_text.is_some())
        .required(self.required)
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Replaces the static options.
    ///
    /// A controlled selection picks up a changed label.
    pub fn set_options(&mut self, options: Vec<T>) {
        self.options = options;
        if self.controlled {
            if let Some(key) = self.store.committed_key().cloned() {
                if let Some(option) = self.find(&key) {
                    let label = self.projection.label(option);
                    self.store.relabel(label);
                }
            }
        }
        if !self.dispatcher.is_searching() {
            self.visible = self.local_matches();
            self.clamp_highlight();
        }
    }

    /// Resynchronises a controlled field with its parent's value.
    ///
    /// Does not fire `on_change`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidSelection`] if `key` is not among the
    /// options; the field falls back to no selection.
    pub fn set_value(&mut self, key: Option<K>) -> Result<()> {
        self.seed(key)
    }

    /// Sets or clears the error text.
    pub fn set_error_text(&mut self, text: Option<String>) {
        self.error_text = text;
    }

    /// Enables or disables the field. Disabling closes the panel.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.dispatcher.supersede();
            self.close_panel();
        }
    }

    /// Makes the field read-only or editable. Read-only closes the panel.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        if read_only {
            self.dispatcher.supersede();
            self.close_panel();
        }
    }

    /// Replaces the text, as typing or pasting does.
    pub fn input(&mut self, text: impl Into<String>) -> Option<Cmd> {
        if self.is_inert() {
            return None;
        }
        let text = text.into();
        if text == self.store.text() {
            return None;
        }
        self.edit(text)
    }

    /// Applies a key press.
    pub fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        if self.is_inert() {
            return None;
        }
        match self.keymap.action(key) {
            NavAction::Next => {
                if self.panel.is_open() {
                    self.highlighted = next_index(self.highlighted, self.visible.len());
                } else {
                    self.visible = self.local_matches();
                    self.open_panel();
                }
                None
            }
            NavAction::Prev => {
                if self.panel.is_open() {
                    self.highlighted = prev_index(self.highlighted, self.visible.len());
                }
                None
            }
            NavAction::Select => {
                if self.panel.is_open() {
                    if let Some(option) = self.highlighted_option().cloned() {
                        self.commit_option(option);
                    }
                }
                None
            }
            NavAction::Dismiss | NavAction::TabOut => {
                self.close_panel();
                None
            }
            NavAction::DeleteBackward => {
                let text = self.store.text();
                let cut = text.grapheme_indices(true).next_back().map(|(i, _)| i)?;
                let text = text[..cut].to_string();
                self.edit(text)
            }
            NavAction::ClearText => {
                if self.store.text().is_empty() {
                    return None;
                }
                self.edit(String::new())
            }
            NavAction::Insert(insert) => {
                let mut text = self.store.text().to_string();
                text.push_str(&insert);
                self.edit(text)
            }
            NavAction::Ignore => None,
        }
    }

    /// The input gained focus.
    pub fn focus(&mut self) -> Option<Cmd> {
        self.panel.focus();
        if let Some(cb) = &self.on_focus {
            cb();
        }
        if !self.is_inert() {
            self.visible = self.local_matches();
            self.clamp_highlight();
            self.open_panel();
        }
        None
    }

    /// The input lost focus. The panel closes after the grace delay.
    pub fn blur(&mut self) -> Option<Cmd> {
        if let Some(cb) = &self.on_blur {
            cb();
        }
        Some(self.panel.blur(self.id))
    }

    /// Moves the highlight to the visible option at `index`.
    pub fn hover(&mut self, index: usize) {
        if self.panel.is_open() && index < self.visible.len() {
            tracing::trace!(field = self.id, index, "hover");
            self.highlighted = Some(index);
        }
    }

    /// Commits the visible option at `index`, as a click does.
    pub fn select(&mut self, index: usize) -> Option<Cmd> {
        if self.is_inert() {
            return None;
        }
        let option = self.visible.get(index).cloned()?;
        self.commit_option(option);
        None
    }

    /// Commits the option with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidSelection`] if no static option or
    /// accepted remote result carries `key`. The panel closes and the field
    /// falls back to no selection without firing `on_change`.
    pub fn commit(&mut self, key: &K) -> Result<()> {
        match self.find(key).cloned() {
            Some(option) => {
                self.commit_option(option);
                Ok(())
            }
            None => {
                self.dispatcher.supersede();
                self.store.clear();
                self.close_panel();
                Err(self.reject(key))
            }
        }
    }

    /// Drops the selection and empties the text.
    ///
    /// Fires `on_change(None)` on every call.
    pub fn clear(&mut self) {
        self.dispatcher.supersede();
        self.store.clear();
        self.highlighted = None;
        self.visible = self.local_matches();
        tracing::debug!(field = self.id, "selection cleared");
        if let Some(cb) = &self.on_change {
            cb(None);
        }
    }

    /// Stops both timers and ignores any in-flight search.
    pub fn unmount(&mut self) {
        self.dispatcher.supersede();
        self.panel.cancel();
        tracing::debug!(field = self.id, "unmounted");
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn is_inert(&self) -> bool {
        self.disabled || self.read_only
    }

    fn find(&self, key: &K) -> Option<&T> {
        self.projection
            .find(&self.options, key)
            .or_else(|| self.projection.find(&self.remote, key))
    }

    fn local_matches(&self) -> Vec<T> {
        self.filter
            .apply(self.store.text(), &self.options, &self.projection)
    }

    fn clamp_highlight(&mut self) {
        if self.highlighted.is_some_and(|i| i >= self.visible.len()) {
            self.highlighted = None;
        }
    }

    fn open_panel(&mut self) {
        if self.panel.open() {
            self.highlighted = None;
            tracing::debug!(field = self.id, "panel opened");
        }
    }

    fn close_panel(&mut self) {
        self.highlighted = None;
        if self.panel.close() {
            tracing::debug!(field = self.id, "panel closed");
        }
    }

    fn edit(&mut self, text: String) -> Option<Cmd> {
        self.store.set_text(text);
        let cmd = self.schedule_search();
        self.visible = self.local_matches();
        self.open_panel();
        self.highlighted = None;
        cmd
    }

    fn schedule_search(&mut self) -> Option<Cmd> {
        if !self.dispatcher.has_remote() && self.on_search.is_none() {
            return None;
        }
        if self.filter.allows_search(self.store.text()) {
            Some(self.dispatcher.schedule(self.id))
        } else {
            self.dispatcher.supersede();
            None
        }
    }

    fn commit_option(&mut self, option: T) {
        let key = self.projection.key(&option);
        let label = self.projection.label(&option);
        self.dispatcher.supersede();
        tracing::debug!(field = self.id, key = ?key, "option committed");
        self.store.commit(key, label);
        self.close_panel();
        if let Some(cb) = &self.on_change {
            cb(self.store.committed_key());
        }
    }

    fn seed(&mut self, key: Option<K>) -> Result<()> {
        let Some(key) = key else {
            self.store.clear();
            return Ok(());
        };
        match self.find(&key) {
            Some(option) => {
                let label = self.projection.label(option);
                self.store.commit(key, label);
                Ok(())
            }
            None => {
                self.store.clear();
                Err(self.reject(&key))
            }
        }
    }

    fn seed_on_build(&mut self, key: Option<K>) {
        self.pending_error = None;
        if let Err(err) = self.seed(key) {
            if self.on_error.is_none() {
                self.pending_error = Some(err);
            }
        }
    }

    fn reject(&self, key: &K) -> LookupError {
        let err = LookupError::invalid_selection(key);
        tracing::warn!(field = self.id, error = %err, "invalid selection");
        if let Some(cb) = &self.on_error {
            cb(&err);
        }
        err
    }

    fn on_debounce(&mut self, tag: u64) -> Option<Cmd> {
        let query = self.store.text().to_string();
        let dispatched = self.dispatcher.fire(self.id, tag, &query)?;
        if let Some(cb) = &self.on_search {
            cb(&query);
        }
        dispatched.cmd
    }

    fn on_search_result(&mut self, msg: SearchResultMsg<T>) {
        match self.dispatcher.resolve(msg.seq, msg.result) {
            Resolution::Replace(options) => {
                tracing::debug!(
                    field = self.id,
                    seq = msg.seq,
                    count = options.len(),
                    "search results applied"
                );
                self.remote.clone_from(&options);
                self.visible = options;
                self.clamp_highlight();
            }
            Resolution::Failed(source) => {
                let err = LookupError::SearchFailure {
                    query: msg.query,
                    source,
                };
                tracing::warn!(field = self.id, error = %err, "search failed");
                self.visible = self.local_matches();
                self.clamp_highlight();
                if let Some(cb) = &self.on_search_error {
                    cb(&err);
                }
            }
            Resolution::Stale => {}
        }
    }

    fn on_blur_grace(&mut self, tag: u64) {
        let was_open = self.panel.is_open();
        if !self.panel.expire(tag) {
            return;
        }
        if was_open {
            tracing::debug!(field = self.id, "panel closed");
        }
        self.highlighted = None;
        self.dispatcher.supersede();
        if self.store.reconcile() {
            tracing::debug!(field = self.id, text = self.store.text(), "text reconciled");
        }
    }

    fn render_input_line(&self, out: &mut String) {
        let text = if self.store.text().is_empty() {
            self.placeholder.as_str()
        } else {
            self.store.text()
        };
        out.push_str("> ");
        out.push_str(text);
        if self.show_spinner() {
            out.push_str(" …");
        }
        if self.show_clear_button() {
            out.push_str(" ×");
        }
        out.push(' ');
        out.push(if self.panel.is_open() {
            OPEN_MARKER
        } else {
            CLOSED_MARKER
        });
    }
}

impl<T, K> Model for LookupField<T, K>
where
    T: Clone + Send + 'static,
    K: Clone + PartialEq + fmt::Debug + Send + 'static,
{
    fn init(&self) -> Option<Cmd> {
        None
    }

    fn update(&mut self, msg: Message) -> Option<Cmd> {
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            if !self.panel.is_focused() {
                return None;
            }
            return self.handle_key(key);
        }
        if msg.is::<FocusMsg>() {
            return self.focus();
        }
        if msg.is::<BlurMsg>() {
            return self.blur();
        }
        if let Some(&DebounceMsg { id, tag }) = msg.downcast_ref::<DebounceMsg>() {
            return if id == self.id {
                self.on_debounce(tag)
            } else {
                None
            };
        }
        if let Some(&BlurGraceMsg { id, tag }) = msg.downcast_ref::<BlurGraceMsg>() {
            if id == self.id {
                self.on_blur_grace(tag);
            }
            return None;
        }
        if let Some(&OptionClickMsg { id, index }) = msg.downcast_ref::<OptionClickMsg>() {
            return if id == self.id {
                self.select(index)
            } else {
                None
            };
        }
        if let Some(&OptionHoverMsg { id, index }) = msg.downcast_ref::<OptionHoverMsg>() {
            if id == self.id {
                self.hover(index);
            }
            return None;
        }
        if let Some(&ClearMsg { id }) = msg.downcast_ref::<ClearMsg>() {
            if id == self.id && !self.is_inert() {
                self.clear();
            }
            return None;
        }
        let msg = match msg.try_downcast::<InputMsg>() {
            Ok(input) => {
                return if input.id == self.id {
                    self.input(input.text)
                } else {
                    None
                };
            }
            Err(msg) => msg,
        };
        if let Some(result) = msg.downcast::<SearchResultMsg<T>>() {
            if result.id == self.id {
                self.on_search_result(result);
            }
        }
        None
    }

    fn view(&self) -> String {
        let mut out = String::new();

        if !self.label.is_empty() {
            out.push_str(&self.label);
            if self.required {
                out.push_str(" *");
            }
            out.push('\n');
        }

        self.render_input_line(&mut out);

        if self.panel.is_open() {
            match self.panel_message() {
                Some(message) => {
                    out.push_str("\n  ");
                    out.push_str(message);
                }
                None => {
                    for (index, option) in self.visible.iter().enumerate() {
                        let highlighted = self.highlighted == Some(index);
                        out.push('\n');
                        out.push_str(if highlighted { "> " } else { "  " });
                        match &self.render_option {
                            Some(render) => out.push_str(&render(option, highlighted)),
                            None => out.push_str(&self.projection.label(option)),
                        }
                    }
                }
            }
        }

        if let Some(error) = &self.error_text {
            out.push_str("\n! ");
            out.push_str(error);
        } else if !self.helper_text.is_empty() {
            out.push('\n');
            out.push_str(&self.helper_text);
        }

        out
    }
}

impl<T, K: fmt::Debug> fmt::Debug for LookupField<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupField")
            .field("id", &self.id)
            .field("element_id", &self.element_id)
            .field("committed", &self.store.committed_key())
            .field("text", &self.store.text())
            .field("open", &self.panel.is_open())
            .field("visible", &self.visible.len())
            .field("highlighted", &self.highlighted)
            .field("searching", &self.dispatcher.is_searching())
            .field("disabled", &self.disabled)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookup_runtime::KeyType;
    use parking_lot::Mutex;

    fn fruits() -> LookupField<Choice<u32>, u32> {
        LookupField::choices(vec![
            Choice::new(1, "Apple"),
            Choice::new(2, "Banana"),
            Choice::new(3, "Cherry"),
        ])
    }

    fn key(k: KeyType) -> KeyMsg {
        KeyMsg::from_type(k)
    }

    #[test]
    fn test_new_field_is_closed_and_empty() {
        let field = fruits();
        assert!(!field.is_open());
        assert_eq!(field.display_text(), "");
        assert_eq!(field.committed_key(), None);
        assert_eq!(field.highlighted_index(), None);
        assert_eq!(field.panel(), PanelState::Hidden);
        assert!(field.get_element_id().starts_with("lookup-"));
    }

    #[test]
    fn test_focus_opens_with_all_options() {
        let mut field = fruits();
        field.focus();
        assert!(field.is_open());
        assert_eq!(field.visible_options().len(), 3);
        assert_eq!(field.panel(), PanelState::Options);
    }

    #[test]
    fn test_typing_filters_and_resets_highlight() {
        let mut field = fruits();
        field.focus();
        field.handle_key(&key(KeyType::Down));
        assert_eq!(field.highlighted_index(), Some(0));
        field.handle_key(&KeyMsg::from_char('e'));
        assert_eq!(field.display_text(), "e");
        assert_eq!(field.visible_options().len(), 2);
        assert_eq!(field.highlighted_index(), None);
    }

    #[test]
    fn test_closed_arrow_down_opens_without_highlight() {
        let mut field = fruits();
        field.focus();
        field.handle_key(&key(KeyType::Esc));
        assert!(!field.is_open());
        field.handle_key(&key(KeyType::Down));
        assert!(field.is_open());
        assert_eq!(field.highlighted_index(), None);
    }

    #[test]
    fn test_closed_up_and_enter_do_nothing() {
        let mut field = fruits();
        field.handle_key(&key(KeyType::Up));
        field.handle_key(&key(KeyType::Enter));
        assert!(!field.is_open());
        assert_eq!(field.committed_key(), None);
    }

    #[test]
    fn test_enter_without_highlight_is_noop() {
        let mut field = fruits();
        field.focus();
        field.handle_key(&key(KeyType::Enter));
        assert!(field.is_open());
        assert_eq!(field.committed_key(), None);
    }

    #[test]
    fn test_escape_keeps_value() {
        let mut field = fruits().default_value(2);
        field.focus();
        field.handle_key(&KeyMsg::from_char('x'));
        field.handle_key(&key(KeyType::Esc));
        assert!(!field.is_open());
        assert_eq!(field.display_text(), "Bananax");
        assert_eq!(field.committed_key(), Some(&2));
    }

    #[test]
    fn test_tab_closes() {
        let mut field = fruits();
        field.focus();
        field.handle_key(&key(KeyType::Tab));
        assert!(!field.is_open());
    }

    #[test]
    fn test_backspace_removes_last_grapheme() {
        let mut field = fruits();
        field.focus();
        field.input("ae\u{301}");
        field.handle_key(&key(KeyType::Backspace));
        assert_eq!(field.display_text(), "a");
        field.handle_key(&key(KeyType::Backspace));
        field.handle_key(&key(KeyType::Backspace));
        assert_eq!(field.display_text(), "");
    }

    #[test]
    fn test_ctrl_u_clears_text() {
        let mut field = fruits();
        field.focus();
        field.input("ban");
        field.handle_key(&key(KeyType::CtrlU));
        assert_eq!(field.display_text(), "");
        assert_eq!(field.visible_options().len(), 3);
    }

    #[test]
    fn test_disabled_ignores_everything() {
        let mut field = fruits().disabled(true);
        field.focus();
        assert!(!field.is_open());
        assert!(field.input("ap").is_none());
        field.handle_key(&key(KeyType::Down));
        assert!(!field.is_open());
        assert_eq!(field.display_text(), "");
    }

    #[test]
    fn test_read_only_hides_clear_button() {
        let field = fruits().default_value(1).read_only(true);
        assert!(!field.show_clear_button());
        let field = fruits().default_value(1);
        assert!(field.show_clear_button());
    }

    #[test]
    fn test_commit_fires_on_change_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut field = fruits().on_change(move |k| sink.lock().push(k.copied()));
        field.focus();
        field.select(1);
        assert_eq!(field.committed_key(), Some(&2));
        assert_eq!(field.display_text(), "Banana");
        assert!(!field.is_open());
        assert_eq!(*seen.lock(), vec![Some(2)]);
    }

    #[test]
    fn test_invalid_commit_falls_back_to_empty() {
        let errors = Arc::new(Mutex::new(0));
        let changes = Arc::new(Mutex::new(0));
        let (error_sink, change_sink) = (Arc::clone(&errors), Arc::clone(&changes));
        let mut field = fruits()
            .default_value(1)
            .on_error(move |_| *error_sink.lock() += 1)
            .on_change(move |_| *change_sink.lock() += 1);
        field.focus();
        let err = field.commit(&9).unwrap_err();
        assert!(matches!(err, LookupError::InvalidSelection { .. }));
        assert_eq!(field.committed_key(), None);
        assert_eq!(field.display_text(), "");
        assert!(!field.is_open());
        assert_eq!(*errors.lock(), 1);
        assert_eq!(*changes.lock(), 0);
    }

    #[test]
    fn test_invalid_seed_leaves_field_empty() {
        let field = fruits().default_value(42);
        assert_eq!(field.committed_key(), None);
        assert_eq!(field.display_text(), "");
    }

    #[test]
    fn test_controlled_set_value_does_not_fire_on_change() {
        let calls = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&calls);
        let mut field = fruits()
            .value(Some(1))
            .on_change(move |_| *sink.lock() += 1);
        assert!(field.is_controlled());
        field.set_value(Some(3)).unwrap();
        assert_eq!(field.display_text(), "Cherry");
        field.set_value(None).unwrap();
        assert_eq!(field.display_text(), "");
        field.set_value(Some(1)).unwrap();
        assert!(field.set_value(Some(7)).is_err());
        assert_eq!(field.committed_key(), None);
        assert_eq!(field.display_text(), "");
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_rejected_seed_reaches_later_error_callback() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        let field = fruits()
            .default_value(42)
            .on_error(move |e| sink.lock().push(e.to_string()));
        assert_eq!(field.committed_key(), None);
        assert_eq!(errors.lock().len(), 1);
        assert!(errors.lock()[0].contains("42"));
    }

    #[test]
    fn test_rejected_seed_reported_once_either_order() {
        let errors = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&errors);
        let _field = fruits()
            .on_error(move |_| *sink.lock() += 1)
            .value(Some(42))
            .on_change(|_| {});
        assert_eq!(*errors.lock(), 1);
    }

    #[test]
    fn test_valid_reseed_drops_pending_error() {
        let errors = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&errors);
        let field = fruits()
            .default_value(42)
            .default_value(2)
            .on_error(move |_| *sink.lock() += 1);
        assert_eq!(field.committed_key(), Some(&2));
        assert_eq!(*errors.lock(), 0);
    }

    #[test]
    fn test_render_option_replaces_labels() {
        let mut field = fruits().render_option(|option: &Choice<u32>, highlighted| {
            if highlighted {
                format!("[{}] {}", option.value, option.label.to_uppercase())
            } else {
                format!("[{}] {}", option.value, option.label)
            }
        });
        field.focus();
        field.handle_key(&key(KeyType::Down));
        let view = field.view();
        assert!(view.contains("> [1] APPLE"));
        assert!(view.contains("  [2] Banana"));
        assert!(!view.contains("\n  Cherry"));
    }

    #[test]
    fn test_set_options_relabels_controlled_value() {
        let mut field = fruits().value(Some(2));
        field.set_options(vec![Choice::new(2, "Plantain")]);
        assert_eq!(field.display_text(), "Plantain");
        assert_eq!(field.visible_options().len(), 1);
    }

    #[test]
    fn test_hover_moves_highlight_only_when_open() {
        let mut field = fruits();
        field.hover(1);
        assert_eq!(field.highlighted_index(), None);
        field.focus();
        field.hover(1);
        assert_eq!(field.highlighted_index(), Some(1));
        field.hover(5);
        assert_eq!(field.highlighted_index(), Some(1));
    }

    #[test]
    fn test_empty_panel_message() {
        let mut field = fruits().no_options_message("Nothing");
        field.focus();
        field.input("zzz");
        assert_eq!(field.panel(), PanelState::Empty);
        assert_eq!(field.panel_message(), Some("Nothing"));
        field.handle_key(&key(KeyType::Down));
        assert_eq!(field.highlighted_index(), None);
    }

    #[test]
    fn test_config_applies_texts_and_threshold() {
        let config = LookupConfig {
            min_search_length: 2,
            placeholder: "Pick a fruit".into(),
            ..LookupConfig::default()
        };
        let mut field = fruits().config(&config);
        assert_eq!(field.get_placeholder(), "Pick a fruit");
        field.focus();
        field.input("z");
        assert_eq!(field.visible_options().len(), 3);
    }

    #[test]
    fn test_aria_tracks_highlight() {
        let mut field = fruits().element_id("fruit").error_text("Required");
        field.focus();
        field.handle_key(&key(KeyType::Up));
        let aria = field.aria();
        assert!(aria.expanded);
        assert!(aria.invalid);
        assert_eq!(aria.active_descendant.as_deref(), Some("fruit-option-2"));
    }

    #[test]
    fn test_view_renders_panel() {
        let mut field = fruits().label("Fruit").required(true);
        assert_eq!(field.view(), format!("Fruit *\n> Search... {CLOSED_MARKER}"));
        field.focus();
        field.handle_key(&key(KeyType::Down));
        let view = field.view();
        assert!(view.contains(OPEN_MARKER));
        assert!(view.contains("\n> Apple"));
        assert!(view.contains("\n  Banana"));
    }

    #[test]
    fn test_keys_ignored_until_focused() {
        let mut field = fruits();
        field.update(Message::new(KeyMsg::from_char('a')));
        assert_eq!(field.display_text(), "");
        field.update(Message::new(FocusMsg));
        field.update(Message::new(KeyMsg::from_char('a')));
        assert_eq!(field.display_text(), "a");
    }

    #[test]
    fn test_messages_for_other_fields_are_ignored() {
        let mut field = fruits();
        field.focus();
        let other = field.id() + 1000;
        field.update(Message::new(InputMsg {
            id: other,
            text: "ap".into(),
        }));
        field.update(Message::new(OptionClickMsg { id: other, index: 0 }));
        assert_eq!(field.display_text(), "");
        assert_eq!(field.committed_key(), None);

        let id = field.id();
        field.update(Message::new(InputMsg {
            id,
            text: "ap".into(),
        }));
        assert_eq!(field.display_text(), "ap");
    }
}
