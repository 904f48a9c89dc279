#![forbid(unsafe_code)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # lookup
//!
//! A searchable selection field: a text input that filters a local option
//! list, optionally runs a debounced remote search, and supports keyboard
//! navigation with open/close and selection semantics.
//!
//! The field is a [`Model`](lookup_runtime::Model) for the `lookup_runtime`
//! crate. It is assembled from small parts that can be used on their own:
//!
//! - [`value`] - the committed selection and the display text
//! - [`filter`] - pure, case-insensitive option filtering
//! - [`dispatch`] - debounced remote search with last-request-wins ordering
//! - [`navigator`] - key bindings and cyclic highlight movement
//! - [`focus`] - panel visibility and the blur grace period
//! - [`aria`] - combobox accessibility attributes
//!
//! ## Example
//!
//! ```rust
//! use lookup::prelude::*;
//! use lookup_runtime::simulator::ProgramSimulator;
//! use std::time::Duration;
//!
//! let field = LookupField::choices(vec![
//!     Choice::new("de", "Germany"),
//!     Choice::new("dk", "Denmark"),
//! ]);
//!
//! let mut sim = ProgramSimulator::new(field);
//! sim.init();
//! sim.send_and_settle(Message::new(FocusMsg));
//! sim.send_and_settle(Message::new(KeyMsg::from_char('k')));
//! assert_eq!(sim.model().visible_options().len(), 1);
//!
//! sim.send_and_settle(Message::new(BlurMsg));
//! sim.advance(Duration::from_millis(200));
//! assert!(!sim.model().is_open());
//! assert_eq!(sim.model().display_text(), "");
//! ```

pub mod aria;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod field;
pub mod filter;
pub mod focus;
pub mod key;
pub mod messages;
pub mod navigator;
pub mod option;
pub mod timer;
pub mod value;

pub use config::{ConfigError, LookupConfig};
pub use error::{LookupError, Result, SearchError};
pub use field::{LookupField, PanelState};
pub use option::{Choice, Projection};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::LookupConfig;
    pub use crate::error::{LookupError, SearchError};
    pub use crate::field::{LookupField, PanelState};
    pub use crate::messages::{ClearMsg, InputMsg, OptionClickMsg, OptionHoverMsg};
    pub use crate::option::{Choice, Projection};
    pub use lookup_runtime::{BlurMsg, Cmd, FocusMsg, KeyMsg, KeyType, Message, Model};
}
