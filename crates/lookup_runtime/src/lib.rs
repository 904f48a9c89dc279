#![forbid(unsafe_code)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # lookup_runtime
//!
//! A small Elm-Architecture runtime for interactive components.
//!
//! - **Model** - a component's state plus `init`/`update`/`view`
//! - **Message** - type-erased events (keys, focus changes, timer expirations, results)
//! - **Cmd** - lazily executed side effects; may be delayed, async, or cancellable
//!
//! Time only enters through commands, so a component can be tested with the
//! virtual clock in [`simulator`] and run for real on tokio with
//! [`Program`] (feature `async`).
//!
//! ## Example
//!
//! ```rust
//! use lookup_runtime::{Cmd, KeyMsg, KeyType, Message, Model};
//!
//! struct Toggle { on: bool }
//!
//! impl Model for Toggle {
//!     fn init(&self) -> Option<Cmd> { None }
//!
//!     fn update(&mut self, msg: Message) -> Option<Cmd> {
//!         if let Some(key) = msg.downcast_ref::<KeyMsg>() {
//!             if key.key_type == KeyType::Space {
//!                 self.on = !self.on;
//!             }
//!         }
//!         None
//!     }
//!
//!     fn view(&self) -> String {
//!         if self.on { "[x]".into() } else { "[ ]".into() }
//!     }
//! }
//! ```

pub mod command;
pub mod key;
pub mod message;
#[cfg(feature = "async")]
pub mod program;
pub mod simulator;

pub use command::{CancelToken, Cmd, batch, quit, tick};
pub use key::{KeyMsg, KeyType, UnknownKey};
pub use message::{BatchMsg, BlurMsg, FocusMsg, Message, QuitMsg};
#[cfg(feature = "async")]
pub use program::{Error, Program, ProgramHandle, Result};

/// The Model trait for interactive components.
///
/// Implement this trait to define a component's behavior.
///
/// # Example
///
/// ```rust
/// use lookup_runtime::{Model, Message, Cmd};
///
/// struct Counter { count: i32 }
///
/// impl Model for Counter {
///     fn init(&self) -> Option<Cmd> { None }
///
///     fn update(&mut self, msg: Message) -> Option<Cmd> {
///         if let Some(n) = msg.downcast::<i32>() {
///             self.count += n;
///         }
///         None
///     }
///
///     fn view(&self) -> String {
///         format!("Count: {}", self.count)
///     }
/// }
/// ```
pub trait Model: Send + 'static {
    /// Initialize the model and return an optional startup command.
    ///
    /// This is called once when the program starts.
    fn init(&self) -> Option<Cmd>;

    /// Process a message and return a new command.
    ///
    /// This is the pure update function at the heart of the Elm Architecture.
    fn update(&mut self, msg: Message) -> Option<Cmd>;

    /// Render the model as a string for display.
    ///
    /// This should be a pure function with no side effects.
    fn view(&self) -> String;
}
