//! Type-erased messages and the built-in message types.
//!
//! Messages are the only way to update a model. Key presses, focus changes
//! reported by the platform, timer expirations and async results all arrive
//! as messages.

use std::any::Any;
use std::fmt;

/// Any `Send + 'static` value, boxed so that models can receive events of
/// types they do not know about and ignore them.
///
/// # Example
///
/// ```rust
/// use lookup_runtime::Message;
///
/// struct Picked(u32);
///
/// let msg = Message::new(Picked(7));
/// if let Some(picked) = msg.downcast::<Picked>() {
///     assert_eq!(picked.0, 7);
/// }
/// ```
pub struct Message(Box<dyn Any + Send>);

impl Message {
    /// Boxes `msg`.
    pub fn new<M: Any + Send + 'static>(msg: M) -> Self {
        Self(Box::new(msg))
    }

    /// Unboxes the message if it holds an `M`.
    pub fn downcast<M: Any + Send + 'static>(self) -> Option<M> {
        self.0.downcast::<M>().ok().map(|b| *b)
    }

    /// Unboxes the message if it holds an `M`, handing it back otherwise.
    pub fn try_downcast<M: Any + Send + 'static>(self) -> Result<M, Self> {
        self.0.downcast::<M>().map(|b| *b).map_err(Self)
    }

    /// Borrows the payload if it is an `M`.
    pub fn downcast_ref<M: Any + Send + 'static>(&self) -> Option<&M> {
        self.0.downcast_ref::<M>()
    }

    /// Whether the payload is an `M`.
    pub fn is<M: Any + Send + 'static>(&self) -> bool {
        self.0.is::<M>()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message").finish_non_exhaustive()
    }
}

/// Stops the program once the messages queued before it are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitMsg;

/// Platform event: the focused input gained focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusMsg;

/// Platform event: the focused input lost focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurMsg;

/// Internal message carrying the commands of a [`batch`](crate::batch).
///
/// Executors unpack it and dispatch every command independently.
pub struct BatchMsg(pub Vec<super::Cmd>);

impl fmt::Debug for BatchMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BatchMsg").field(&self.0.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Typed(String);

    #[test]
    fn test_round_trips_payload() {
        let msg = Message::new(Typed("ap".into()));
        assert!(msg.is::<Typed>());
        assert_eq!(msg.downcast_ref::<Typed>(), Some(&Typed("ap".into())));
        assert_eq!(msg.downcast::<Typed>(), Some(Typed("ap".into())));
    }

    #[test]
    fn test_foreign_payload_is_rejected() {
        let msg = Message::new(QuitMsg);
        assert!(!msg.is::<Typed>());
        assert!(msg.downcast::<Typed>().is_none());
    }

    #[test]
    fn test_try_downcast_returns_message_on_mismatch() {
        let msg = Message::new("text");
        let msg = msg.try_downcast::<u8>().unwrap_err();
        assert_eq!(msg.downcast::<&str>(), Some("text"));
    }

    #[test]
    fn test_focus_messages_are_distinct() {
        let msg = Message::new(FocusMsg);
        assert!(msg.is::<FocusMsg>());
        assert!(!msg.is::<BlurMsg>());
    }
}
