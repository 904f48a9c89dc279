//! Commands for side effects.
//!
//! Commands represent IO operations that produce messages. They are the only
//! way to perform side effects in the Elm Architecture.
//!
//! # Command shapes
//!
//! A [`Cmd`] wraps either a synchronous closure or a future, and can carry
//! two pieces of scheduling metadata:
//!
//! - a **delay**, after which the executor runs it (timers, debouncing)
//! - a [`CancelToken`], checked right before the command runs and again
//!   before its message is delivered
//!
//! Executors (the [`ProgramSimulator`](crate::simulator::ProgramSimulator) and,
//! with the `async` feature, [`Program`](crate::Program)) honour both.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Either, select};

use crate::message::{BatchMsg, Message, QuitMsg};

/// A shared cancellation handle for scheduled commands.
///
/// Cloning the token shares its state. Once cancelled, every command holding
/// the token is dropped by the executor without running, and a delayed
/// command that is already sleeping on the tokio executor wakes up early.
/// Cancellation is plain shared state, so the token also works with the
/// runtime-free [`ProgramSimulator`](crate::simulator::ProgramSimulator).
pub use tokio_util::sync::CancellationToken as CancelToken;

enum CmdKind {
    Sync(Box<dyn FnOnce() -> Option<Message> + Send + 'static>),
    Async(BoxFuture<'static, Option<Message>>),
}

/// A command that produces a message when executed.
///
/// Commands are lazy - they don't execute until the executor runs them.
/// This keeps update functions pure: they only describe the work.
///
/// # Example
///
/// ```rust
/// use lookup_runtime::{Cmd, Message};
/// use std::time::Duration;
///
/// struct Expired;
///
/// // A message delivered 300ms after the executor receives the command
/// let cmd = Cmd::new(|| Message::new(Expired)).delayed(Duration::from_millis(300));
/// assert_eq!(cmd.delay(), Some(Duration::from_millis(300)));
/// ```
pub struct Cmd {
    kind: CmdKind,
    delay: Option<Duration>,
    token: Option<CancelToken>,
}

impl Cmd {
    /// Create a new command from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Message + Send + 'static,
    {
        Self::new_optional(move || Some(f()))
    }

    /// Create a command that may not produce a message.
    pub fn new_optional<F>(f: F) -> Self
    where
        F: FnOnce() -> Option<Message> + Send + 'static,
    {
        Self {
            kind: CmdKind::Sync(Box::new(f)),
            delay: None,
            token: None,
        }
    }

    /// Create a command from a future.
    ///
    /// The future is only polled once the executor runs the command.
    pub fn future<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Message> + Send + 'static,
    {
        Self {
            kind: CmdKind::Async(fut.map(Some).boxed()),
            delay: None,
            token: None,
        }
    }

    /// Create an async command that may not produce a message.
    pub fn future_optional<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Option<Message>> + Send + 'static,
    {
        Self {
            kind: CmdKind::Async(fut.boxed()),
            delay: None,
            token: None,
        }
    }

    /// Create an empty command that does nothing.
    pub fn none() -> Option<Self> {
        None
    }

    /// Run this command only after `delay` has elapsed.
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn cancel_with(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Returns the scheduling delay, if any.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// Removes and returns the delay so an executor can run the command later.
    pub(crate) fn take_delay(&mut self) -> Option<Duration> {
        self.delay.take()
    }

    /// Returns whether the command wraps a future.
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self.kind, CmdKind::Async(_))
    }

    /// Returns whether the attached token (if any) has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Execute the command on the current thread and return the resulting message.
    ///
    /// The delay is ignored; async commands are driven to completion with a
    /// local executor. Cancelled commands produce nothing.
    pub fn execute(self) -> Option<Message> {
        if self.is_cancelled() {
            return None;
        }
        let token = self.token;
        let msg = match self.kind {
            CmdKind::Sync(f) => f(),
            CmdKind::Async(fut) => futures::executor::block_on(fut),
        };
        if token.as_ref().is_some_and(CancelToken::is_cancelled) {
            return None;
        }
        msg
    }

    /// Execute the command asynchronously, honouring its delay.
    ///
    /// Used by runtime executors; the delay is slept with the supplied sleeper
    /// so that the command itself stays runtime-agnostic.
    pub async fn run<S, SFut>(self, sleep: S) -> Option<Message>
    where
        S: FnOnce(Duration) -> SFut,
        SFut: Future<Output = ()>,
    {
        if let Some(delay) = self.delay {
            let sleeping = pin!(sleep(delay));
            match &self.token {
                Some(token) => {
                    let cancelled = pin!(token.cancelled());
                    if let Either::Left(_) = select(cancelled, sleeping).await {
                        return None;
                    }
                }
                None => sleeping.await,
            }
        }
        if self.is_cancelled() {
            return None;
        }
        let token = self.token;
        let msg = match self.kind {
            CmdKind::Sync(f) => f(),
            CmdKind::Async(fut) => fut.await,
        };
        if token.as_ref().is_some_and(CancelToken::is_cancelled) {
            return None;
        }
        msg
    }
}

impl std::fmt::Debug for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cmd")
            .field("async", &self.is_async())
            .field("delay", &self.delay)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Batch multiple commands to run concurrently.
///
/// Commands in a batch run independently with no ordering guarantees.
/// Use this to return multiple commands from an update function.
///
/// # Example
///
/// ```rust
/// use lookup_runtime::{Cmd, Message, batch};
///
/// let cmd = batch(vec![
///     Some(Cmd::new(|| Message::new("first"))),
///     None,
///     Some(Cmd::new(|| Message::new("second"))),
/// ]);
/// assert!(cmd.is_some());
/// ```
pub fn batch(cmds: Vec<Option<Cmd>>) -> Option<Cmd> {
    let valid_cmds: Vec<Cmd> = cmds.into_iter().flatten().collect();

    match valid_cmds.len() {
        0 => None,
        1 => valid_cmds.into_iter().next(),
        _ => Some(Cmd::new(move || Message::new(BatchMsg(valid_cmds)))),
    }
}

/// Command that delivers a message after `duration`.
///
/// ```rust
/// use lookup_runtime::{Message, tick};
/// use std::time::Duration;
///
/// struct Wake;
///
/// let cmd = tick(Duration::from_millis(200), || Message::new(Wake));
/// assert_eq!(cmd.delay(), Some(Duration::from_millis(200)));
/// ```
pub fn tick<F>(duration: Duration, f: F) -> Cmd
where
    F: FnOnce() -> Message + Send + 'static,
{
    Cmd::new(f).delayed(duration)
}

/// Command that signals the program to quit.
pub fn quit() -> Cmd {
    Cmd::new(|| Message::new(QuitMsg))
}
