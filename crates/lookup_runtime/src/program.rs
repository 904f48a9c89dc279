//! Program lifecycle and event loop on tokio.
//!
//! [`Program`] owns the model and processes one message at a time. Commands
//! returned from `update` run as tokio tasks: delayed commands sleep first,
//! async commands are awaited, and whatever message they produce is fed back
//! into the loop. Platform events (keys, focus changes) are injected through a
//! cloneable [`ProgramHandle`].

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Model;
use crate::command::Cmd;
use crate::message::{BatchMsg, Message, QuitMsg};

/// Errors that can occur when running a program.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The program's event channel is gone.
    ///
    /// Occurs when a [`ProgramHandle`] sends after the program has finished
    /// running and dropped its receiver.
    ///
    /// # Recovery
    ///
    /// Nothing to recover: the program has exited. Stop sending events.
    #[error("program event channel closed")]
    ChannelClosed,
}

/// A specialized [`Result`] type for program operations.
pub type Result<T> = std::result::Result<T, Error>;

type Renderer = Box<dyn FnMut(&str) + Send>;

/// A handle for injecting platform events into a running [`Program`].
#[derive(Debug, Clone)]
pub struct ProgramHandle {
    tx: UnboundedSender<Message>,
}

impl ProgramHandle {
    /// Send a message to the program.
    pub fn send(&self, msg: Message) -> Result<()> {
        self.tx.send(msg).map_err(|_| Error::ChannelClosed)
    }

    /// Ask the program to stop after the messages already queued.
    pub fn quit(&self) -> Result<()> {
        self.send(Message::new(QuitMsg))
    }
}

/// The tokio executor for a [`Model`].
///
/// # Example
///
/// ```rust,ignore
/// use lookup_runtime::{Message, Program};
///
/// let program = Program::new(my_model).with_renderer(|view| println!("{view}"));
/// let handle = program.handle();
/// handle.send(Message::new(lookup_runtime::FocusMsg))?;
/// handle.quit()?;
/// let model = program.run().await?;
/// ```
pub struct Program<M: Model> {
    model: M,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    renderer: Option<Renderer>,
}

impl<M: Model> Program<M> {
    /// Creates a new program for the given model.
    pub fn new(model: M) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            model,
            tx,
            rx,
            renderer: None,
        }
    }

    /// Call `render` with the model's view after init and after every update.
    #[must_use]
    pub fn with_renderer<F>(mut self, render: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.renderer = Some(Box::new(render));
        self
    }

    /// Returns a handle for sending events to this program.
    pub fn handle(&self) -> ProgramHandle {
        ProgramHandle {
            tx: self.tx.clone(),
        }
    }

    /// Runs the event loop until a [`QuitMsg`] arrives, returning the final model.
    pub async fn run(mut self) -> Result<M> {
        if let Some(cmd) = self.model.init() {
            self.spawn(cmd);
        }
        self.render();

        loop {
            let msg = self.rx.recv().await.ok_or(Error::ChannelClosed)?;
            if msg.is::<QuitMsg>() {
                tracing::debug!("quit requested");
                break;
            }
            match msg.try_downcast::<BatchMsg>() {
                Ok(BatchMsg(cmds)) => {
                    for cmd in cmds {
                        self.spawn(cmd);
                    }
                }
                Err(msg) => {
                    if let Some(cmd) = self.model.update(msg) {
                        self.spawn(cmd);
                    }
                    self.render();
                }
            }
        }

        Ok(self.model)
    }

    fn spawn(&self, cmd: Cmd) {
        if cmd.is_cancelled() {
            return;
        }
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Some(msg) = cmd.run(tokio::time::sleep).await {
                // The loop may already have exited; late results are dropped.
                let _ = tx.send(msg);
            }
        });
    }

    fn render(&mut self) {
        if let Some(render) = self.renderer.as_mut() {
            let view = self.model.view();
            render(&view);
        }
    }
}
