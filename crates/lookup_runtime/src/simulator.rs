//! Program simulator with a virtual clock.
//!
//! This module provides a way to drive [`Model`] implementations without a
//! real platform or real time. Delayed commands are parked on a virtual
//! timeline that only moves when the test calls [`ProgramSimulator::advance`],
//! and async commands stay in flight until the test resolves them, in any
//! order it likes.

use std::collections::VecDeque;
use std::time::Duration;

use crate::Model;
use crate::command::Cmd;
use crate::message::{BatchMsg, Message, QuitMsg};

/// Counters collected while a simulation runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Messages handed to `update`.
    pub updates: usize,
    /// Views rendered, including the one after `init`.
    pub renders: usize,
    /// Delayed commands that reached their deadline and ran.
    pub timers_fired: usize,
    /// Commands dropped because their token was cancelled.
    pub timers_cancelled: usize,
    /// Async commands resolved by the test.
    pub async_resolved: usize,
}

struct PendingTimer {
    due: Duration,
    seq: u64,
    cmd: Cmd,
}

/// Runs a [`Model`] on a virtual clock with test-controlled async completion.
///
/// # Example
///
/// ```rust
/// use lookup_runtime::{Cmd, Message, Model, tick, simulator::ProgramSimulator};
/// use std::time::Duration;
///
/// struct Alarm { rang: bool }
/// struct Ring;
///
/// impl Model for Alarm {
///     fn init(&self) -> Option<Cmd> {
///         Some(tick(Duration::from_millis(100), || Message::new(Ring)))
///     }
///     fn update(&mut self, msg: Message) -> Option<Cmd> {
///         if msg.is::<Ring>() {
///             self.rang = true;
///         }
///         None
///     }
///     fn view(&self) -> String {
///         format!("rang: {}", self.rang)
///     }
/// }
///
/// let mut sim = ProgramSimulator::new(Alarm { rang: false });
/// sim.init();
/// sim.advance(Duration::from_millis(99));
/// assert!(!sim.model().rang);
/// sim.advance(Duration::from_millis(1));
/// assert!(sim.model().rang);
/// ```
pub struct ProgramSimulator<M: Model> {
    model: M,
    queue: VecDeque<Message>,
    timers: Vec<PendingTimer>,
    in_flight: VecDeque<Cmd>,
    now: Duration,
    next_timer_seq: u64,
    frames: Vec<String>,
    stats: SimStats,
    started: bool,
    quit: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// Wraps `model`. The clock starts at zero.
    pub fn new(model: M) -> Self {
        Self {
            model,
            queue: VecDeque::new(),
            timers: Vec::new(),
            in_flight: VecDeque::new(),
            now: Duration::ZERO,
            next_timer_seq: 0,
            frames: Vec::new(),
            stats: SimStats::default(),
            started: false,
            quit: false,
        }
    }

    /// Runs `Model::init` once and settles whatever it starts.
    pub fn init(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        if let Some(cmd) = self.model.init() {
            self.dispatch(cmd);
        }
        self.render();
        self.run_until_empty();
    }

    /// Queues a message without processing it.
    pub fn send(&mut self, msg: Message) {
        self.queue.push_back(msg);
    }

    /// Queue a message and process everything it triggers synchronously.
    pub fn send_and_settle(&mut self, msg: Message) -> usize {
        self.send(msg);
        self.run_until_empty()
    }

    /// Handles the next queued message and renders.
    ///
    /// The command `update` returns is handed back undispatched; pass it to
    /// [`dispatch`](Self::dispatch) or use
    /// [`run_until_empty`](Self::run_until_empty).
    pub fn step(&mut self) -> Option<Cmd> {
        if !self.started {
            self.init();
        }
        let msg = self.queue.pop_front()?;
        if msg.is::<QuitMsg>() {
            self.quit = true;
            return None;
        }
        self.stats.updates += 1;
        let cmd = self.model.update(msg);
        self.render();
        cmd
    }

    /// Hand a command to the simulated executor.
    ///
    /// Delayed commands go onto the virtual timeline, async commands are kept
    /// in flight, and synchronous commands run immediately with their message
    /// queued for the next [`step`](Self::step).
    pub fn dispatch(&mut self, mut cmd: Cmd) {
        if cmd.is_cancelled() {
            self.stats.timers_cancelled += 1;
            return;
        }
        if let Some(delay) = cmd.take_delay() {
            let seq = self.next_timer_seq;
            self.next_timer_seq += 1;
            self.timers.push(PendingTimer {
                due: self.now + delay,
                seq,
                cmd,
            });
            return;
        }
        if cmd.is_async() {
            self.in_flight.push_back(cmd);
            return;
        }
        if let Some(msg) = cmd.execute() {
            self.deliver(msg);
        }
    }

    /// Apply a direct model mutation that may return a command, then settle.
    ///
    /// This mirrors what a parent model does when it calls a component method
    /// such as `focus()` from inside its own update.
    pub fn apply<F>(&mut self, f: F)
    where
        F: FnOnce(&mut M) -> Option<Cmd>,
    {
        if !self.started {
            self.init();
        }
        if let Some(cmd) = f(&mut self.model) {
            self.dispatch(cmd);
        }
        self.render();
        self.run_until_empty();
    }

    /// Drains the queue, dispatching every command along the way, and
    /// returns how many messages were taken. Stops early at a [`QuitMsg`].
    pub fn run_until_empty(&mut self) -> usize {
        let mut processed = 0;
        while !self.queue.is_empty() && !self.quit {
            if let Some(cmd) = self.step() {
                self.dispatch(cmd);
            }
            processed += 1;
        }
        processed
    }

    /// Move the virtual clock forward, firing every timer that comes due.
    ///
    /// Timers fire in deadline order (ties in scheduling order), and the
    /// messages each one produces are fully processed before the next timer
    /// is considered, so timers scheduled along the way also fire if they
    /// fall inside the window.
    pub fn advance(&mut self, by: Duration) {
        let target = self.now + by;
        loop {
            self.drop_cancelled_timers();
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= target)
                .min_by_key(|(_, t)| (t.due, t.seq))
                .map(|(i, _)| i);
            let Some(index) = next else {
                break;
            };
            let timer = self.timers.swap_remove(index);
            self.now = timer.due;
            self.stats.timers_fired += 1;
            self.dispatch(timer.cmd);
            self.run_until_empty();
        }
        self.now = target;
    }

    /// Resolve the oldest in-flight async command.
    ///
    /// Returns `false` when nothing is in flight.
    pub fn resolve_next(&mut self) -> bool {
        self.resolve_at(0)
    }

    /// Resolve the newest in-flight async command.
    pub fn resolve_last(&mut self) -> bool {
        match self.in_flight.len() {
            0 => false,
            n => self.resolve_at(n - 1),
        }
    }

    /// Resolve the in-flight async command at `index` (oldest first).
    pub fn resolve_at(&mut self, index: usize) -> bool {
        let Some(cmd) = self.in_flight.remove(index) else {
            return false;
        };
        self.stats.async_resolved += 1;
        if let Some(msg) = cmd.execute() {
            self.deliver(msg);
        }
        self.run_until_empty();
        true
    }

    /// Resolve every in-flight command in issue order, including ones issued
    /// while resolving.
    pub fn resolve_all(&mut self) -> usize {
        let mut resolved = 0;
        while self.resolve_next() {
            resolved += 1;
        }
        resolved
    }

    /// The model under test.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The model under test, mutably. Commands are not collected; use
    /// [`apply`](Self::apply) for mutations that return one.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Ends the simulation.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Counters collected so far.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Every rendered view, oldest first.
    pub fn views(&self) -> &[String] {
        &self.frames
    }

    /// The latest rendered view.
    pub fn last_view(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    /// The current virtual time, measured from simulator creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of scheduled timers that have not been cancelled.
    pub fn pending_timers(&self) -> usize {
        self.timers.iter().filter(|t| !t.cmd.is_cancelled()).count()
    }

    /// Deadline of the earliest live timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers
            .iter()
            .filter(|t| !t.cmd.is_cancelled())
            .map(|t| t.due)
            .min()
    }

    /// Number of async commands waiting to be resolved.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether a [`QuitMsg`] has been handled.
    pub fn is_quit(&self) -> bool {
        self.quit
    }

    /// Messages queued but not yet handled.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    fn deliver(&mut self, msg: Message) {
        match msg.try_downcast::<BatchMsg>() {
            Ok(BatchMsg(cmds)) => {
                for cmd in cmds {
                    self.dispatch(cmd);
                }
            }
            Err(msg) => self.queue.push_back(msg),
        }
    }

    fn drop_cancelled_timers(&mut self) {
        let before = self.timers.len();
        self.timers.retain(|t| !t.cmd.is_cancelled());
        self.stats.timers_cancelled += before - self.timers.len();
    }

    fn render(&mut self) {
        self.stats.renders += 1;
        self.frames.push(self.model.view());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CancelToken, batch, tick};

    /// Collects the letters it receives and runs one queued follow-up command.
    #[derive(Default)]
    struct Typist {
        text: String,
        follow_up: Option<Cmd>,
    }

    impl Model for Typist {
        fn init(&self) -> Option<Cmd> {
            None
        }

        fn update(&mut self, msg: Message) -> Option<Cmd> {
            if let Some(c) = msg.downcast::<char>() {
                self.text.push(c);
            }
            self.follow_up.take()
        }

        fn view(&self) -> String {
            format!("[{}]", self.text)
        }
    }

    fn letter(c: char) -> impl FnOnce() -> Message + Send + 'static {
        move || Message::new(c)
    }

    #[test]
    fn test_init_runs_once() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        sim.init();
        assert_eq!(sim.stats().renders, 1);
        assert_eq!(sim.views(), &["[]"]);
    }

    #[test]
    fn test_step_handles_one_message() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        sim.send(Message::new('a'));
        sim.send(Message::new('b'));
        assert_eq!(sim.pending_count(), 2);

        sim.step();
        assert_eq!(sim.model().text, "a");
        assert_eq!(sim.pending_count(), 1);
        assert_eq!(sim.stats().updates, 1);
    }

    #[test]
    fn test_quit_stops_the_queue() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        sim.send(Message::new('a'));
        sim.send(Message::new(QuitMsg));
        sim.send(Message::new('b'));

        assert_eq!(sim.run_until_empty(), 2);
        assert!(sim.is_quit());
        assert_eq!(sim.into_model().text, "a");
    }

    #[test]
    fn test_delayed_command_waits_for_virtual_time() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        sim.dispatch(tick(Duration::from_millis(300), letter('x')));

        assert_eq!(sim.pending_timers(), 1);
        assert_eq!(sim.next_deadline(), Some(Duration::from_millis(300)));

        sim.advance(Duration::from_millis(299));
        assert_eq!(sim.model().text, "");

        sim.advance(Duration::from_millis(1));
        assert_eq!(sim.model().text, "x");
        assert_eq!(sim.pending_timers(), 0);
        assert_eq!(sim.now(), Duration::from_millis(300));
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        let token = CancelToken::new();
        sim.dispatch(tick(Duration::from_millis(50), letter('x')).cancel_with(token.clone()));
        token.cancel();

        assert_eq!(sim.pending_timers(), 0);
        assert_eq!(sim.next_deadline(), None);
        sim.advance(Duration::from_secs(1));
        assert_eq!(sim.model().text, "");
        assert_eq!(sim.stats().timers_fired, 0);
        assert_eq!(sim.stats().timers_cancelled, 1);
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        sim.dispatch(tick(Duration::from_millis(20), letter('c')));
        sim.dispatch(tick(Duration::from_millis(10), letter('a')));
        sim.dispatch(tick(Duration::from_millis(10), letter('b')));

        sim.advance(Duration::from_millis(15));
        assert_eq!(sim.model().text, "ab");
        sim.advance(Duration::from_millis(5));
        assert_eq!(sim.model().text, "abc");
    }

    #[test]
    fn test_timer_scheduled_by_timer_fires_within_window() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        sim.model_mut().follow_up = Some(tick(Duration::from_millis(10), letter('b')));
        sim.dispatch(tick(Duration::from_millis(10), letter('a')));

        sim.advance(Duration::from_millis(20));
        assert_eq!(sim.model().text, "ab");
    }

    #[test]
    fn test_async_commands_resolve_in_chosen_order() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        sim.dispatch(Cmd::future(async { Message::new('a') }));
        sim.dispatch(Cmd::future(async { Message::new('b') }));
        sim.dispatch(Cmd::future(async { Message::new('c') }));
        assert_eq!(sim.in_flight_count(), 3);

        assert!(sim.resolve_last());
        assert!(sim.resolve_at(1));
        assert!(sim.resolve_next());
        assert!(!sim.resolve_next());
        assert_eq!(sim.model().text, "cba");
        assert_eq!(sim.stats().async_resolved, 3);
    }

    #[test]
    fn test_batch_is_unpacked() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        let cmd = batch(vec![
            Some(Cmd::new(letter('a'))),
            Some(tick(Duration::from_millis(5), letter('b'))),
            Some(Cmd::future(async { Message::new('c') })),
        ])
        .unwrap();
        sim.dispatch(cmd);
        sim.run_until_empty();

        assert_eq!(sim.model().text, "a");
        assert_eq!(sim.pending_timers(), 1);
        assert_eq!(sim.in_flight_count(), 1);

        sim.advance(Duration::from_millis(5));
        assert_eq!(sim.resolve_all(), 1);
        assert_eq!(sim.model().text, "abc");
    }

    #[test]
    fn test_apply_dispatches_and_renders() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.apply(|m| {
            m.text.push('k');
            Some(Cmd::new(letter('i')))
        });
        assert_eq!(sim.model().text, "ki");
        assert_eq!(sim.last_view(), Some("[ki]"));
    }

    #[test]
    fn test_send_and_settle_reports_processed() {
        let mut sim = ProgramSimulator::new(Typist::default());
        sim.init();
        sim.model_mut().follow_up = Some(Cmd::new(letter('z')));
        assert_eq!(sim.send_and_settle(Message::new('y')), 2);
        assert_eq!(sim.model().text, "yz");
    }
}
