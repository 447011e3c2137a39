//! Synchronous driver for testing models without a real terminal.
//!
//! Commands are executed inline on the calling thread and their messages are
//! queued back into the model, so a whole form session can be replayed from a
//! list of key presses.

use std::collections::VecDeque;

use crate::key::KeyMsg;
use crate::runtime::{BatchMsg, Cmd, Message, Model, QuitMsg};

/// Statistics tracked during simulation.
#[derive(Debug, Clone, Default)]
pub struct SimulationStats {
    /// Number of times update() was called.
    pub update_calls: usize,
    /// Commands that were executed.
    pub commands_executed: usize,
    /// Whether quit was requested.
    pub quit_requested: bool,
}

/// A simulator for driving a [`Model`] without a terminal.
///
/// # Example
///
/// ```rust
/// use quire::{Cmd, Message, Model, Simulator};
///
/// struct Counter { count: i32 }
///
/// impl Model for Counter {
///     fn init(&self) -> Option<Cmd> { None }
///     fn update(&mut self, msg: Message) -> Option<Cmd> {
///         if let Some(n) = msg.downcast::<i32>() {
///             self.count += n;
///         }
///         None
///     }
///     fn view(&self) -> String {
///         format!("Count: {}", self.count)
///     }
/// }
///
/// let mut sim = Simulator::new(Counter { count: 0 });
/// sim.send(Message::new(5));
/// sim.send(Message::new(3));
/// sim.run_until_empty();
///
/// assert_eq!(sim.model().count, 8);
/// ```
pub struct Simulator<M: Model> {
    model: M,
    input_queue: VecDeque<Message>,
    output_views: Vec<String>,
    stats: SimulationStats,
    initialized: bool,
}

impl<M: Model> Simulator<M> {
    /// Upper bound on processed messages for [`run_until_empty`](Self::run_until_empty).
    pub const MAX_STEPS: usize = 10_000;

    /// Create a new simulator with the given model.
    pub fn new(model: M) -> Self {
        Self {
            model,
            input_queue: VecDeque::new(),
            output_views: Vec::new(),
            stats: SimulationStats::default(),
            initialized: false,
        }
    }

    /// Initialize the model and queue whatever its startup command yields.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let cmd = self.model.init();
        self.output_views.push(self.model.view());
        self.execute(cmd);
    }

    /// Queue a message for processing.
    pub fn send(&mut self, msg: Message) {
        self.input_queue.push_back(msg);
    }

    /// Queue a key press for processing.
    pub fn send_key(&mut self, key: KeyMsg) {
        self.send(Message::new(key));
    }

    /// Process one message from the queue, returning the command `update`
    /// produced without executing it.
    pub fn step(&mut self) -> Option<Cmd> {
        if !self.initialized {
            self.init();
        }

        let msg = self.input_queue.pop_front()?;
        if msg.is::<QuitMsg>() {
            self.stats.quit_requested = true;
            return None;
        }

        self.stats.update_calls += 1;
        let cmd = self.model.update(msg);
        self.output_views.push(self.model.view());
        cmd
    }

    /// Process messages until the queue drains or quit is requested,
    /// executing every returned command inline.
    ///
    /// Returns the number of messages processed.
    pub fn run_until_empty(&mut self) -> usize {
        if !self.initialized {
            self.init();
        }

        let mut processed = 0;
        while processed < Self::MAX_STEPS
            && !self.input_queue.is_empty()
            && !self.stats.quit_requested
        {
            let cmd = self.step();
            self.execute(cmd);
            processed += 1;
        }
        processed
    }

    fn execute(&mut self, cmd: Option<Cmd>) {
        let Some(cmd) = cmd else {
            return;
        };
        self.stats.commands_executed += 1;
        let Some(msg) = cmd.execute() else {
            return;
        };
        if !msg.is::<BatchMsg>() {
            self.input_queue.push_back(msg);
            return;
        }
        if let Some(BatchMsg(cmds)) = msg.downcast::<BatchMsg>() {
            for cmd in cmds {
                self.execute(Some(cmd));
            }
        }
    }

    /// Get a reference to the current model state.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the current model state.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Consume the simulator and return the final model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Get the simulation statistics.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Get all captured view outputs.
    pub fn views(&self) -> &[String] {
        &self.output_views
    }

    /// Get the most recent view output.
    pub fn last_view(&self) -> Option<&str> {
        self.output_views.last().map(String::as_str)
    }

    /// Check if quit has been requested.
    pub fn is_quit(&self) -> bool {
        self.stats.quit_requested
    }

    /// Get the number of pending messages.
    pub fn pending_count(&self) -> usize {
        self.input_queue.len()
    }
}
