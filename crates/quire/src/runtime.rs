//! The Elm-architecture boundary between forms and the terminal runtime.
//!
//! A [`Model`] is initialized once, receives one [`Message`] at a time through
//! [`Model::update`], and renders itself with [`Model::view`]. Side effects are
//! expressed as [`Cmd`]s that the runtime executes and feeds back as messages.
//! Deferred evaluation of field titles and options travels through this same
//! channel.

use std::any::Any;
use std::fmt;
use std::time::{Duration, Instant};

/// A type-erased message container.
///
/// Messages can be any type that is `Send + 'static`. Use [`Message::new`] to
/// create a message and [`Message::downcast`] to retrieve the original type.
///
/// # Example
///
/// ```rust
/// use quire::Message;
///
/// struct MyMsg(i32);
///
/// let msg = Message::new(MyMsg(42));
/// if let Some(my_msg) = msg.downcast::<MyMsg>() {
///     assert_eq!(my_msg.0, 42);
/// }
/// ```
pub struct Message(Box<dyn Any + Send>);

impl Message {
    /// Create a new message from any sendable type.
    pub fn new<M: Any + Send + 'static>(msg: M) -> Self {
        Self(Box::new(msg))
    }

    /// Try to downcast to a specific message type.
    pub fn downcast<M: Any + Send + 'static>(self) -> Option<M> {
        self.0.downcast::<M>().ok().map(|b| *b)
    }

    /// Try to get a reference to the message as a specific type.
    pub fn downcast_ref<M: Any + Send + 'static>(&self) -> Option<&M> {
        self.0.downcast_ref::<M>()
    }

    /// Check if the message is of a specific type.
    pub fn is<M: Any + Send + 'static>(&self) -> bool {
        self.0.is::<M>()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message").finish_non_exhaustive()
    }
}

/// Message asking the runtime to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitMsg;

/// Message carrying commands to run concurrently.
pub struct BatchMsg(pub Vec<Cmd>);

/// A command that produces a message when executed.
///
/// Commands are lazy: nothing runs until the runtime executes them, which
/// keeps [`Model::update`] free of side effects.
pub struct Cmd(Box<dyn FnOnce() -> Option<Message> + Send + 'static>);

impl Cmd {
    /// Create a new command from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Message + Send + 'static,
    {
        Self(Box::new(move || Some(f())))
    }

    /// Create a command that may not produce a message.
    pub fn new_optional<F>(f: F) -> Self
    where
        F: FnOnce() -> Option<Message> + Send + 'static,
    {
        Self(Box::new(f))
    }

    /// Create a command that immediately yields `msg`.
    pub fn message<M: Any + Send + 'static>(msg: M) -> Self {
        Self::new(move || Message::new(msg))
    }

    /// Execute the command and return the resulting message.
    pub fn execute(self) -> Option<Message> {
        (self.0)()
    }
}

impl fmt::Debug for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmd").finish_non_exhaustive()
    }
}

/// Batch multiple commands to run concurrently.
///
/// `None` entries are dropped; a single remaining command is returned as-is.
pub fn batch(cmds: Vec<Option<Cmd>>) -> Option<Cmd> {
    let valid_cmds: Vec<Cmd> = cmds.into_iter().flatten().collect();

    match valid_cmds.len() {
        0 => None,
        1 => valid_cmds.into_iter().next(),
        _ => Some(Cmd::new(move || Message::new(BatchMsg(valid_cmds)))),
    }
}

/// Command that signals the runtime to quit.
pub fn quit() -> Cmd {
    Cmd::new(|| Message::new(QuitMsg))
}

/// Command that ticks after a duration.
///
/// To create periodic ticks, return another tick command from the update
/// function when handling the tick message.
pub fn tick<F>(duration: Duration, f: F) -> Cmd
where
    F: FnOnce(Instant) -> Message + Send + 'static,
{
    Cmd::new(move || {
        std::thread::sleep(duration);
        f(Instant::now())
    })
}

/// The Elm-architecture contract implemented by forms, groups and spinners.
pub trait Model: Send + 'static {
    /// Initialize the model and return an optional startup command.
    fn init(&self) -> Option<Cmd>;

    /// Process a message and return a follow-up command.
    fn update(&mut self, msg: Message) -> Option<Cmd>;

    /// Render the model as a string for display.
    fn view(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_downcast() {
        struct TestMsg(i32);

        let msg = Message::new(TestMsg(42));
        assert!(msg.is::<TestMsg>());
        let inner = msg.downcast::<TestMsg>().unwrap();
        assert_eq!(inner.0, 42);
    }

    #[test]
    fn test_message_downcast_wrong_type() {
        struct TestMsg1;
        struct TestMsg2;

        let msg = Message::new(TestMsg1);
        assert!(!msg.is::<TestMsg2>());
        assert!(msg.downcast::<TestMsg2>().is_none());
    }

    #[test]
    fn test_batch_collapses() {
        assert!(batch(vec![None, None]).is_none());

        let single = batch(vec![None, Some(quit())]).unwrap();
        assert!(single.execute().unwrap().is::<QuitMsg>());

        let many = batch(vec![Some(quit()), Some(quit())]).unwrap();
        let msg = many.execute().unwrap();
        let BatchMsg(cmds) = msg.downcast::<BatchMsg>().unwrap();
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn test_tick_produces_message() {
        struct Ticked;
        let cmd = tick(Duration::from_millis(1), |_| Message::new(Ticked));
        assert!(cmd.execute().unwrap().is::<Ticked>());
    }
}
