//! Spinner frames and a standalone spinner that runs a blocking action.
//!
//! Fields use [`SpinnerType`] frames for their loading indicator while a
//! deferred option list is being computed. [`Spinner`] is a small model of
//! its own: it animates next to a title until its action finishes.
//!
//! # Example
//!
//! ```rust
//! use quire::{Simulator, Spinner};
//!
//! let spinner = Spinner::new()
//!     .title("Preparing your burger...")
//!     .action(|| std::thread::sleep(std::time::Duration::from_millis(5)));
//!
//! let mut sim = Simulator::new(spinner);
//! sim.run_until_empty();
//! assert!(sim.model().is_done());
//! ```

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{FormError, Result};
use crate::key::{KeyMsg, matches_one};
use crate::keymap::KeyMap;
use crate::runtime::{Cmd, Message, Model, batch, quit, tick};
use crate::theme::{Style, Theme};

/// A spinner animation definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinnerType {
    /// The frames of the animation.
    pub frames: &'static [&'static str],
    /// Frames per second.
    pub fps: u32,
}

impl SpinnerType {
    /// Line spinner: `| / - \`
    pub const LINE: Self = Self {
        frames: &["|", "/", "-", "\\"],
        fps: 10,
    };
    /// Braille dot spinner.
    pub const DOT: Self = Self {
        frames: &["⣾ ", "⣽ ", "⣻ ", "⢿ ", "⡿ ", "⣟ ", "⣯ ", "⣷ "],
        fps: 10,
    };
    /// Mini braille dot spinner.
    pub const MINI_DOT: Self = Self {
        frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
        fps: 12,
    };
    /// Growing dots.
    pub const POINTS: Self = Self {
        frames: &["∙∙∙", "●∙∙", "∙●∙", "∙∙●"],
        fps: 7,
    };

    /// Returns the duration between frames.
    pub fn frame_duration(&self) -> Duration {
        if self.fps == 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_secs_f64(1.0 / f64::from(self.fps))
        }
    }

    /// The frame to show for a tick count.
    pub fn frame(&self, n: usize) -> &'static str {
        if self.frames.is_empty() {
            return "";
        }
        self.frames[n % self.frames.len()]
    }
}

impl Default for SpinnerType {
    fn default() -> Self {
        Self::LINE
    }
}

/// Advances the spinner owned by `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinnerTickMsg {
    /// Owner of the spinner.
    pub id: usize,
}

/// Schedules the next frame of the spinner owned by `id`.
pub fn spinner_tick(id: usize, kind: SpinnerType) -> Cmd {
    tick(kind.frame_duration(), move |_| {
        Message::new(SpinnerTickMsg { id })
    })
}

/// Sent when a [`Spinner`]'s action returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDoneMsg {
    /// Spinner that ran the action.
    pub id: usize,
}

type Action = Box<dyn FnOnce() + Send>;

/// A spinner shown while a blocking action runs.
pub struct Spinner {
    id: usize,
    kind: SpinnerType,
    frame: usize,
    title: String,
    style: Style,
    title_style: Style,
    action: Arc<Mutex<Option<Action>>>,
    quit: crate::key::Binding,
    done: bool,
    aborted: bool,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    /// Creates a line spinner with no title and no action.
    pub fn new() -> Self {
        let theme = Theme::default();
        Self {
            id: crate::next_id(),
            kind: SpinnerType::default(),
            frame: 0,
            title: String::new(),
            style: Style::new().foreground("#F780E2"),
            title_style: theme.focused.title,
            action: Arc::new(Mutex::new(None)),
            quit: KeyMap::default().quit,
            done: false,
            aborted: false,
        }
    }

    /// Sets the animation.
    #[must_use]
    pub fn kind(mut self, kind: SpinnerType) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the title shown next to the animation.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the style of the animation frames.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the style of the title.
    #[must_use]
    pub fn title_style(mut self, style: Style) -> Self {
        self.title_style = style;
        self
    }

    /// Sets the blocking action to run.
    #[must_use]
    pub fn action(self, action: impl FnOnce() + Send + 'static) -> Self {
        *self.action.lock() = Some(Box::new(action));
        self
    }

    /// Whether the action has finished.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether the user quit before the action finished.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Prints the title and runs the action on the calling thread.
    pub fn run_accessible(&mut self, output: &mut dyn Write) -> Result<()> {
        writeln!(output, "{}", self.title)?;
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
        self.done = true;
        Ok(())
    }

    /// The result of a finished run: an error if the user quit.
    pub fn result(&self) -> Result<()> {
        if self.aborted {
            return Err(FormError::UserAborted);
        }
        Ok(())
    }
}

impl Model for Spinner {
    fn init(&self) -> Option<Cmd> {
        let id = self.id;
        let action = Arc::clone(&self.action);
        let run = Cmd::new(move || {
            let action = action.lock().take();
            if let Some(action) = action {
                action();
            }
            Message::new(ActionDoneMsg { id })
        });
        batch(vec![Some(run), Some(spinner_tick(id, self.kind))])
    }

    fn update(&mut self, msg: Message) -> Option<Cmd> {
        if let Some(tick) = msg.downcast_ref::<SpinnerTickMsg>() {
            if tick.id != self.id || self.done {
                return None;
            }
            self.frame = self.frame.wrapping_add(1);
            return Some(spinner_tick(self.id, self.kind));
        }
        if let Some(done) = msg.downcast_ref::<ActionDoneMsg>() {
            if done.id == self.id {
                debug!(id = self.id, "spinner action finished");
                self.done = true;
                return Some(quit());
            }
            return None;
        }
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            if matches_one(key, &self.quit) {
                self.aborted = true;
                self.done = true;
                return Some(quit());
            }
        }
        None
    }

    fn view(&self) -> String {
        if self.done {
            return String::new();
        }
        let frame = self.style.render(self.kind.frame(self.frame));
        if self.title.is_empty() {
            return frame;
        }
        format!("{frame} {}", self.title_style.render(&self.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyType;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_frame_wraps() {
        let kind = SpinnerType::LINE;
        assert_eq!(kind.frame(0), "|");
        assert_eq!(kind.frame(4), "|");
        assert_eq!(kind.frame(5), "/");
    }

    #[test]
    fn test_tick_advances_only_own_spinner() {
        let mut s = Spinner::new().title("Loading");
        let own = s.id;
        assert!(s.update(Message::new(SpinnerTickMsg { id: own + 1000 })).is_none());
        assert_eq!(s.frame, 0);
        assert!(s.update(Message::new(SpinnerTickMsg { id: own })).is_some());
        assert_eq!(s.frame, 1);
        assert!(s.view().contains("Loading"));
    }

    #[test]
    fn test_action_done_quits() {
        let mut s = Spinner::new();
        let id = s.id;
        assert!(s.update(Message::new(ActionDoneMsg { id })).is_some());
        assert!(s.is_done());
        assert!(s.view().is_empty());
        assert!(s.result().is_ok());
    }

    #[test]
    fn test_ctrl_c_aborts() {
        let mut s = Spinner::new();
        s.update(Message::new(KeyMsg::from_type(KeyType::CtrlC)));
        assert!(s.is_aborted());
        assert_eq!(s.result(), Err(FormError::UserAborted));
    }

    #[test]
    fn test_accessible_runs_action_inline() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let mut s = Spinner::new()
            .title("Loading")
            .action(move || flag.store(true, Ordering::SeqCst));
        let mut out = Vec::new();
        s.run_accessible(&mut out).unwrap();
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(String::from_utf8(out).unwrap(), "Loading\n");
    }
}
