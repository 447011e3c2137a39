//! Key events and configurable key bindings.
//!
//! A [`KeyMsg`] renders to the same canonical strings used in [`Binding`]
//! key lists (`"enter"`, `"ctrl+a"`, `"alt+enter"`, `" "`, `"x"`), so
//! matching a key against a binding is a string comparison.
//!
//! # Example
//!
//! ```rust
//! use quire::key::{Binding, KeyMsg, KeyType, matches};
//!
//! let up = Binding::new().keys(&["k", "up"]).help("↑/k", "up");
//! let down = Binding::new().keys(&["j", "down"]).help("↓/j", "down");
//!
//! assert!(matches(&KeyMsg::from_char('k'), &[&up, &down]));
//! assert!(matches(&KeyMsg::from_type(KeyType::Down), &[&up, &down]));
//! assert!(!matches(&KeyMsg::from_char('x'), &[&up, &down]));
//! ```

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keyboard key event message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMsg {
    /// The type of key pressed.
    pub key_type: KeyType,
    /// For [`KeyType::Runes`], the characters typed.
    pub runes: Vec<char>,
    /// Whether Alt was held.
    pub alt: bool,
}

impl KeyMsg {
    /// Create a new key message from a key type.
    pub fn from_type(key_type: KeyType) -> Self {
        Self {
            key_type,
            runes: Vec::new(),
            alt: false,
        }
    }

    /// Create a new key message from a character.
    pub fn from_char(c: char) -> Self {
        if c == ' ' {
            return Self::from_type(KeyType::Space);
        }
        Self {
            key_type: KeyType::Runes,
            runes: vec![c],
            alt: false,
        }
    }

    /// Create a new key message from multiple characters (e.g. from IME).
    pub fn from_runes(runes: Vec<char>) -> Self {
        Self {
            key_type: KeyType::Runes,
            runes,
            alt: false,
        }
    }

    /// Set the alt modifier.
    #[must_use]
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

impl fmt::Display for KeyMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.key_type == KeyType::Runes {
            for c in &self.runes {
                write!(f, "{c}")?;
            }
            Ok(())
        } else {
            write!(f, "{}", self.key_type)
        }
    }
}

impl From<KeyEvent> for KeyMsg {
    fn from(event: KeyEvent) -> Self {
        from_crossterm_key(event.code, event.modifiers)
    }
}

/// The keys forms react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Ctrl+A.
    CtrlA,
    /// Ctrl+C.
    CtrlC,
    /// Ctrl+D.
    CtrlD,
    /// Ctrl+E.
    CtrlE,
    /// Ctrl+J.
    CtrlJ,
    /// Ctrl+K.
    CtrlK,
    /// Ctrl+N.
    CtrlN,
    /// Ctrl+P.
    CtrlP,
    /// Ctrl+U.
    CtrlU,
    /// Any other control chord; carries no rune.
    CtrlOther,
    /// Tab.
    Tab,
    /// Enter.
    Enter,
    /// Escape.
    Esc,
    /// Backspace.
    Backspace,
    /// Regular character input.
    Runes,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Right arrow.
    Right,
    /// Left arrow.
    Left,
    /// Shift+Tab.
    ShiftTab,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PgUp,
    /// Page down.
    PgDown,
    /// Delete.
    Delete,
    /// Space bar.
    Space,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CtrlA => "ctrl+a",
            Self::CtrlC => "ctrl+c",
            Self::CtrlD => "ctrl+d",
            Self::CtrlE => "ctrl+e",
            Self::CtrlJ => "ctrl+j",
            Self::CtrlK => "ctrl+k",
            Self::CtrlN => "ctrl+n",
            Self::CtrlP => "ctrl+p",
            Self::CtrlU => "ctrl+u",
            Self::CtrlOther => "ctrl+?",
            Self::Tab => "tab",
            Self::Enter => "enter",
            Self::Esc => "esc",
            Self::Backspace => "backspace",
            Self::Runes => "runes",
            Self::Up => "up",
            Self::Down => "down",
            Self::Right => "right",
            Self::Left => "left",
            Self::ShiftTab => "shift+tab",
            Self::Home => "home",
            Self::End => "end",
            Self::PgUp => "pgup",
            Self::PgDown => "pgdown",
            Self::Delete => "delete",
            Self::Space => " ",
        };
        write!(f, "{name}")
    }
}

/// Convert a crossterm key code and modifiers to a [`KeyMsg`].
pub fn from_crossterm_key(code: KeyCode, modifiers: KeyModifiers) -> KeyMsg {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let alt = modifiers.contains(KeyModifiers::ALT);

    let (key_type, runes) = match code {
        KeyCode::Char(c) if ctrl => {
            let kt = match c.to_ascii_lowercase() {
                'a' => KeyType::CtrlA,
                'c' => KeyType::CtrlC,
                'd' => KeyType::CtrlD,
                'e' => KeyType::CtrlE,
                'i' => KeyType::Tab,
                'j' => KeyType::CtrlJ,
                'k' => KeyType::CtrlK,
                'm' => KeyType::Enter,
                'n' => KeyType::CtrlN,
                'p' => KeyType::CtrlP,
                'u' => KeyType::CtrlU,
                _ => KeyType::CtrlOther,
            };
            (kt, Vec::new())
        }
        KeyCode::Char(' ') => (KeyType::Space, Vec::new()),
        KeyCode::Char(c) => (KeyType::Runes, vec![c]),
        KeyCode::Enter => (KeyType::Enter, Vec::new()),
        KeyCode::Backspace => (KeyType::Backspace, Vec::new()),
        KeyCode::BackTab => (KeyType::ShiftTab, Vec::new()),
        KeyCode::Tab if shift => (KeyType::ShiftTab, Vec::new()),
        KeyCode::Tab => (KeyType::Tab, Vec::new()),
        KeyCode::Esc => (KeyType::Esc, Vec::new()),
        KeyCode::Delete => (KeyType::Delete, Vec::new()),
        KeyCode::Up => (KeyType::Up, Vec::new()),
        KeyCode::Down => (KeyType::Down, Vec::new()),
        KeyCode::Left => (KeyType::Left, Vec::new()),
        KeyCode::Right => (KeyType::Right, Vec::new()),
        KeyCode::Home => (KeyType::Home, Vec::new()),
        KeyCode::End => (KeyType::End, Vec::new()),
        KeyCode::PageUp => (KeyType::PgUp, Vec::new()),
        KeyCode::PageDown => (KeyType::PgDown, Vec::new()),
        _ => (KeyType::Runes, Vec::new()),
    };

    KeyMsg {
        key_type,
        runes,
        alt,
    }
}

/// Help information for a keybinding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// The key(s) to display in help text (e.g. "↑/k").
    pub key: String,
    /// Description of what the binding does.
    pub desc: String,
}

impl Help {
    /// Creates new help information.
    #[must_use]
    pub fn new(key: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            desc: desc.into(),
        }
    }
}

/// A keybinding with associated help text.
///
/// Bindings can be enabled/disabled and contain zero or more key strings
/// that trigger the binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    keys: Vec<String>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates a new empty binding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the keys for this binding.
    #[must_use]
    pub fn keys(mut self, keys: &[&str]) -> Self {
        self.keys = keys.iter().map(|&s| s.to_string()).collect();
        self
    }

    /// Sets the help text for this binding.
    #[must_use]
    pub fn help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help::new(key, desc);
        self
    }

    /// Creates a disabled binding.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Returns the keys for this binding.
    #[must_use]
    pub fn get_keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the help information for this binding.
    #[must_use]
    pub fn get_help(&self) -> &Help {
        &self.help
    }

    /// Returns whether this binding is enabled.
    ///
    /// A binding is enabled if it's not explicitly disabled and has at least one key.
    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding.
    pub fn enable(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }
}

/// Checks if the given key matches any of the given enabled bindings.
pub fn matches<K: fmt::Display>(key: K, bindings: &[&Binding]) -> bool {
    let key_str = key.to_string();
    bindings
        .iter()
        .filter(|binding| binding.enabled())
        .any(|binding| binding.keys.iter().any(|k| *k == key_str))
}

/// Checks if the given key matches a single binding.
pub fn matches_one<K: fmt::Display>(key: K, binding: &Binding) -> bool {
    matches(key, &[binding])
}
