//! The capability set every form field implements, and the navigation
//! messages fields use to talk to their group.
//!
//! Fields never move focus themselves. When the user asks to move on, a field
//! commits its value, validates it, and (if valid) returns a command yielding
//! [`NextFieldMsg`] or [`PrevFieldMsg`]. The group decides what happens next
//! and, at its edges, hands [`NextGroupMsg`] or [`PrevGroupMsg`] to the form.

use std::any::Any;
use std::io::{BufRead, Write};

use crate::error::Result;
use crate::key::Binding;
use crate::keymap::KeyMap;
use crate::runtime::{Cmd, Message};
use crate::theme::Theme;

/// A form field.
pub trait Field: Send + Sync {
    /// Returns the field's key, empty if none was set.
    fn get_key(&self) -> &str;

    /// Returns the committed value.
    fn get_value(&self) -> Box<dyn Any>;

    /// Returns the current validation error, if any.
    fn error(&self) -> Option<&str>;

    /// Commits pending input and runs the validator, returning its error.
    fn validate(&mut self) -> Option<&str>;

    /// Initializes the field.
    fn init(&mut self) -> Option<Cmd>;

    /// Updates the field with a message.
    fn update(&mut self, msg: &Message) -> Option<Cmd>;

    /// Renders the field.
    fn view(&self) -> String;

    /// Focuses the field.
    fn focus(&mut self) -> Option<Cmd>;

    /// Blurs the field, committing its value.
    fn blur(&mut self) -> Option<Cmd>;

    /// Returns the keybindings to list in help, enabled or not.
    fn key_binds(&self) -> Vec<Binding>;

    /// Sets the theme unless the field was given its own.
    fn with_theme(&mut self, theme: &Theme);

    /// Sets the keymap.
    fn with_keymap(&mut self, keymap: &KeyMap);

    /// Sets the width.
    fn with_width(&mut self, width: usize);

    /// Sets the height.
    fn with_height(&mut self, height: usize);

    /// Sets the field position.
    fn with_position(&mut self, position: FieldPosition);

    /// Prompts for the value line by line instead of interactively.
    fn run_accessible(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<()>;
}

/// Positional information about a field within a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldPosition {
    /// Current group index.
    pub group: usize,
    /// Current field index within group.
    pub field: usize,
    /// First field index.
    pub first_field: usize,
    /// Last field index.
    pub last_field: usize,
    /// Total number of groups.
    pub group_count: usize,
    /// First non-hidden group index.
    pub first_group: usize,
    /// Last non-hidden group index.
    pub last_group: usize,
}

impl FieldPosition {
    /// Returns whether this field is the first in the form.
    pub fn is_first(&self) -> bool {
        self.field == self.first_field && self.group == self.first_group
    }

    /// Returns whether this field is the last in the form.
    pub fn is_last(&self) -> bool {
        self.field == self.last_field && self.group == self.last_group
    }
}

/// Message to move to the next field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextFieldMsg;

/// Message to move to the previous field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrevFieldMsg;

/// Message to move to the next group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextGroupMsg;

/// Message to move to the previous group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrevGroupMsg;

/// Message asking fields to re-check the bindings of their deferred values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateFieldMsg;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_first_last() {
        let pos = FieldPosition {
            group: 0,
            field: 0,
            first_field: 0,
            last_field: 1,
            group_count: 2,
            first_group: 0,
            last_group: 1,
        };
        assert!(pos.is_first());
        assert!(!pos.is_last());

        let last = FieldPosition {
            group: 1,
            field: 1,
            ..pos
        };
        assert!(!last.is_first());
        assert!(last.is_last());
    }

    #[test]
    fn test_default_position_is_only_field() {
        let pos = FieldPosition::default();
        assert!(pos.is_first());
        assert!(pos.is_last());
    }
}
