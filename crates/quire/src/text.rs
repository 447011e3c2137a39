//! A multi-line text field.

use std::any::Any;
use std::hash::Hash;
use std::io::{BufRead, Write};

use crate::accessible::prompt_string;
use crate::bound::Bound;
use crate::error::Result;
use crate::eval::EvalDoneMsg;
use crate::field::{Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::header::Header;
use crate::key::{Binding, KeyMsg, KeyType, matches, matches_one};
use crate::keymap::{KeyMap, TextKeyMap};
use crate::runtime::{Cmd, Message};
use crate::theme::{FieldStyles, Theme};
use crate::validate::TextValidator;
use crate::viewport::Viewport;

const DEFAULT_HEIGHT: usize = 5;

/// A text area field.
///
/// Enter moves on; alt+enter or ctrl+j inserts a line break.
pub struct Text {
    id: usize,
    key: String,
    value: Bound<String>,
    header: Header,
    placeholder: String,
    lines: Vec<Vec<char>>,
    row: usize,
    col: usize,
    char_limit: usize,
    viewport: Viewport,
    focused: bool,
    error: Option<String>,
    validate: Option<TextValidator>,
    width: usize,
    theme: Theme,
    custom_theme: bool,
    keymap: TextKeyMap,
    position: FieldPosition,
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

impl Text {
    /// Creates an empty text field.
    pub fn new() -> Self {
        let mut field = Self {
            id: crate::next_id(),
            key: String::new(),
            value: Bound::new(String::new()),
            header: Header::default(),
            placeholder: String::new(),
            lines: vec![Vec::new()],
            row: 0,
            col: 0,
            char_limit: 0,
            viewport: Viewport::new(DEFAULT_HEIGHT),
            focused: false,
            error: None,
            validate: None,
            width: 0,
            theme: Theme::default(),
            custom_theme: false,
            keymap: TextKeyMap::default(),
            position: FieldPosition::default(),
        };
        field.sync_bindings();
        field
    }

    /// Sets the field key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets a fixed title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.header.set_title(title.into());
        self
    }

    /// Computes the title from `bindings` whenever they change.
    #[must_use]
    pub fn title_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
        B: Hash + Send + Sync + 'static,
    {
        self.header.set_title_func(f, bindings);
        self
    }

    /// Sets a fixed description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.header.set_description(description.into());
        self
    }

    /// Computes the description from `bindings` whenever they change.
    #[must_use]
    pub fn description_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
        B: Hash + Send + Sync + 'static,
    {
        self.header.set_description_func(f, bindings);
        self
    }

    /// Sets the text shown while empty.
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Limits the number of characters, line breaks included. 0 is no limit.
    #[must_use]
    pub fn char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit;
        self
    }

    /// Sets how many lines are shown at once.
    #[must_use]
    pub fn lines(mut self, lines: usize) -> Self {
        self.viewport.set_height(lines);
        self
    }

    /// Binds the committed value and loads it into the editor.
    #[must_use]
    pub fn value(mut self, value: Bound<String>) -> Self {
        self.set_text(&value.get());
        self.value = value;
        self
    }

    /// Sets the validation function.
    #[must_use]
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Some(Box::new(f));
        self
    }

    /// Sets a theme that the form will not override.
    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self.custom_theme = true;
        self
    }

    /// Replaces the editor contents and moves the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(|l| l.chars().collect()).collect();
        self.row = self.lines.len() - 1;
        self.col = self.lines[self.row].len();
        self.scroll_to_cursor();
    }

    /// The editor contents.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cursor as (line, column).
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Writes the editor contents into the bound value and validates them.
    pub fn commit(&mut self) {
        let text = self.text();
        self.error = self.validate.as_ref().and_then(|f| f(&text));
        self.value.set(text);
    }

    fn char_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum::<usize>() + self.lines.len() - 1
    }

    fn at_limit(&self) -> bool {
        self.char_limit > 0 && self.char_count() >= self.char_limit
    }

    fn insert_char(&mut self, c: char) {
        if self.at_limit() {
            return;
        }
        self.lines[self.row].insert(self.col, c);
        self.col += 1;
    }

    fn insert_newline(&mut self) {
        if self.at_limit() {
            return;
        }
        let rest = self.lines[self.row].split_off(self.col);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    fn delete_before(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            self.lines[self.row].remove(self.col);
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.lines[self.row].len();
            self.lines[self.row].extend(line);
        }
    }

    fn delete_after(&mut self) {
        if self.col < self.lines[self.row].len() {
            self.lines[self.row].remove(self.col);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].extend(next);
        }
    }

    fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.lines[self.row].len();
        }
    }

    fn move_right(&mut self) {
        if self.col < self.lines[self.row].len() {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    fn move_vertical(&mut self, down: bool) {
        if down && self.row + 1 < self.lines.len() {
            self.row += 1;
        } else if !down && self.row > 0 {
            self.row -= 1;
        }
        self.col = self.col.min(self.lines[self.row].len());
    }

    fn scroll_to_cursor(&mut self) {
        self.viewport.set_total(self.lines.len());
        self.viewport.ensure_visible(self.row, self.row + 1);
    }

    fn sync_bindings(&mut self) {
        self.keymap.prev.enable(!self.position.is_first());
        self.keymap.next.enable(!self.position.is_last());
        self.keymap.submit.enable(self.position.is_last());
    }

    fn styles(&self) -> &FieldStyles {
        if self.focused {
            &self.theme.focused
        } else {
            &self.theme.blurred
        }
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        if matches_one(key, &self.keymap.new_line) {
            self.insert_newline();
            self.scroll_to_cursor();
            return None;
        }
        if matches_one(key, &self.keymap.prev) {
            self.commit();
            return self.error.is_none().then(|| Cmd::message(PrevFieldMsg));
        }
        if matches(key, &[&self.keymap.next, &self.keymap.submit]) {
            self.commit();
            return self.error.is_none().then(|| Cmd::message(NextFieldMsg));
        }

        match key.key_type {
            KeyType::Backspace => self.delete_before(),
            KeyType::Delete => self.delete_after(),
            KeyType::Left => self.move_left(),
            KeyType::Right => self.move_right(),
            KeyType::Up => self.move_vertical(false),
            KeyType::Down => self.move_vertical(true),
            KeyType::Home | KeyType::CtrlA => self.col = 0,
            KeyType::End | KeyType::CtrlE => self.col = self.lines[self.row].len(),
            KeyType::CtrlK => self.lines[self.row].truncate(self.col),
            KeyType::CtrlU => {
                self.lines[self.row].drain(..self.col);
                self.col = 0;
            }
            KeyType::Space => self.insert_char(' '),
            KeyType::Runes => {
                for &c in &key.runes {
                    self.insert_char(c);
                }
            }
            _ => {}
        }
        self.scroll_to_cursor();
        None
    }

    fn editor_view(&self) -> String {
        let styles = &self.styles().text_input;
        if self.text().is_empty() && !self.placeholder.is_empty() {
            let mut chars = self.placeholder.chars();
            let first = chars.next().map(String::from).unwrap_or_default();
            let rest: String = chars.collect();
            let head = if self.focused {
                styles.cursor.render(&first)
            } else {
                styles.placeholder.render(&first)
            };
            return self
                .viewport
                .window(&format!("{head}{}", styles.placeholder.render(&rest)));
        }

        let rendered: Vec<String> = self
            .lines
            .iter()
            .enumerate()
            .map(|(row, line)| {
                if !self.focused || row != self.row {
                    return styles.text.render(&line.iter().collect::<String>());
                }
                let before: String = line[..self.col].iter().collect();
                let at = line.get(self.col).map_or(' ', |c| *c).to_string();
                let after: String = line.get(self.col + 1..).unwrap_or(&[]).iter().collect();
                format!(
                    "{}{}{}",
                    styles.text.render(&before),
                    styles.cursor.render(&at),
                    styles.text.render(&after)
                )
            })
            .collect();
        self.viewport.window(&rendered.join("\n"))
    }
}

impl Field for Text {
    fn get_key(&self) -> &str {
        &self.key
    }

    fn get_value(&self) -> Box<dyn Any> {
        Box::new(self.value.get())
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn validate(&mut self) -> Option<&str> {
        self.commit();
        self.error.as_deref()
    }

    fn init(&mut self) -> Option<Cmd> {
        self.update(&Message::new(UpdateFieldMsg))
    }

    fn update(&mut self, msg: &Message) -> Option<Cmd> {
        if msg.is::<UpdateFieldMsg>() {
            return self.header.refresh(self.id);
        }
        if let Some(done) = msg.downcast_ref::<EvalDoneMsg<String>>() {
            self.header.deliver(self.id, done);
            return None;
        }
        if !self.focused {
            return None;
        }
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            self.error = None;
            return self.handle_key(key);
        }
        None
    }

    fn view(&self) -> String {
        let styles = self.styles();
        let mut out = String::new();
        if self.header.has_title() || self.error.is_some() {
            out.push_str(&styles.title.render(self.header.title()));
            if self.error.is_some() {
                out.push_str(&styles.error_indicator.string());
            }
            out.push('\n');
        }
        if self.header.has_description() {
            out.push_str(&styles.description.render(self.header.description()));
            out.push('\n');
        }
        out.push_str(&self.editor_view());
        styles.base.render(&out)
    }

    fn focus(&mut self) -> Option<Cmd> {
        self.focused = true;
        None
    }

    fn blur(&mut self) -> Option<Cmd> {
        self.focused = false;
        self.commit();
        None
    }

    fn key_binds(&self) -> Vec<Binding> {
        vec![
            self.keymap.new_line.clone(),
            self.keymap.prev.clone(),
            self.keymap.next.clone(),
            self.keymap.submit.clone(),
        ]
    }

    fn with_theme(&mut self, theme: &Theme) {
        if !self.custom_theme {
            self.theme = theme.clone();
        }
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.text.clone();
        self.sync_bindings();
    }

    fn with_width(&mut self, width: usize) {
        self.width = width;
    }

    fn with_height(&mut self, height: usize) {
        let chrome = self.header.rows(false);
        if height > chrome {
            self.viewport.set_height(height - chrome);
            self.scroll_to_cursor();
        }
    }

    fn with_position(&mut self, position: FieldPosition) {
        self.position = position;
        self.sync_bindings();
    }

    fn run_accessible(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<()> {
        let validate = self.validate.take();
        let check = |s: &str| validate.as_ref().and_then(|f| f(s));
        let prompt = format!("{}:", self.header.title());
        let answer = prompt_string(input, output, &prompt, &check);
        self.validate = validate;
        self.set_text(&answer?);
        self.commit();
        Ok(())
    }
}
