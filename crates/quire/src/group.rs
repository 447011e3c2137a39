//! A group of fields shown together, with a scrolling viewport.

use tracing::{debug, trace};

use crate::field::{
    Field, FieldPosition, NextFieldMsg, NextGroupMsg, PrevFieldMsg, PrevGroupMsg,
};
use crate::help::Help;
use crate::key::{Binding, KeyMsg};
use crate::keymap::KeyMap;
use crate::runtime::{Cmd, Message, Model, batch};
use crate::theme::Theme;
use crate::viewport::{Viewport, line_count};

type HideFn = Box<dyn Fn() -> bool + Send + Sync>;

/// A group of fields displayed together.
///
/// Only the focused field receives key presses; every other message is
/// broadcast to all fields so deferred values keep up to date. The group
/// content scrolls inside a viewport of the configured height, moving only
/// as far as needed to keep the focused field in view.
pub struct Group {
    fields: Vec<Box<dyn Field>>,
    current: usize,
    title: String,
    description: String,
    width: usize,
    viewport: Viewport,
    bounds: Vec<(usize, usize)>,
    theme: Theme,
    custom_theme: bool,
    show_help: bool,
    show_errors: bool,
    help: Help,
    hide: Option<HideFn>,
    index: usize,
    first_group: usize,
    last_group: usize,
    group_count: usize,
}

impl Default for Group {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Group {
    /// Creates a new group with the given fields.
    pub fn new(fields: Vec<Box<dyn Field>>) -> Self {
        let theme = Theme::default();
        let mut group = Self {
            fields,
            current: 0,
            title: String::new(),
            description: String::new(),
            width: 80,
            viewport: Viewport::new(0),
            bounds: Vec::new(),
            help: Help::new(theme.help.clone()),
            theme,
            custom_theme: false,
            show_help: true,
            show_errors: true,
            hide: None,
            index: 0,
            first_group: 0,
            last_group: 0,
            group_count: 1,
        };
        group.apply_positions();
        group.layout();
        group
    }

    /// Sets the group title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the group description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets whether the group should be hidden.
    #[must_use]
    pub fn hide(mut self, hide: bool) -> Self {
        self.hide = Some(Box::new(move || hide));
        self
    }

    /// Sets a function deciding whether the group is skipped.
    #[must_use]
    pub fn hide_func<F: Fn() -> bool + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.hide = Some(Box::new(f));
        self
    }

    /// Sets the viewport height in rows. 0 shows every field.
    #[must_use]
    pub fn height(mut self, height: usize) -> Self {
        self.set_height(height);
        self
    }

    /// Sets whether the help line is shown.
    #[must_use]
    pub fn show_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }

    /// Sets whether field errors are listed under the group.
    #[must_use]
    pub fn show_errors(mut self, show: bool) -> Self {
        self.show_errors = show;
        self
    }

    /// Sets a theme that the form will not override.
    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.set_theme(&theme);
        self.custom_theme = true;
        self
    }

    /// Returns whether this group should be skipped.
    pub fn is_hidden(&self) -> bool {
        self.hide.as_ref().is_some_and(|f| f())
    }

    /// Returns the focused field index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the group has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The fields, in order.
    pub fn fields(&self) -> &[Box<dyn Field>] {
        &self.fields
    }

    /// Returns the focused field.
    pub fn current_field(&self) -> Option<&dyn Field> {
        self.fields.get(self.current).map(AsRef::as_ref)
    }

    /// Returns the focused field mutably.
    pub fn current_field_mut(&mut self) -> Option<&mut Box<dyn Field>> {
        self.fields.get_mut(self.current)
    }

    /// Collects all field errors.
    pub fn errors(&self) -> Vec<&str> {
        self.fields.iter().filter_map(|f| f.error()).collect()
    }

    /// First visible content row.
    pub fn offset(&self) -> usize {
        self.viewport.y_offset()
    }

    /// Viewport height, 0 when unbounded.
    pub fn viewport_height(&self) -> usize {
        self.viewport.height()
    }

    /// Content rows `[start, end)` occupied by field `index`.
    pub fn field_bounds(&self, index: usize) -> Option<(usize, usize)> {
        self.bounds.get(index).copied()
    }

    // -------------------------------------------------------------------------
    // Form plumbing
    // -------------------------------------------------------------------------

    pub(crate) fn set_theme(&mut self, theme: &Theme) {
        if self.custom_theme {
            return;
        }
        self.theme = theme.clone();
        self.help.styles = theme.help.clone();
        for field in &mut self.fields {
            field.with_theme(theme);
        }
    }

    pub(crate) fn set_keymap(&mut self, keymap: &KeyMap) {
        for field in &mut self.fields {
            field.with_keymap(keymap);
        }
    }

    pub(crate) fn set_width(&mut self, width: usize) {
        self.width = width;
        self.help.width = width;
        for field in &mut self.fields {
            field.with_width(width);
        }
    }

    pub(crate) fn set_height(&mut self, height: usize) {
        self.viewport.set_height(height);
        self.layout();
    }

    pub(crate) fn set_show_help(&mut self, show: bool) {
        self.show_help = show;
    }

    pub(crate) fn set_show_errors(&mut self, show: bool) {
        self.show_errors = show;
    }

    pub(crate) fn set_position(
        &mut self,
        index: usize,
        first_group: usize,
        last_group: usize,
        group_count: usize,
    ) {
        self.index = index;
        self.first_group = first_group;
        self.last_group = last_group;
        self.group_count = group_count;
        self.apply_positions();
    }

    fn apply_positions(&mut self) {
        let last_field = self.fields.len().saturating_sub(1);
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.with_position(FieldPosition {
                group: self.index,
                field: i,
                first_field: 0,
                last_field,
                group_count: self.group_count,
                first_group: self.first_group,
                last_group: self.last_group,
            });
        }
    }

    pub(crate) fn focus_first(&mut self) -> Option<Cmd> {
        self.focus_at(0)
    }

    pub(crate) fn focus_last(&mut self) -> Option<Cmd> {
        self.focus_at(self.fields.len().saturating_sub(1))
    }

    fn focus_at(&mut self, index: usize) -> Option<Cmd> {
        self.current = index;
        let cmd = self.fields.get_mut(index).and_then(|f| f.focus());
        self.layout();
        cmd
    }

    pub(crate) fn blur_current(&mut self) -> Option<Cmd> {
        self.fields.get_mut(self.current).and_then(|f| f.blur())
    }

    /// Commits and validates every field, returning whether all are valid.
    pub(crate) fn validate_all(&mut self) -> bool {
        let mut valid = true;
        for field in &mut self.fields {
            valid &= field.validate().is_none();
        }
        valid
    }

    /// Hands a non-key message to every field.
    pub(crate) fn broadcast(&mut self, msg: &Message) -> Option<Cmd> {
        let cmds = self.fields.iter_mut().map(|f| f.update(msg)).collect();
        self.layout();
        batch(cmds)
    }

    pub(crate) fn run_accessible(
        &mut self,
        input: &mut dyn std::io::BufRead,
        output: &mut dyn std::io::Write,
    ) -> crate::error::Result<()> {
        if !self.title.is_empty() {
            writeln!(output, "{}", self.title)?;
        }
        for field in &mut self.fields {
            field.run_accessible(input, output)?;
            writeln!(output)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    fn next_field(&mut self) -> Option<Cmd> {
        if self.fields.is_empty() {
            return Some(Cmd::message(NextGroupMsg));
        }
        if let Some(err) = self.fields[self.current].validate() {
            trace!(group = self.index, field = self.current, error = err, "advance blocked");
            return None;
        }
        // An error left on any other field holds the whole group.
        if let Some(field) = self.fields.iter().position(|f| f.error().is_some()) {
            trace!(group = self.index, field, "advance blocked by another field");
            return None;
        }
        if self.current + 1 >= self.fields.len() {
            if !self.validate_all() {
                trace!(group = self.index, "group has invalid fields");
                return None;
            }
            return Some(Cmd::message(NextGroupMsg));
        }
        let blur = self.blur_current();
        debug!(group = self.index, from = self.current, to = self.current + 1, "next field");
        let focus = self.focus_at(self.current + 1);
        batch(vec![blur, focus])
    }

    fn prev_field(&mut self) -> Option<Cmd> {
        if self.current == 0 {
            return Some(Cmd::message(PrevGroupMsg));
        }
        let blur = self.blur_current();
        debug!(group = self.index, from = self.current, to = self.current - 1, "previous field");
        let focus = self.focus_at(self.current - 1);
        batch(vec![blur, focus])
    }

    /// Recomputes where each field sits and scrolls the focused one into view.
    fn layout(&mut self) {
        let separator = self.separator().matches('\n').count().saturating_sub(1);
        self.bounds.clear();
        let mut row = 0;
        for (i, field) in self.fields.iter().enumerate() {
            let height = line_count(&field.view());
            self.bounds.push((row, row + height));
            row += height;
            if i + 1 < self.fields.len() {
                row += separator;
            }
        }
        self.viewport.set_total(row);
        if let Some(&(start, end)) = self.bounds.get(self.current) {
            self.viewport.ensure_visible(start, end);
        }
    }

    fn separator(&self) -> &str {
        match self.theme.field_separator.value() {
            "" => "\n",
            sep => sep,
        }
    }

    fn content(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.view())
            .collect::<Vec<_>>()
            .join(self.separator())
    }

    /// The title, description and visible part of the fields.
    pub fn view_body(&self) -> String {
        let mut out = String::new();
        if !self.title.is_empty() {
            out.push_str(&self.theme.group.title.render(&self.title));
            out.push('\n');
        }
        if !self.description.is_empty() {
            out.push_str(&self.theme.group.description.render(&self.description));
            out.push('\n');
        }
        out.push_str(&self.viewport.window(&self.content()));
        out
    }

    /// The help line, or the error list while any field has an error.
    pub fn footer(&self) -> String {
        let errors = self.errors();
        if self.show_errors && !errors.is_empty() {
            return errors
                .iter()
                .map(|e| self.theme.focused.error_message.render(e))
                .collect::<Vec<_>>()
                .join("\n");
        }
        if self.show_help && errors.is_empty() {
            let binds = self
                .current_field()
                .map(|f| f.key_binds())
                .unwrap_or_default();
            let enabled: Vec<&Binding> = binds.iter().filter(|b| b.enabled()).collect();
            return self.help.short_help_view(&enabled);
        }
        String::new()
    }
}

impl Model for Group {
    fn init(&self) -> Option<Cmd> {
        None
    }

    fn update(&mut self, msg: Message) -> Option<Cmd> {
        let cmd = if msg.is::<NextFieldMsg>() {
            self.next_field()
        } else if msg.is::<PrevFieldMsg>() {
            self.prev_field()
        } else if msg.is::<KeyMsg>() {
            self.fields
                .get_mut(self.current)
                .and_then(|f| f.update(&msg))
        } else {
            return self.broadcast(&msg);
        };
        self.layout();
        cmd
    }

    fn view(&self) -> String {
        let body = self.view_body();
        let footer = self.footer();
        if footer.is_empty() {
            return body;
        }
        format!("{body}\n\n{footer}")
    }
}
