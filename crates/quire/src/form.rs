//! The form: groups of fields navigated one page at a time.

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::io::{BufRead, Write};

use tracing::debug;

use crate::config::{FormConfig, Layout};
use crate::error::{FormError, Result};
use crate::field::{NextFieldMsg, NextGroupMsg, PrevFieldMsg, PrevGroupMsg, UpdateFieldMsg};
use crate::group::Group;
use crate::key::{KeyMsg, matches_one};
use crate::keymap::KeyMap;
use crate::runtime::{BatchMsg, Cmd, Message, Model, QuitMsg, batch, quit};
use crate::theme::Theme;

/// Form state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    /// User is filling out the form.
    #[default]
    Normal,
    /// User completed the form.
    Completed,
    /// User aborted the form.
    Aborted,
}

/// A form containing multiple groups of fields.
///
/// # Example
///
/// ```rust
/// use quire::{Bound, Form, FormState, Group, KeyMsg, KeyType, MultiSelect, Simulator, new_options};
///
/// let picked = Bound::new(Vec::new());
/// let form = Form::new(vec![Group::new(vec![Box::new(
///     MultiSelect::new()
///         .key("letters")
///         .options(new_options(["A", "B", "C"]))
///         .value(picked.clone()),
/// )])]);
///
/// let mut sim = Simulator::new(form);
/// sim.init();
/// sim.send_key(KeyMsg::from_char('x'));
/// sim.send_key(KeyMsg::from_type(KeyType::Enter));
/// sim.run_until_empty();
///
/// assert_eq!(sim.model().state(), FormState::Completed);
/// assert_eq!(picked.get(), vec!["A".to_string()]);
/// ```
pub struct Form {
    groups: Vec<Group>,
    current: usize,
    state: FormState,
    config: FormConfig,
    theme: Theme,
    keymap: KeyMap,
}

impl Default for Form {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Form {
    /// Creates a new form with the given groups and focuses the first field
    /// of the first visible group.
    pub fn new(groups: Vec<Group>) -> Self {
        let config = FormConfig::default();
        let mut form = Self {
            groups,
            current: 0,
            state: FormState::Normal,
            theme: config.theme.theme(),
            config,
            keymap: KeyMap::default(),
        };
        form.apply();
        form.current = form.first_visible().unwrap_or(0);
        form.update_positions();
        if let Some(group) = form.groups.get_mut(form.current) {
            group.focus_first();
        }
        form
    }

    /// Applies a configuration to the form and everything in it.
    #[must_use]
    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.theme = config.theme.theme();
        self.config = config;
        self.apply();
        self
    }

    /// Sets the theme.
    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self.apply();
        self
    }

    /// Sets the keymap.
    #[must_use]
    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self.apply();
        self
    }

    /// Sets the width given to every field.
    #[must_use]
    pub fn width(mut self, width: usize) -> Self {
        self.config.width = width;
        self.apply();
        self
    }

    /// Sets the viewport height of every group.
    #[must_use]
    pub fn height(mut self, height: usize) -> Self {
        self.config.height = height;
        self.apply();
        self
    }

    /// Sets whether help is shown.
    #[must_use]
    pub fn show_help(mut self, show: bool) -> Self {
        self.config.show_help = show;
        self.apply();
        self
    }

    /// Sets whether errors are shown.
    #[must_use]
    pub fn show_errors(mut self, show: bool) -> Self {
        self.config.show_errors = show;
        self.apply();
        self
    }

    /// Sets the layout.
    #[must_use]
    pub fn layout(mut self, layout: Layout) -> Self {
        self.config.layout = layout;
        self
    }

    /// Sets whether the form should run in accessible mode.
    #[must_use]
    pub fn accessible(mut self, accessible: bool) -> Self {
        self.config.accessible = accessible;
        self
    }

    /// Returns the form state.
    pub fn state(&self) -> FormState {
        self.state
    }

    /// Returns the current group index.
    pub fn current_group(&self) -> usize {
        self.current
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns whether the form has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The groups, in order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// The configuration in effect.
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Whether the form should be run with [`run_accessible`](Self::run_accessible).
    pub fn is_accessible(&self) -> bool {
        self.config.accessible
    }

    /// Errors of the active group's fields.
    pub fn errors(&self) -> Vec<&str> {
        self.groups
            .get(self.current)
            .map(Group::errors)
            .unwrap_or_default()
    }

    /// Returns the committed value of a field by key.
    pub fn get_value(&self, key: &str) -> Option<Box<dyn Any>> {
        self.groups
            .iter()
            .flat_map(|g| g.fields())
            .find(|f| f.get_key() == key)
            .map(|f| f.get_value())
    }

    /// Returns the committed value of a field by key, if it has type `T`.
    pub fn get<T: 'static>(&self, key: &str) -> Option<T> {
        self.get_value(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    /// Returns the string value of a field by key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    /// Checks the form structure: at least one group, no empty group, no
    /// duplicate field keys.
    pub fn check(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(FormError::structure("form has no groups"));
        }
        let mut keys = HashSet::new();
        for (i, group) in self.groups.iter().enumerate() {
            if group.is_empty() {
                return Err(FormError::structure(format!("group {i} has no fields")));
            }
            for field in group.fields() {
                let key = field.get_key();
                if !key.is_empty() && !keys.insert(key) {
                    return Err(FormError::structure(format!("duplicate field key {key:?}")));
                }
            }
        }
        Ok(())
    }

    /// Runs the form as a line-based prompt.
    ///
    /// Visible groups are visited in order. Deferred values are settled
    /// before each group is asked, so options can depend on earlier answers.
    pub fn run_accessible(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<()> {
        self.check()?;
        let mut index = 0;
        while index < self.groups.len() {
            if self.groups[index].is_hidden() {
                index += 1;
                continue;
            }
            self.current = index;
            self.settle(Some(Cmd::message(UpdateFieldMsg)));
            if let Err(err) = self.groups[index].run_accessible(input, output) {
                if err.is_user_abort() {
                    self.state = FormState::Aborted;
                }
                return Err(err);
            }
            index += 1;
        }
        debug!("accessible form completed");
        self.state = FormState::Completed;
        Ok(())
    }

    /// Runs commands to completion without a runtime, feeding results back.
    fn settle(&mut self, cmd: Option<Cmd>) {
        let mut queue: VecDeque<Cmd> = cmd.into_iter().collect();
        while let Some(cmd) = queue.pop_front() {
            let Some(msg) = cmd.execute() else {
                continue;
            };
            if msg.is::<BatchMsg>() {
                if let Some(BatchMsg(cmds)) = msg.downcast() {
                    queue.extend(cmds);
                }
            } else if !msg.is::<QuitMsg>() {
                queue.extend(self.broadcast(&msg));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn apply(&mut self) {
        for group in &mut self.groups {
            group.set_theme(&self.theme);
            group.set_keymap(&self.keymap);
            group.set_width(self.config.width);
            group.set_height(self.config.height);
            group.set_show_help(self.config.show_help);
            group.set_show_errors(self.config.show_errors);
        }
        self.update_positions();
    }

    fn first_visible(&self) -> Option<usize> {
        self.groups.iter().position(|g| !g.is_hidden())
    }

    fn last_visible(&self) -> Option<usize> {
        self.groups.iter().rposition(|g| !g.is_hidden())
    }

    fn update_positions(&mut self) {
        let first = self.first_visible().unwrap_or(0);
        let last = self.last_visible().unwrap_or(0);
        let count = self.groups.len();
        for (i, group) in self.groups.iter_mut().enumerate() {
            group.set_position(i, first, last, count);
        }
    }

    fn broadcast(&mut self, msg: &Message) -> Option<Cmd> {
        let cmds = self.groups.iter_mut().map(|g| g.broadcast(msg)).collect();
        batch(cmds)
    }

    fn next_group(&mut self) -> Option<Cmd> {
        let blur = self
            .groups
            .get_mut(self.current)
            .and_then(Group::blur_current);
        let next = (self.current + 1..self.groups.len()).find(|&i| !self.groups[i].is_hidden());
        let Some(next) = next else {
            debug!(group = self.current, "form completed");
            self.state = FormState::Completed;
            return batch(vec![blur, Some(quit())]);
        };
        debug!(from = self.current, to = next, "next group");
        self.current = next;
        self.update_positions();
        let focus = self.groups[next].focus_first();
        batch(vec![blur, focus])
    }

    fn prev_group(&mut self) -> Option<Cmd> {
        let prev = (0..self.current).rev().find(|&i| !self.groups[i].is_hidden())?;
        let blur = self.groups[self.current].blur_current();
        debug!(from = self.current, to = prev, "previous group");
        self.current = prev;
        self.update_positions();
        let focus = self.groups[prev].focus_last();
        batch(vec![blur, focus])
    }
}

impl Model for Form {
    fn init(&self) -> Option<Cmd> {
        Some(Cmd::message(UpdateFieldMsg))
    }

    fn update(&mut self, msg: Message) -> Option<Cmd> {
        if self.state != FormState::Normal {
            return None;
        }
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            if matches_one(key, &self.keymap.quit) {
                debug!(group = self.current, "form aborted");
                self.state = FormState::Aborted;
                return Some(quit());
            }
        }

        if msg.is::<NextGroupMsg>() {
            let cmd = self.next_group();
            return batch(vec![cmd, Some(Cmd::message(UpdateFieldMsg))]);
        }
        if msg.is::<PrevGroupMsg>() {
            let cmd = self.prev_group();
            return batch(vec![cmd, Some(Cmd::message(UpdateFieldMsg))]);
        }

        let targeted =
            msg.is::<KeyMsg>() || msg.is::<NextFieldMsg>() || msg.is::<PrevFieldMsg>();
        if !targeted {
            return self.broadcast(&msg);
        }
        let cmd = self
            .groups
            .get_mut(self.current)
            .and_then(|g| g.update(msg));
        batch(vec![cmd, Some(Cmd::message(UpdateFieldMsg))])
    }

    fn view(&self) -> String {
        if self.state != FormState::Normal {
            return String::new();
        }
        match self.config.layout {
            Layout::Default => self
                .groups
                .get(self.current)
                .map(Model::view)
                .unwrap_or_default(),
            Layout::Stack => {
                let mut out: Vec<String> = self
                    .groups
                    .iter()
                    .filter(|g| !g.is_hidden())
                    .map(Group::view_body)
                    .collect();
                if let Some(footer) = self.groups.get(self.current).map(Group::footer) {
                    if !footer.is_empty() {
                        out.push(footer);
                    }
                }
                out.join("\n\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::key::KeyType;
    use crate::option::new_options;
    use crate::select::Select;
    use crate::text::Text;

    fn text(key: &str) -> Box<dyn Field> {
        Box::new(Text::new().key(key).title(key))
    }

    #[test]
    fn test_form_state_default() {
        assert_eq!(FormState::default(), FormState::Normal);
    }

    #[test]
    fn test_check_structure() {
        assert!(matches!(Form::new(Vec::new()).check(), Err(FormError::Structure(_))));

        let form = Form::new(vec![Group::new(vec![text("a")]), Group::new(Vec::new())]);
        assert_eq!(
            form.check(),
            Err(FormError::structure("group 1 has no fields"))
        );

        let form = Form::new(vec![Group::new(vec![text("a"), text("a")])]);
        assert!(form.check().unwrap_err().to_string().contains("duplicate"));

        let form = Form::new(vec![Group::new(vec![text("a"), text("b")])]);
        assert!(form.check().is_ok());
    }

    #[test]
    fn test_quit_aborts() {
        let mut form = Form::new(vec![Group::new(vec![text("a")])]);
        let cmd = form.update(Message::new(KeyMsg::from_type(KeyType::CtrlC)));
        assert!(cmd.unwrap().execute().unwrap().is::<QuitMsg>());
        assert_eq!(form.state(), FormState::Aborted);
        assert_eq!(form.view(), "");
    }

    #[test]
    fn test_hidden_groups_are_skipped() {
        let mut form = Form::new(vec![
            Group::new(vec![text("a")]),
            Group::new(vec![text("b")]).hide(true),
            Group::new(vec![text("c")]),
        ]);
        form.update(Message::new(NextGroupMsg));
        assert_eq!(form.current_group(), 2);
        form.update(Message::new(PrevGroupMsg));
        assert_eq!(form.current_group(), 0);
        // At the first visible group, going back does nothing.
        form.update(Message::new(PrevGroupMsg));
        assert_eq!(form.current_group(), 0);
        assert_eq!(form.state(), FormState::Normal);
    }

    #[test]
    fn test_first_group_hidden() {
        let form = Form::new(vec![
            Group::new(vec![text("a")]).hide(true),
            Group::new(vec![text("b")]),
        ]);
        assert_eq!(form.current_group(), 1);
    }

    #[test]
    fn test_next_group_past_last_completes() {
        let mut form = Form::new(vec![Group::new(vec![text("a")])]);
        let cmd = form.update(Message::new(NextGroupMsg));
        assert!(cmd.is_some());
        assert_eq!(form.state(), FormState::Completed);
    }

    #[test]
    fn test_get_typed_values() {
        let form = Form::new(vec![Group::new(vec![
            Box::new(Text::new().key("name").value(crate::Bound::new("Ada".to_string()))),
            Box::new(
                Select::new()
                    .key("n")
                    .options(vec![crate::SelectOption::new("one", 1)])
                    .value(crate::Bound::new(1)),
            ),
        ])]);
        assert_eq!(form.get_string("name").as_deref(), Some("Ada"));
        assert_eq!(form.get::<i32>("n"), Some(1));
        assert_eq!(form.get::<String>("n"), None);
        assert!(form.get_value("missing").is_none());
    }

    #[test]
    fn test_stack_layout_shows_every_visible_group() {
        let form = Form::new(vec![
            Group::new(vec![text("first")]),
            Group::new(vec![text("hidden")]).hide(true),
            Group::new(vec![text("second")]),
        ])
        .layout(Layout::Stack);
        let view = form.view();
        assert!(view.contains("first"));
        assert!(view.contains("second"));
        assert!(!view.contains("hidden"));
    }

    #[test]
    fn test_accessible_run_requires_valid_structure() {
        let mut form = Form::new(Vec::new());
        let mut input = std::io::Cursor::new("");
        let mut output = Vec::new();
        assert!(matches!(
            form.run_accessible(&mut input, &mut output),
            Err(FormError::Structure(_))
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn test_accessible_run_eof_aborts() {
        let mut form = Form::new(vec![Group::new(vec![Box::new(
            Select::new().options(new_options(["a", "b"])),
        ) as Box<dyn Field>])]);
        let mut input = std::io::Cursor::new("");
        let mut output = Vec::new();
        assert_eq!(
            form.run_accessible(&mut input, &mut output),
            Err(FormError::UserAborted)
        );
        assert_eq!(form.state(), FormState::Aborted);
    }
}
