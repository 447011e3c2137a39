//! A single-choice field over a filterable option list.

use std::any::Any;
use std::hash::Hash;
use std::io::{BufRead, Write};

use crate::accessible::prompt_int;
use crate::bound::Bound;
use crate::error::Result;
use crate::eval::{Eval, EvalDoneMsg, EvalSlot, Refresh};
use crate::field::{Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::header::{Header, body_rows};
use crate::key::{Binding, KeyMsg, KeyType, matches, matches_one};
use crate::keymap::{KeyMap, SelectKeyMap};
use crate::list::{CursorMove, OptionList};
use crate::option::SelectOption;
use crate::runtime::{Cmd, Message, batch};
use crate::spinner::{SpinnerTickMsg, SpinnerType, spinner_tick};
use crate::theme::{FieldStyles, Theme};
use crate::validate::Validator;

/// A select field. The committed value is the value of the option under the
/// cursor.
///
/// # Example
///
/// ```rust
/// use quire::{Bound, Field, Select, new_options};
///
/// let country = Bound::new(String::new());
/// let mut field = Select::new()
///     .title("Country")
///     .options(new_options(["Canada", "France", "Japan"]))
///     .value(country.clone());
///
/// field.set_filter_value("fr");
/// field.blur();
/// assert_eq!(country.get(), "France");
/// ```
pub struct Select<T: Clone + PartialEq + Default + Send + Sync + 'static> {
    id: usize,
    key: String,
    value: Bound<T>,
    header: Header,
    options: Eval<Vec<SelectOption<T>>>,
    list: OptionList<T>,
    filterable: bool,
    focused: bool,
    error: Option<String>,
    validate: Option<Validator<T>>,
    width: usize,
    height: usize,
    theme: Theme,
    custom_theme: bool,
    keymap: SelectKeyMap,
    position: FieldPosition,
    spinner: SpinnerType,
    spinner_frame: usize,
}

impl<T: Clone + PartialEq + Default + Send + Sync + 'static> Default for Select<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Default + Send + Sync + 'static> Select<T> {
    /// Creates a new select field.
    pub fn new() -> Self {
        let mut field = Self {
            id: crate::next_id(),
            key: String::new(),
            value: Bound::new(T::default()),
            header: Header::default(),
            options: Eval::fixed(Vec::new()),
            list: OptionList::new(),
            filterable: true,
            focused: false,
            error: None,
            validate: None,
            width: 0,
            height: 0,
            theme: Theme::default(),
            custom_theme: false,
            keymap: SelectKeyMap::default(),
            position: FieldPosition::default(),
            spinner: SpinnerType::default(),
            spinner_frame: 0,
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
        self.update_list_height();
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
        self.update_list_height();
        self
    }

    /// Sets a fixed description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.header.set_description(description.into());
        self.update_list_height();
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
        self.update_list_height();
        self
    }

    /// Sets fixed options.
    #[must_use]
    pub fn options(mut self, options: Vec<SelectOption<T>>) -> Self {
        self.options.set_value(options.clone());
        self.set_options(options);
        self
    }

    /// Computes the options from `bindings` whenever they change.
    #[must_use]
    pub fn options_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> Vec<SelectOption<T>> + Send + Sync + 'static,
        B: Hash + Send + Sync + 'static,
    {
        self.options.set_func(move || Ok(f()), bindings);
        self
    }

    /// Binds the committed value. The option holding it gets the cursor.
    #[must_use]
    pub fn value(mut self, value: Bound<T>) -> Self {
        self.value = value;
        self.select_current_value();
        self
    }

    /// Sets whether `/` opens the filter.
    #[must_use]
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self.sync_bindings();
        self
    }

    /// Sets the total height in rows, including title and description.
    #[must_use]
    pub fn height(mut self, height: usize) -> Self {
        self.height = height;
        self.update_list_height();
        self
    }

    /// Sets the validation function.
    #[must_use]
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
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

    /// Replaces the option list. The cursor lands on a `selected` option, or
    /// on the one matching the bound value.
    pub fn set_options(&mut self, options: Vec<SelectOption<T>>) {
        self.list.set_options(options);
        self.select_current_value();
        self.sync_bindings();
    }

    fn select_current_value(&mut self) {
        let current = self.value.get();
        let flagged = self.list.options().iter().position(|opt| opt.selected);
        let matching = self
            .list
            .options()
            .iter()
            .position(|opt| opt.value == current);
        if let Some(index) = flagged.or(matching) {
            self.list.set_cursor_to_option(index);
        }
    }

    /// Moves the cursor.
    pub fn move_cursor(&mut self, movement: CursorMove) {
        self.list.move_cursor(movement);
    }

    /// Replaces the filter text.
    pub fn set_filter_value(&mut self, filter: &str) {
        self.list.set_filter_value(filter);
        self.sync_bindings();
        self.update_list_height();
    }

    /// Writes the option under the cursor into the bound value and validates
    /// it. With no option under the cursor the bound value is left alone.
    pub fn commit(&mut self) {
        if let Some(index) = self.list.current() {
            self.value.set(self.list.options()[index].value.clone());
        }
        let value = self.value.get();
        self.error = self.validate.as_ref().and_then(|f| f(&value));
        self.update_list_height();
    }

    /// Cursor position within the filtered options.
    pub fn cursor(&self) -> usize {
        self.list.cursor()
    }

    /// Keys of the options passing the filter, in order.
    pub fn filtered_keys(&self) -> Vec<&str> {
        self.list
            .filtered_options()
            .map(|opt| opt.key.as_str())
            .collect()
    }

    /// The option under the cursor.
    pub fn hovered(&self) -> Option<&SelectOption<T>> {
        self.list.current().map(|i| &self.list.options()[i])
    }

    /// Whether filter entry is active.
    pub fn is_filtering(&self) -> bool {
        self.list.filtering()
    }

    /// Whether the title row is needed for the filter prompt or an error.
    fn title_row(&self) -> bool {
        self.list.filtering() || self.error.is_some()
    }

    fn update_list_height(&mut self) {
        let header = self.header.rows(self.title_row());
        self.list.set_height(body_rows(self.height, header));
    }

    fn sync_bindings(&mut self) {
        let filtering = self.list.filtering();
        let has_filter = !self.list.filter_value().is_empty();
        let km = &mut self.keymap;
        km.filter.enable(self.filterable && !filtering);
        km.set_filter.enable(filtering);
        km.clear_filter.enable(!filtering && has_filter);
        km.prev.enable(!filtering && !self.position.is_first());
        km.next.enable(!filtering && !self.position.is_last());
        km.submit.enable(!filtering && self.position.is_last());
    }

    fn styles(&self) -> &FieldStyles {
        if self.focused {
            &self.theme.focused
        } else {
            &self.theme.blurred
        }
    }

    fn refresh(&mut self) -> Option<Cmd> {
        let header = self.header.refresh(self.id);
        let options = match self.options.refresh(self.id, EvalSlot::Options) {
            Refresh::Current => None,
            Refresh::Cached => {
                let options = self.options.value().clone();
                self.set_options(options);
                None
            }
            Refresh::Dispatched(cmd) => batch(vec![
                Some(cmd),
                Some(spinner_tick(self.id, self.spinner)),
            ]),
        };
        self.update_list_height();
        batch(vec![header, options])
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        if self.list.filtering() {
            if matches_one(key, &self.keymap.set_filter) {
                self.list.set_filtering(false);
            } else {
                match key.key_type {
                    KeyType::Up | KeyType::CtrlP => self.move_cursor(CursorMove::Up),
                    KeyType::Down | KeyType::CtrlN => self.move_cursor(CursorMove::Down),
                    KeyType::Backspace => self.list.pop_filter(),
                    KeyType::Space => self.list.push_filter(" "),
                    KeyType::Runes => {
                        let text: String = key.runes.iter().collect();
                        self.list.push_filter(&text);
                    }
                    _ => {}
                }
            }
            self.sync_bindings();
            return None;
        }

        let km = &self.keymap;
        if matches_one(key, &km.prev) {
            self.commit();
            if self.error.is_some() {
                return None;
            }
            return Some(Cmd::message(PrevFieldMsg));
        }
        if matches(key, &[&km.next, &km.submit]) {
            self.commit();
            if self.error.is_some() {
                return None;
            }
            return Some(Cmd::message(NextFieldMsg));
        }

        if matches_one(key, &km.up) {
            self.move_cursor(CursorMove::Up);
        } else if matches_one(key, &km.down) {
            self.move_cursor(CursorMove::Down);
        } else if matches_one(key, &km.half_page_up) {
            self.move_cursor(CursorMove::HalfPageUp);
        } else if matches_one(key, &km.half_page_down) {
            self.move_cursor(CursorMove::HalfPageDown);
        } else if matches_one(key, &km.goto_top) {
            self.move_cursor(CursorMove::Top);
        } else if matches_one(key, &km.goto_bottom) {
            self.move_cursor(CursorMove::Bottom);
        } else if matches_one(key, &km.filter) {
            self.list.set_filtering(true);
        } else if matches_one(key, &km.clear_filter) {
            self.list.clear_filter();
        }
        self.sync_bindings();
        None
    }

    fn options_view(&self) -> String {
        let styles = self.styles();
        if self.options.is_loading() {
            let frame = styles
                .select_selector
                .render(self.spinner.frame(self.spinner_frame));
            return format!("{frame} Loading...");
        }
        let selector = styles.select_selector.string();
        let blank = " ".repeat(unicode_width::UnicodeWidthStr::width(
            styles.select_selector.value(),
        ));
        let mut rows: Vec<String> = self
            .list
            .visible_rows()
            .map(|row| {
                let option = &self.list.options()[self.list.filtered()[row]];
                if self.focused && row == self.list.cursor() {
                    format!("{selector}{}", styles.selected_option.render(&option.key))
                } else {
                    format!("{blank}{}", styles.option.render(&option.key))
                }
            })
            .collect();
        let height = self.list.height();
        while height > 0 && rows.len() < height {
            rows.push(String::new());
        }
        if let Some(err) = self.options.error() {
            rows.push(styles.error_message.render(err));
        }
        rows.join("\n")
    }
}

impl<T: Clone + PartialEq + Default + Send + Sync + 'static> Field for Select<T> {
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
        self.refresh()
    }

    fn update(&mut self, msg: &Message) -> Option<Cmd> {
        if msg.is::<UpdateFieldMsg>() {
            return self.refresh();
        }
        if let Some(done) = msg.downcast_ref::<EvalDoneMsg<String>>() {
            if self.header.deliver(self.id, done) {
                self.update_list_height();
            }
            return None;
        }
        if let Some(done) = msg.downcast_ref::<EvalDoneMsg<Vec<SelectOption<T>>>>() {
            if done.id == self.id
                && self.options.deliver(done.hash, done.result.clone())
                && self.options.error().is_none()
            {
                let options = self.options.value().clone();
                self.set_options(options);
            }
            return None;
        }
        if let Some(tick) = msg.downcast_ref::<SpinnerTickMsg>() {
            if tick.id != self.id || !self.options.is_pending() {
                return None;
            }
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
            return Some(spinner_tick(self.id, self.spinner));
        }
        if !self.focused {
            return None;
        }
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            self.error = None;
            let cmd = self.handle_key(key);
            self.update_list_height();
            return cmd;
        }
        None
    }

    fn view(&self) -> String {
        let styles = self.styles();
        let mut out = String::new();
        if self.list.filtering() {
            out.push_str(&styles.text_input.prompt.string());
            out.push_str(&styles.text_input.text.render(self.list.filter_value()));
            out.push_str(&styles.text_input.cursor.render("▏"));
            out.push('\n');
        } else if self.header.has_title() || self.title_row() {
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
        out.push_str(&self.options_view());
        styles.base.render(&out)
    }

    fn focus(&mut self) -> Option<Cmd> {
        self.focused = true;
        self.sync_bindings();
        None
    }

    fn blur(&mut self) -> Option<Cmd> {
        self.focused = false;
        if self.list.filtering() {
            self.list.set_filtering(false);
            self.sync_bindings();
        }
        self.commit();
        None
    }

    fn key_binds(&self) -> Vec<Binding> {
        let km = &self.keymap;
        vec![
            km.up.clone(),
            km.down.clone(),
            km.filter.clone(),
            km.set_filter.clone(),
            km.clear_filter.clone(),
            km.prev.clone(),
            km.next.clone(),
            km.submit.clone(),
        ]
    }

    fn with_theme(&mut self, theme: &Theme) {
        if !self.custom_theme {
            self.theme = theme.clone();
        }
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.select.clone();
        self.sync_bindings();
    }

    fn with_width(&mut self, width: usize) {
        self.width = width;
    }

    fn with_height(&mut self, height: usize) {
        self.height = height;
        self.update_list_height();
    }

    fn with_position(&mut self, position: FieldPosition) {
        self.position = position;
        self.sync_bindings();
    }

    fn run_accessible(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<()> {
        self.list.clear_filter();
        let count = self.list.options().len();
        writeln!(output, "{}", self.header.title())?;
        if count == 0 {
            self.commit();
            return Ok(());
        }
        for (i, option) in self.list.options().iter().enumerate() {
            writeln!(output, "{}. {}", i + 1, option.key)?;
        }
        loop {
            let choice = prompt_int(input, output, "Choose:", 1, count)?;
            self.list.set_cursor(choice - 1);
            self.commit();
            match &self.error {
                Some(err) => writeln!(output, "{err}")?,
                None => {
                    writeln!(output, "Selected: {}", self.list.options()[choice - 1].key)?;
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::new_options;

    fn press(field: &mut Select<String>, key: KeyMsg) -> Option<Cmd> {
        field.update(&Message::new(key))
    }

    fn fruit() -> Select<String> {
        Select::new().options(new_options(["Apple", "Banana", "Cherry"]))
    }

    #[test]
    fn test_commit_takes_cursor_option() {
        let value = Bound::new(String::new());
        let mut field = fruit().value(value.clone());
        field.focus();
        press(&mut field, KeyMsg::from_type(KeyType::Down));
        press(&mut field, KeyMsg::from_type(KeyType::Enter));
        assert_eq!(value.get(), "Banana");
    }

    #[test]
    fn test_bound_value_positions_cursor() {
        let value = Bound::new("Cherry".to_string());
        let field = fruit().value(value);
        assert_eq!(field.cursor(), 2);
        assert_eq!(field.hovered().map(|o| o.key.as_str()), Some("Cherry"));
    }

    #[test]
    fn test_empty_filter_keeps_old_value() {
        let value = Bound::new("Apple".to_string());
        let mut field = fruit().value(value.clone());
        field.set_filter_value("zzz");
        field.commit();
        assert_eq!(value.get(), "Apple");
    }

    #[test]
    fn test_filter_then_select() {
        let value = Bound::new(String::new());
        let mut field = fruit().value(value.clone());
        field.focus();
        press(&mut field, KeyMsg::from_char('/'));
        assert!(field.is_filtering());
        press(&mut field, KeyMsg::from_char('c'));
        press(&mut field, KeyMsg::from_char('h'));
        assert_eq!(field.filtered_keys(), vec!["Cherry"]);
        press(&mut field, KeyMsg::from_type(KeyType::Enter));
        assert!(!field.is_filtering());
        let cmd = press(&mut field, KeyMsg::from_type(KeyType::Enter)).unwrap();
        assert!(cmd.execute().unwrap().is::<NextFieldMsg>());
        assert_eq!(value.get(), "Cherry");
    }

    #[test]
    fn test_validation_blocks() {
        let mut field = fruit().validate(|v: &String| {
            (v == "Apple").then(|| "no apples".to_string())
        });
        field.focus();
        assert!(press(&mut field, KeyMsg::from_type(KeyType::Enter)).is_none());
        assert_eq!(field.error(), Some("no apples"));
        press(&mut field, KeyMsg::from_char('j'));
        assert!(field.error().is_none());
        assert!(press(&mut field, KeyMsg::from_type(KeyType::Enter)).is_some());
    }

    #[test]
    fn test_height_holds_with_filter_and_error_rows() {
        let mut field = Select::new()
            .options(new_options((0..10).map(|i| format!("item {i}"))))
            .validate(|v: &String| (v == "item 0").then(|| "pick another".to_string()))
            .height(4);
        field.focus();
        assert_eq!(field.view().lines().count(), 4);

        press(&mut field, KeyMsg::from_char('/'));
        assert_eq!(field.view().lines().count(), 4);
        press(&mut field, KeyMsg::from_type(KeyType::Esc));

        assert!(press(&mut field, KeyMsg::from_type(KeyType::Enter)).is_none());
        assert_eq!(field.error(), Some("pick another"));
        assert_eq!(field.view().lines().count(), 4);
    }

    #[test]
    fn test_view_marks_cursor() {
        let mut field = fruit().title("Fruit");
        field.focus();
        let view = field.view();
        assert!(view.contains("Fruit"));
        assert!(view.contains("> "));
        assert!(view.contains("Cherry"));
    }

    #[test]
    fn test_accessible_reprompts_out_of_range() {
        let value = Bound::new(String::new());
        let mut field = fruit().title("Fruit").value(value.clone());
        let mut input = std::io::Cursor::new("7\n2\n");
        let mut output = Vec::new();
        field.run_accessible(&mut input, &mut output).unwrap();
        assert_eq!(value.get(), "Banana");
        let out = String::from_utf8(output).unwrap();
        assert!(out.contains("Invalid: must be a number between 1 and 3"));
    }
}
