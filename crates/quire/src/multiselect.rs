//! A multi-select field with a selection limit, live filtering and lazily
//! computed options.

use std::any::Any;
use std::collections::BTreeSet;
use std::hash::Hash;
use std::io::{BufRead, Write};

use tracing::debug;

use crate::accessible::prompt_int;
use crate::bound::Bound;
use crate::error::{FormError, Result};
use crate::eval::{Eval, EvalDoneMsg, EvalSlot, Refresh};
use crate::field::{Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::header::{Header, body_rows};
use crate::key::{Binding, KeyMsg, KeyType, matches, matches_one};
use crate::keymap::{KeyMap, MultiSelectKeyMap};
use crate::list::{CursorMove, OptionList};
use crate::option::SelectOption;
use crate::runtime::{Cmd, Message, batch};
use crate::spinner::{SpinnerTickMsg, SpinnerType, spinner_tick};
use crate::theme::{FieldStyles, Theme};
use crate::validate::SelectionValidator;

/// A multi-select field.
///
/// Selection is tracked by option position, so options with duplicate keys
/// or values are independent. The committed value lists the selected
/// options' values in option order.
///
/// # Example
///
/// ```rust
/// use quire::{Bound, MultiSelect, new_options};
///
/// let toppings = Bound::new(Vec::new());
/// let mut field = MultiSelect::new()
///     .title("Toppings")
///     .options(new_options(["Lettuce", "Tomato", "Cheese"]))
///     .limit(2)
///     .value(toppings.clone());
///
/// field.toggle_select(0).unwrap();
/// field.toggle_select(2).unwrap();
/// assert!(field.toggle_select(1).is_err());
///
/// field.commit();
/// assert_eq!(toppings.get(), vec!["Lettuce".to_string(), "Cheese".to_string()]);
/// ```
pub struct MultiSelect<T: Clone + PartialEq + Send + Sync + 'static> {
    id: usize,
    key: String,
    value: Bound<Vec<T>>,
    header: Header,
    options: Eval<Vec<SelectOption<T>>>,
    list: OptionList<T>,
    selected: BTreeSet<usize>,
    limit: usize,
    filterable: bool,
    focused: bool,
    error: Option<String>,
    notice: Option<String>,
    validate: Option<SelectionValidator<T>>,
    width: usize,
    height: usize,
    theme: Theme,
    custom_theme: bool,
    keymap: MultiSelectKeyMap,
    position: FieldPosition,
    spinner: SpinnerType,
    spinner_frame: usize,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Default for MultiSelect<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> MultiSelect<T> {
    /// Creates a new multi-select field with no options and no limit.
    pub fn new() -> Self {
        let mut field = Self {
            id: crate::next_id(),
            key: String::new(),
            value: Bound::new(Vec::new()),
            header: Header::default(),
            options: Eval::fixed(Vec::new()),
            list: OptionList::new(),
            selected: BTreeSet::new(),
            limit: 0,
            filterable: true,
            focused: false,
            error: None,
            notice: None,
            validate: None,
            width: 0,
            height: 0,
            theme: Theme::default(),
            custom_theme: false,
            keymap: MultiSelectKeyMap::default(),
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
    pub fn options_func<F, B>(self, f: F, bindings: B) -> Self
    where
        F: Fn() -> Vec<SelectOption<T>> + Send + Sync + 'static,
        B: Hash + Send + Sync + 'static,
    {
        self.try_options_func(move || Ok(f()), bindings)
    }

    /// Like [`options_func`](Self::options_func) for a computation that can
    /// fail. A failure keeps the previous options and shows the message.
    #[must_use]
    pub fn try_options_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> std::result::Result<Vec<SelectOption<T>>, String> + Send + Sync + 'static,
        B: Hash + Send + Sync + 'static,
    {
        self.options.set_func(f, bindings);
        self
    }

    /// Binds the committed value. Options whose value is already in it
    /// start out selected.
    #[must_use]
    pub fn value(mut self, value: Bound<Vec<T>>) -> Self {
        self.value = value;
        self.apply_selection_from_options();
        self
    }

    /// Sets the maximum number of selections; 0 means no limit.
    ///
    /// Selections already made beyond the limit are dropped, highest option
    /// first.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self.truncate_to_limit();
        self.sync_bindings();
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
    /// 0 shows every option.
    #[must_use]
    pub fn height(mut self, height: usize) -> Self {
        self.height = height;
        self.update_list_height();
        self
    }

    /// Sets the validation function, run on the selected values.
    #[must_use]
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&[T]) -> Option<String> + Send + Sync + 'static,
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

    /// Sets the loading spinner animation.
    #[must_use]
    pub fn spinner(mut self, spinner: SpinnerType) -> Self {
        self.spinner = spinner;
        self
    }

    // -------------------------------------------------------------------------
    // Engine operations
    // -------------------------------------------------------------------------

    /// Replaces the full option set.
    ///
    /// The filter is cleared, selection is re-derived from the options'
    /// `selected` flags and the bound value, and the cursor moves to the
    /// first selected option.
    pub fn set_options(&mut self, options: Vec<SelectOption<T>>) {
        self.list.set_options(options);
        self.apply_selection_from_options();
        self.sync_bindings();
    }

    fn apply_selection_from_options(&mut self) {
        let committed = self.value.get();
        self.selected = self
            .list
            .options()
            .iter()
            .enumerate()
            .filter(|(_, opt)| opt.selected || committed.contains(&opt.value))
            .map(|(i, _)| i)
            .collect();
        self.truncate_to_limit();
        let lowest = self.selected.first().copied().unwrap_or(0);
        self.list.set_cursor(lowest);
    }

    fn truncate_to_limit(&mut self) {
        if self.limit == 0 {
            return;
        }
        while self.selected.len() > self.limit {
            self.selected.pop_last();
        }
    }

    /// Flips the selection of the option at `index` in the filtered list.
    ///
    /// Fails with [`FormError::LimitExceeded`] when selecting would exceed a
    /// positive limit; the selection is left untouched. Out-of-range indices
    /// do nothing.
    pub fn toggle_select(&mut self, index: usize) -> Result<()> {
        let Some(&option) = self.list.filtered().get(index) else {
            return Ok(());
        };
        if self.selected.remove(&option) {
            self.sync_bindings();
            return Ok(());
        }
        if self.limit > 0 && self.selected.len() >= self.limit {
            return Err(FormError::LimitExceeded(self.limit));
        }
        self.selected.insert(option);
        self.sync_bindings();
        Ok(())
    }

    /// Selects every filtered option, or deselects them all if they are all
    /// selected already. Does nothing when a limit is set.
    pub fn toggle_all(&mut self) {
        if self.limit > 0 {
            return;
        }
        if self.all_filtered_selected() {
            for i in self.list.filtered() {
                self.selected.remove(i);
            }
        } else {
            self.selected.extend(self.list.filtered().iter().copied());
        }
        self.sync_bindings();
    }

    fn all_filtered_selected(&self) -> bool {
        self.list
            .filtered()
            .iter()
            .all(|i| self.selected.contains(i))
    }

    /// Moves the cursor.
    pub fn move_cursor(&mut self, movement: CursorMove) {
        self.list.move_cursor(movement);
    }

    /// Enters or leaves filter entry.
    pub fn set_filtering(&mut self, filtering: bool) {
        self.list.set_filtering(filtering);
        self.sync_bindings();
        self.update_list_height();
    }

    /// Replaces the filter text.
    pub fn set_filter_value(&mut self, filter: &str) {
        self.list.set_filter_value(filter);
        self.sync_bindings();
        self.update_list_height();
    }

    /// Writes the selected values into the bound value and validates them.
    /// Calling it twice in a row changes nothing.
    pub fn commit(&mut self) {
        let values = self.selected_values();
        self.error = self.validate.as_ref().and_then(|f| f(&values));
        self.value.set(values);
        self.update_list_height();
    }

    /// Values of the selected options, in option order.
    pub fn selected_values(&self) -> Vec<T> {
        self.selected
            .iter()
            .filter_map(|&i| self.list.options().get(i))
            .map(|opt| opt.value.clone())
            .collect()
    }

    /// Indices of the selected options in the full option list.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// The full option list.
    pub fn all_options(&self) -> &[SelectOption<T>] {
        self.list.options()
    }

    /// Keys of the options passing the filter, in order.
    pub fn filtered_keys(&self) -> Vec<&str> {
        self.list
            .filtered_options()
            .map(|opt| opt.key.as_str())
            .collect()
    }

    /// Cursor position within the filtered options.
    pub fn cursor(&self) -> usize {
        self.list.cursor()
    }

    /// First visible row of the option list.
    pub fn offset(&self) -> usize {
        self.list.offset()
    }

    /// Number of option rows shown, 0 when unbounded.
    pub fn visible_height(&self) -> usize {
        self.list.height()
    }

    /// Whether filter entry is active.
    pub fn is_filtering(&self) -> bool {
        self.list.filtering()
    }

    /// The current filter text.
    pub fn filter_value(&self) -> &str {
        self.list.filter_value()
    }

    /// The transient message from the last rejected toggle.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The current title.
    pub fn title_value(&self) -> &str {
        self.header.title()
    }

    /// The current description.
    pub fn description_value(&self) -> &str {
        self.header.description()
    }

    /// Whether a deferred option computation is in flight.
    pub fn is_loading(&self) -> bool {
        self.options.is_pending()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Whether the title row is needed for something besides the title.
    fn title_row(&self) -> bool {
        self.list.filtering()
            || !self.list.filter_value().is_empty()
            || self.error.is_some()
            || self.notice.is_some()
    }

    fn update_list_height(&mut self) {
        let header = self.header.rows(self.title_row());
        self.list.set_height(body_rows(self.height, header));
    }

    fn sync_bindings(&mut self) {
        let filtering = self.list.filtering();
        let has_filter = !self.list.filter_value().is_empty();
        let all_selected = self.all_filtered_selected();
        let km = &mut self.keymap;

        km.filter.enable(self.filterable && !filtering);
        km.set_filter.enable(filtering);
        km.clear_filter.enable(!filtering && has_filter);
        km.prev.enable(!filtering && !self.position.is_first());
        km.next.enable(!filtering && !self.position.is_last());
        km.submit.enable(!filtering && self.position.is_last());
        km.select_all
            .enable(self.limit == 0 && !filtering && !all_selected);
        km.select_none
            .enable(self.limit == 0 && !filtering && all_selected && !self.list.is_empty());
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

    fn handle_filter_key(&mut self, key: &KeyMsg) {
        if matches_one(key, &self.keymap.set_filter) {
            self.set_filtering(false);
            return;
        }
        match key.key_type {
            KeyType::Up | KeyType::CtrlP => self.move_cursor(CursorMove::Up),
            KeyType::Down | KeyType::CtrlN => self.move_cursor(CursorMove::Down),
            KeyType::CtrlU => self.move_cursor(CursorMove::HalfPageUp),
            KeyType::CtrlD => self.move_cursor(CursorMove::HalfPageDown),
            KeyType::Backspace => self.list.pop_filter(),
            KeyType::Space => self.list.push_filter(" "),
            KeyType::Runes => {
                let text: String = key.runes.iter().collect();
                self.list.push_filter(&text);
            }
            _ => {}
        }
        self.sync_bindings();
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        if self.list.filtering() {
            self.handle_filter_key(key);
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

        if matches_one(key, &km.toggle) {
            if let Err(err) = self.toggle_select(self.list.cursor()) {
                debug!(id = self.id, limit = self.limit, "selection limit reached");
                self.notice = Some(err.to_string());
            }
        } else if matches(key, &[&km.select_all, &km.select_none]) {
            self.toggle_all();
        } else if matches_one(key, &km.up) {
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
            self.set_filtering(true);
        } else if matches_one(key, &km.clear_filter) {
            self.list.clear_filter();
            self.sync_bindings();
        }
        None
    }

    fn title_view(&self) -> String {
        let styles = self.styles();
        let mut out = String::new();
        if self.list.filtering() {
            out.push_str(&styles.text_input.prompt.string());
            out.push_str(&styles.text_input.text.render(self.list.filter_value()));
            out.push_str(&styles.text_input.cursor.render("▏"));
        } else if !self.list.filter_value().is_empty() {
            out.push_str(&styles.title.render(self.header.title()));
            out.push_str(
                &styles
                    .description
                    .render(&format!("/{}", self.list.filter_value())),
            );
        } else {
            out.push_str(&styles.title.render(self.header.title()));
        }
        if self.error.is_some() {
            out.push_str(&styles.error_indicator.string());
        }
        if let Some(notice) = &self.notice {
            out.push(' ');
            out.push_str(&styles.error_message.render(notice));
        }
        out
    }

    fn options_view(&self) -> String {
        let styles = self.styles();
        if self.options.is_loading() {
            let frame = styles
                .multi_select_selector
                .render(self.spinner.frame(self.spinner_frame));
            return format!("{frame} Loading...");
        }

        let selector = styles.multi_select_selector.string();
        let blank = " ".repeat(unicode_width::UnicodeWidthStr::width(
            styles.multi_select_selector.value(),
        ));

        let mut rows: Vec<String> = self
            .list
            .visible_rows()
            .map(|row| {
                let index = self.list.filtered()[row];
                let option = &self.list.options()[index];
                let mut line = if self.focused && row == self.list.cursor() {
                    selector.clone()
                } else {
                    blank.clone()
                };
                if self.selected.contains(&index) {
                    line.push_str(&styles.selected_prefix.string());
                    line.push_str(&styles.selected_option.render(&option.key));
                } else {
                    line.push_str(&styles.unselected_prefix.string());
                    line.push_str(&styles.unselected_option.render(&option.key));
                }
                line
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

impl<T: Clone + PartialEq + Send + Sync + 'static> Field for MultiSelect<T> {
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
            self.notice = None;
            let cmd = self.handle_key(key);
            self.update_list_height();
            return cmd;
        }
        None
    }

    fn view(&self) -> String {
        let styles = self.styles();
        let mut out = String::new();
        if self.header.has_title() || self.title_row() {
            out.push_str(&self.title_view());
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
        self.notice = None;
        if self.list.filtering() {
            self.set_filtering(false);
        }
        self.commit();
        None
    }

    fn key_binds(&self) -> Vec<Binding> {
        let km = &self.keymap;
        vec![
            km.toggle.clone(),
            km.up.clone(),
            km.down.clone(),
            km.filter.clone(),
            km.set_filter.clone(),
            km.clear_filter.clone(),
            km.prev.clone(),
            km.submit.clone(),
            km.next.clone(),
            km.select_all.clone(),
            km.select_none.clone(),
        ]
    }

    fn with_theme(&mut self, theme: &Theme) {
        if !self.custom_theme {
            self.theme = theme.clone();
        }
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.multi_select.clone();
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
        let max = if self.limit == 0 { count } else { self.limit };
        writeln!(output, "{}", self.header.title())?;

        loop {
            for (i, option) in self.list.options().iter().enumerate() {
                let mark = if self.selected.contains(&i) { "✓" } else { " " };
                writeln!(output, "{}. {mark} {}", i + 1, option.key)?;
            }
            let prompt = format!("Select up to {max} options. 0 to continue.");
            let choice = prompt_int(input, output, &prompt, 0, count)?;
            if choice == 0 {
                self.commit();
                match &self.error {
                    Some(err) => writeln!(output, "{err}")?,
                    None => return Ok(()),
                }
                continue;
            }
            if let Err(err) = self.toggle_select(choice - 1) {
                writeln!(output, "{err}")?;
            }
        }
    }
}
