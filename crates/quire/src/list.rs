//! Filtering, cursor and scrolling over a list of options.
//!
//! [`OptionList`] is shared by [`Select`](crate::Select) and
//! [`MultiSelect`](crate::MultiSelect). It keeps the full option sequence,
//! the filtered subsequence as indices into it, a cursor into the filtered
//! subsequence, and a [`Viewport`] over the filtered rows.
//!
//! Invariants:
//! - the filtered subsequence preserves the order of the full sequence;
//! - `cursor < filtered.len()` whenever the filtered subsequence is non-empty;
//! - after every cursor move, the cursor row is inside the viewport.

use tracing::trace;

use crate::option::SelectOption;
use crate::viewport::Viewport;

/// A cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorMove {
    /// First row.
    Top,
    /// Last row.
    Bottom,
    /// One row up.
    Up,
    /// One row down.
    Down,
    /// Half a viewport up.
    HalfPageUp,
    /// Half a viewport down.
    HalfPageDown,
}

/// Whether `key` matches `filter`: case-insensitive substring search.
///
/// No diacritic folding: `"e"` does not match `"é"`.
pub fn filter_matches(key: &str, filter: &str) -> bool {
    key.to_lowercase().contains(&filter.to_lowercase())
}

/// Options plus the filter/cursor/viewport state over them.
#[derive(Debug, Clone)]
pub struct OptionList<T: Clone + PartialEq> {
    options: Vec<SelectOption<T>>,
    filtered: Vec<usize>,
    cursor: usize,
    filter: String,
    filtering: bool,
    viewport: Viewport,
}

impl<T: Clone + PartialEq> Default for OptionList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> OptionList<T> {
    /// An empty list with an unbounded viewport.
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            filtered: Vec::new(),
            cursor: 0,
            filter: String::new(),
            filtering: false,
            viewport: Viewport::new(0),
        }
    }

    /// Replaces the options, clearing the filter and resetting the cursor.
    pub fn set_options(&mut self, options: Vec<SelectOption<T>>) {
        self.options = options;
        self.filter.clear();
        self.filtering = false;
        self.filtered = (0..self.options.len()).collect();
        self.cursor = 0;
        self.viewport.set_total(self.filtered.len());
        self.viewport.goto_top();
    }

    /// The full option sequence.
    pub fn options(&self) -> &[SelectOption<T>] {
        &self.options
    }

    /// Indices into [`options`](Self::options) that pass the filter, in order.
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    /// The options that pass the filter, in order.
    pub fn filtered_options(&self) -> impl Iterator<Item = &SelectOption<T>> {
        self.filtered.iter().map(|&i| &self.options[i])
    }

    /// Number of options passing the filter.
    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    /// Whether no option passes the filter.
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// Cursor position within the filtered subsequence.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index into the full sequence of the option under the cursor.
    pub fn current(&self) -> Option<usize> {
        self.filtered.get(self.cursor).copied()
    }

    /// Moves the cursor to a filtered row, clamped, and scrolls to it.
    pub fn set_cursor(&mut self, row: usize) {
        if self.filtered.is_empty() {
            return;
        }
        self.cursor = row.min(self.filtered.len() - 1);
        self.viewport.ensure_visible(self.cursor, self.cursor + 1);
    }

    /// Moves the cursor to the filtered row holding full index `index`.
    pub fn set_cursor_to_option(&mut self, index: usize) {
        if let Some(row) = self.filtered.iter().position(|&i| i == index) {
            self.set_cursor(row);
        }
    }

    /// Moves the cursor, scrolling by the smallest amount that keeps it
    /// visible. Top and bottom snap the viewport to the matching end.
    pub fn move_cursor(&mut self, movement: CursorMove) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let page = match self.viewport.height() {
            0 => len,
            h => h,
        };
        let half = (page / 2).max(1);
        match movement {
            CursorMove::Top => {
                self.cursor = 0;
                self.viewport.goto_top();
            }
            CursorMove::Bottom => {
                self.cursor = len - 1;
                self.viewport.goto_bottom();
            }
            CursorMove::Up => self.cursor = self.cursor.saturating_sub(1),
            CursorMove::Down => self.cursor = (self.cursor + 1).min(len - 1),
            CursorMove::HalfPageUp => self.cursor = self.cursor.saturating_sub(half),
            CursorMove::HalfPageDown => self.cursor = (self.cursor + half).min(len - 1),
        }
        self.viewport.ensure_visible(self.cursor, self.cursor + 1);
    }

    /// Rows shown at once, 0 when unbounded.
    pub fn height(&self) -> usize {
        self.viewport.height()
    }

    /// Changes how many rows are shown.
    pub fn set_height(&mut self, height: usize) {
        self.viewport.set_height(height);
        self.viewport.ensure_visible(self.cursor, self.cursor + 1);
    }

    /// Offset of the first visible row.
    pub fn offset(&self) -> usize {
        self.viewport.y_offset()
    }

    /// Filtered rows inside the viewport.
    pub fn visible_rows(&self) -> std::ops::Range<usize> {
        let len = self.filtered.len();
        match self.viewport.height() {
            0 => 0..len,
            h => {
                let start = self.viewport.y_offset().min(len);
                start..(start + h).min(len)
            }
        }
    }

    /// Whether filter text entry is active.
    pub fn filtering(&self) -> bool {
        self.filtering
    }

    /// The current filter text.
    pub fn filter_value(&self) -> &str {
        &self.filter
    }

    /// Enters or leaves filter entry.
    ///
    /// Leaving with a filter that matches nothing clears the filter, so the
    /// user is never left looking at an empty list.
    pub fn set_filtering(&mut self, filtering: bool) {
        self.filtering = filtering;
        if !filtering && self.filtered.is_empty() && !self.filter.is_empty() {
            self.clear_filter();
        }
    }

    /// Replaces the filter text and recomputes the filtered subsequence.
    pub fn set_filter_value(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.recompute();
    }

    /// Appends text to the filter.
    pub fn push_filter(&mut self, s: &str) {
        self.filter.push_str(s);
        self.recompute();
    }

    /// Removes the last character of the filter.
    pub fn pop_filter(&mut self) {
        if self.filter.pop().is_some() {
            self.recompute();
        }
    }

    /// Clears the filter, restoring the full sequence in its original order.
    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        let current = self.current();
        self.filtered = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, opt)| filter_matches(&opt.key, &self.filter))
            .map(|(i, _)| i)
            .collect();
        trace!(filter = %self.filter, matches = self.filtered.len(), "filter recomputed");

        self.viewport.set_total(self.filtered.len());
        if self.filtered.is_empty() {
            return;
        }
        // Stay on the same option when it survived the filter.
        let row = current
            .and_then(|c| self.filtered.iter().position(|&i| i == c))
            .unwrap_or(self.cursor);
        self.set_cursor(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::new_options;

    fn fruit() -> OptionList<String> {
        let mut list = OptionList::new();
        list.set_options(new_options(["Apple", "Banana", "Cherry"]));
        list
    }

    fn keys(list: &OptionList<String>) -> Vec<&str> {
        list.filtered_options().map(|o| o.key.as_str()).collect()
    }

    #[test]
    fn test_filter_an_yields_banana() {
        let mut list = fruit();
        list.set_filter_value("an");
        assert_eq!(keys(&list), vec!["Banana"]);
        list.clear_filter();
        assert_eq!(keys(&list), vec!["Apple", "Banana", "Cherry"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_without_folding() {
        assert!(filter_matches("Banana", "BAN"));
        assert!(!filter_matches("Crème", "creme"));
    }

    #[test]
    fn test_empty_filter_result_keeps_cursor() {
        let mut list = fruit();
        list.set_cursor(2);
        list.set_filter_value("zzz");
        assert!(list.is_empty());
        assert_eq!(list.cursor(), 2);
        assert_eq!(list.current(), None);
        list.move_cursor(CursorMove::Down);
        assert_eq!(list.cursor(), 2);
    }

    #[test]
    fn test_cursor_clamped_after_filter() {
        let mut list = fruit();
        list.set_cursor(2);
        list.set_filter_value("a");
        // Apple, Banana match; Cherry (the cursor) does not.
        assert_eq!(list.len(), 2);
        assert_eq!(list.cursor(), 1);
    }

    #[test]
    fn test_cursor_follows_surviving_option() {
        let mut list = fruit();
        list.set_cursor(1);
        list.set_filter_value("an");
        assert_eq!(list.current(), Some(1));
        list.clear_filter();
        assert_eq!(list.current(), Some(1));
    }

    #[test]
    fn test_leaving_filter_with_no_matches_restores() {
        let mut list = fruit();
        list.set_filtering(true);
        list.push_filter("q");
        assert!(list.is_empty());
        list.set_filtering(false);
        assert_eq!(list.len(), 3);
        assert_eq!(list.filter_value(), "");
    }

    #[test]
    fn test_leaving_filter_keeps_matches() {
        let mut list = fruit();
        list.set_filtering(true);
        list.push_filter("err");
        list.set_filtering(false);
        assert_eq!(keys(&list), vec!["Cherry"]);
        list.pop_filter();
        list.pop_filter();
        list.pop_filter();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_moves_and_scrolling() {
        let mut list = OptionList::new();
        list.set_options(new_options((0..10).map(|i| i.to_string())));
        list.set_height(3);

        list.move_cursor(CursorMove::Down);
        list.move_cursor(CursorMove::Down);
        assert_eq!(list.offset(), 0);
        list.move_cursor(CursorMove::Down);
        assert_eq!(list.cursor(), 3);
        assert_eq!(list.offset(), 1);

        list.move_cursor(CursorMove::Bottom);
        assert_eq!(list.cursor(), 9);
        assert_eq!(list.offset(), 7);
        assert_eq!(list.visible_rows(), 7..10);

        list.move_cursor(CursorMove::HalfPageUp);
        assert_eq!(list.cursor(), 8);
        assert_eq!(list.offset(), 7);

        list.move_cursor(CursorMove::Top);
        assert_eq!(list.cursor(), 0);
        assert_eq!(list.offset(), 0);

        list.move_cursor(CursorMove::HalfPageDown);
        assert_eq!(list.cursor(), 1);
        list.move_cursor(CursorMove::Up);
        list.move_cursor(CursorMove::Up);
        assert_eq!(list.cursor(), 0);
    }
}
