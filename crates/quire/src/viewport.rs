//! A vertical window over rendered lines.
//!
//! The viewport tracks only its height, the offset of its top row and how
//! many rows its content has. Content is rendered fresh on every view and
//! windowed with [`Viewport::window`].

/// A vertical scroll window. A height of 0 means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    height: usize,
    y_offset: usize,
    total: usize,
}

impl Viewport {
    /// Creates a viewport showing `height` rows.
    #[must_use]
    pub fn new(height: usize) -> Self {
        Self {
            height,
            y_offset: 0,
            total: 0,
        }
    }

    /// Rows shown at once, 0 when unbounded.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Changes the number of rows shown.
    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.set_y_offset(self.y_offset);
    }

    /// Records the content so offsets can be clamped against it.
    pub fn set_content(&mut self, content: &str) {
        self.set_total(line_count(content));
    }

    /// Records the number of content rows.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.set_y_offset(self.y_offset);
    }

    /// Number of content rows.
    pub fn total_line_count(&self) -> usize {
        self.total
    }

    /// Returns the vertical scroll offset.
    pub fn y_offset(&self) -> usize {
        self.y_offset
    }

    /// Sets the vertical scroll offset, clamped so the window stays filled.
    pub fn set_y_offset(&mut self, n: usize) {
        self.y_offset = n.min(self.max_y_offset());
    }

    fn max_y_offset(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        self.total.saturating_sub(self.height)
    }

    /// Goes to the top.
    pub fn goto_top(&mut self) {
        self.y_offset = 0;
    }

    /// Goes to the bottom.
    pub fn goto_bottom(&mut self) {
        self.y_offset = self.max_y_offset();
    }

    /// Whether content row `row` is inside the window.
    pub fn is_visible(&self, row: usize) -> bool {
        self.height == 0 || (self.y_offset <= row && row < self.y_offset + self.height)
    }

    /// Scrolls by the smallest amount that shows rows `[start, end)`.
    ///
    /// A block taller than the window is shown from its top.
    pub fn ensure_visible(&mut self, start: usize, end: usize) {
        if self.height == 0 {
            return;
        }
        let end = end.max(start + 1);
        if start < self.y_offset {
            self.y_offset = start;
        } else if end > self.y_offset + self.height {
            self.y_offset = (end - self.height).min(start);
        }
        self.set_y_offset(self.y_offset);
    }

    /// Renders the rows of `content` inside the window, padded to the height.
    pub fn window(&self, content: &str) -> String {
        if self.height == 0 {
            return content.to_string();
        }
        let lines: Vec<&str> = content.split('\n').collect();
        let max = lines.len().saturating_sub(self.height);
        let top = self.y_offset.min(max);
        let mut visible: Vec<&str> = lines.iter().skip(top).take(self.height).copied().collect();
        while visible.len() < self.height {
            visible.push("");
        }
        visible.join("\n")
    }
}

/// Number of rows `s` occupies.
pub fn line_count(s: &str) -> usize {
    s.split('\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_shows_everything() {
        let mut v = Viewport::new(0);
        v.set_content("a\nb\nc");
        v.ensure_visible(2, 3);
        assert_eq!(v.y_offset(), 0);
        assert_eq!(v.window("a\nb\nc"), "a\nb\nc");
        assert!(v.is_visible(100));
    }

    #[test]
    fn test_offset_is_clamped() {
        let mut v = Viewport::new(2);
        v.set_total(5);
        v.set_y_offset(10);
        assert_eq!(v.y_offset(), 3);
        v.set_total(2);
        assert_eq!(v.y_offset(), 0);
    }

    #[test]
    fn test_ensure_visible_scrolls_minimally() {
        let mut v = Viewport::new(3);
        v.set_total(10);
        v.ensure_visible(4, 5);
        assert_eq!(v.y_offset(), 2);
        v.ensure_visible(3, 4);
        assert_eq!(v.y_offset(), 2);
        v.ensure_visible(0, 1);
        assert_eq!(v.y_offset(), 0);
    }

    #[test]
    fn test_tall_block_shows_its_top() {
        let mut v = Viewport::new(2);
        v.set_total(10);
        v.ensure_visible(3, 8);
        assert_eq!(v.y_offset(), 3);
    }

    #[test]
    fn test_window_pads() {
        let mut v = Viewport::new(3);
        v.set_content("a");
        assert_eq!(v.window("a"), "a\n\n");
        v.set_content("a\nb\nc\nd");
        v.goto_bottom();
        assert_eq!(v.window("a\nb\nc\nd"), "b\nc\nd");
    }
}
