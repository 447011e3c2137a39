//! The title and description shown above every field.

use std::hash::Hash;

use crate::eval::{Eval, EvalDoneMsg, EvalSlot};
use crate::runtime::{Cmd, batch};

/// A field's title and description, each fixed or computed from bindings.
#[derive(Default)]
pub struct Header {
    title: Eval<String>,
    description: Eval<String>,
}

impl Header {
    /// Sets a fixed title.
    pub fn set_title(&mut self, title: String) {
        self.title.set_value(title);
    }

    /// Computes the title from `bindings` whenever they change.
    pub fn set_title_func<F, B>(&mut self, f: F, bindings: B)
    where
        F: Fn() -> String + Send + Sync + 'static,
        B: Hash + Send + Sync + 'static,
    {
        self.title.set_func(move || Ok(f()), bindings);
    }

    /// Sets a fixed description.
    pub fn set_description(&mut self, description: String) {
        self.description.set_value(description);
    }

    /// Computes the description from `bindings` whenever they change.
    pub fn set_description_func<F, B>(&mut self, f: F, bindings: B)
    where
        F: Fn() -> String + Send + Sync + 'static,
        B: Hash + Send + Sync + 'static,
    {
        self.description.set_func(move || Ok(f()), bindings);
    }

    /// The current title.
    pub fn title(&self) -> &str {
        self.title.value()
    }

    /// The current description.
    pub fn description(&self) -> &str {
        self.description.value()
    }

    /// Whether the title occupies a row of its own accord.
    pub fn has_title(&self) -> bool {
        !self.title.value().is_empty() || self.title.is_deferred()
    }

    /// Whether the description occupies a row.
    pub fn has_description(&self) -> bool {
        !self.description.value().is_empty() || self.description.is_deferred()
    }

    /// Rows drawn above the field body. `title_row` forces the title row for
    /// fields that reuse it for a filter prompt, an error marker or a notice.
    pub fn rows(&self, title_row: bool) -> usize {
        usize::from(title_row || self.has_title()) + usize::from(self.has_description())
    }

    /// Re-checks both bindings, returning the computations to dispatch.
    pub fn refresh(&mut self, id: usize) -> Option<Cmd> {
        let title = self.title.refresh(id, EvalSlot::Title).into_cmd();
        let description = self.description.refresh(id, EvalSlot::Description).into_cmd();
        batch(vec![title, description])
    }

    /// Applies a result addressed to field `id`. Returns whether it was used.
    pub fn deliver(&mut self, id: usize, done: &EvalDoneMsg<String>) -> bool {
        if done.id != id {
            return false;
        }
        match done.slot {
            EvalSlot::Title => self.title.deliver(done.hash, done.result.clone()),
            EvalSlot::Description => self.description.deliver(done.hash, done.result.clone()),
            EvalSlot::Options => false,
        }
    }
}

/// Body rows left in a field `height` rows tall once `header` rows are
/// drawn. A height of 0 stays unbounded; a bounded body keeps one row.
pub fn body_rows(height: usize, header: usize) -> usize {
    match height {
        0 => 0,
        h => h.saturating_sub(header).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::Bound;

    #[test]
    fn test_rows_count_forced_title() {
        let mut header = Header::default();
        assert_eq!(header.rows(false), 0);
        assert_eq!(header.rows(true), 1);

        header.set_description("More".into());
        assert_eq!(header.rows(false), 1);
        assert_eq!(header.rows(true), 2);

        header.set_title("Pick".into());
        assert_eq!(header.rows(false), 2);
        assert_eq!(header.rows(true), 2);
    }

    #[test]
    fn test_deferred_title_counts_before_first_result() {
        let name = Bound::new("Ada".to_string());
        let n = name.clone();
        let mut header = Header::default();
        header.set_title_func(move || format!("Hello {}", n.get()), name);
        assert!(header.has_title());
        assert_eq!(header.title(), "");

        let msg = header
            .refresh(7)
            .and_then(Cmd::execute)
            .and_then(|m| m.downcast::<EvalDoneMsg<String>>())
            .unwrap();
        assert!(!header.deliver(8, &msg));
        assert!(header.deliver(7, &msg));
        assert_eq!(header.title(), "Hello Ada");
    }

    #[test]
    fn test_body_rows() {
        assert_eq!(body_rows(0, 2), 0);
        assert_eq!(body_rows(6, 2), 4);
        assert_eq!(body_rows(2, 2), 1);
    }
}
