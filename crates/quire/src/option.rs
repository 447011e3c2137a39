//! Options offered by select and multi-select fields.

/// An option for select fields.
///
/// Keys are what the user sees and filters on. They need not be unique:
/// fields track options by position, never by key or value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption<T: Clone + PartialEq> {
    /// The display key shown to the user.
    pub key: String,
    /// The underlying value.
    pub value: T,
    /// Whether this option is initially selected.
    pub selected: bool,
}

impl<T: Clone + PartialEq> SelectOption<T> {
    /// Creates a new option.
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
            selected: false,
        }
    }

    /// Sets whether the option is initially selected.
    #[must_use]
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl<T: Clone + PartialEq + std::fmt::Display> SelectOption<T> {
    /// Creates options from a list of values using Display for keys.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Vec<Self> {
        values
            .into_iter()
            .map(|v| Self::new(v.to_string(), v))
            .collect()
    }
}

/// Creates options from string values.
pub fn new_options<S: Into<String>>(
    values: impl IntoIterator<Item = S>,
) -> Vec<SelectOption<String>> {
    values
        .into_iter()
        .map(|v| {
            let s: String = v.into();
            SelectOption::new(s.clone(), s)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_options_keys_match_values() {
        let opts = new_options(["Apple", "Banana"]);
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[1].key, "Banana");
        assert_eq!(opts[1].value, "Banana");
        assert!(!opts[0].selected);
    }

    #[test]
    fn test_from_values_uses_display() {
        let opts = SelectOption::from_values([1, 2, 3]);
        assert_eq!(opts[2].key, "3");
        assert_eq!(opts[2].value, 3);
    }

    #[test]
    fn test_selected_builder() {
        let opt = SelectOption::new("A", 'a').selected(true);
        assert!(opt.selected);
    }
}
