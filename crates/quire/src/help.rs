//! The one-line key help shown under a group.

use unicode_width::UnicodeWidthStr;

use crate::key::Binding;
use crate::theme::HelpStyles;

/// Renders enabled bindings as `key desc • key desc`, truncated to a width.
#[derive(Debug, Clone, Default)]
pub struct Help {
    /// Maximum width in columns, 0 for unlimited.
    pub width: usize,
    /// Styles for keys, descriptions and separators.
    pub styles: HelpStyles,
}

impl Help {
    /// Creates a help renderer with the given styles.
    pub fn new(styles: HelpStyles) -> Self {
        Self { width: 0, styles }
    }

    /// Renders the short help line for `bindings`. Disabled bindings and
    /// bindings without help text are skipped.
    pub fn short_help_view(&self, bindings: &[&Binding]) -> String {
        let separator = self.styles.short_separator.value();
        let ellipsis = self.styles.ellipsis.value();

        let mut result = String::new();
        let mut total_width = 0;

        for binding in bindings {
            if !binding.enabled() {
                continue;
            }
            let help = binding.get_help();
            if help.key.is_empty() && help.desc.is_empty() {
                continue;
            }

            let (sep, sep_width) = if total_width > 0 {
                (self.styles.short_separator.string(), separator.width())
            } else {
                (String::new(), 0)
            };
            let item_width = sep_width + help.key.width() + 1 + help.desc.width();

            if self.width > 0 && total_width + item_width > self.width {
                if total_width + 1 + ellipsis.width() < self.width {
                    result.push(' ');
                    result.push_str(&self.styles.ellipsis.string());
                }
                break;
            }

            total_width += item_width;
            result.push_str(&sep);
            result.push_str(&self.styles.short_key.render(&help.key));
            result.push(' ');
            result.push_str(&self.styles.short_desc.render(&help.desc));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::theme_base;

    fn bindings() -> Vec<Binding> {
        vec![
            Binding::new().keys(&["x"]).help("x", "toggle"),
            Binding::new().keys(&["/"]).help("/", "filter").disabled(),
            Binding::new().keys(&["enter"]).help("enter", "confirm"),
        ]
    }

    #[test]
    fn test_short_help_skips_disabled() {
        let help = Help::new(theme_base().help);
        let b = bindings();
        let refs: Vec<&Binding> = b.iter().collect();
        assert_eq!(help.short_help_view(&refs), "x toggle • enter confirm");
    }

    #[test]
    fn test_short_help_truncates() {
        let mut help = Help::new(theme_base().help);
        help.width = 12;
        let b = bindings();
        let refs: Vec<&Binding> = b.iter().collect();
        assert_eq!(help.short_help_view(&refs), "x toggle …");
    }
}
