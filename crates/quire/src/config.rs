//! Form-wide configuration.
//!
//! [`FormConfig`] gathers the settings a form threads down to its groups and
//! fields at construction time. It can be built in code, deserialized from
//! TOML, or adjusted from the environment.
//!
//! # Examples
//!
//! ```rust
//! use quire::{FormConfig, Layout};
//!
//! let config = FormConfig::from_toml_str(r#"
//!     width = 60
//!     height = 12
//!     layout = "stack"
//!     theme = "dracula"
//! "#).unwrap();
//!
//! assert_eq!(config.width, 60);
//! assert_eq!(config.layout, Layout::Stack);
//! assert!(config.show_help);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::theme::ThemePreset;

/// Environment variable that turns on accessible mode when non-empty.
pub const ACCESSIBLE_ENV: &str = "ACCESSIBLE";

/// How a form arranges its groups on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Only the active group is shown.
    #[default]
    Default,
    /// Every visible group is shown, top to bottom.
    Stack,
}

/// Settings shared by a form and everything inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FormConfig {
    /// Width in columns given to every field.
    pub width: usize,

    /// Height in rows of each group's viewport. 0 shows everything.
    pub height: usize,

    /// Whether the focused field's help line is shown.
    pub show_help: bool,

    /// Whether the group's error list is shown.
    pub show_errors: bool,

    /// Whether the form should be run through the line-based prompt.
    pub accessible: bool,

    /// Group arrangement.
    pub layout: Layout,

    /// Theme preset.
    pub theme: ThemePreset,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 0,
            show_help: true,
            show_errors: true,
            accessible: false,
            layout: Layout::Default,
            theme: ThemePreset::default(),
        }
    }
}

impl FormConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Turn on accessible mode if [`ACCESSIBLE_ENV`] is set to a non-empty value.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if std::env::var(ACCESSIBLE_ENV).is_ok_and(|v| !v.is_empty()) {
            self.accessible = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;

    #[test]
    fn test_defaults() {
        let config = FormConfig::default();
        assert_eq!(config.width, 80);
        assert_eq!(config.height, 0);
        assert!(config.show_help);
        assert!(config.show_errors);
        assert!(!config.accessible);
        assert_eq!(config.layout, Layout::Default);
        assert_eq!(config.theme, ThemePreset::Charm);
    }

    #[test]
    fn test_partial_toml() {
        let config = FormConfig::from_toml_str("show_help = false\ntheme = \"base16\"").unwrap();
        assert!(!config.show_help);
        assert_eq!(config.theme, ThemePreset::Base16);
        assert_eq!(config.width, 80);
    }

    #[test]
    fn test_invalid_toml() {
        let err = FormConfig::from_toml_str("layout = \"grid\"").unwrap_err();
        assert!(matches!(err, FormError::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = FormConfig {
            height: 10,
            layout: Layout::Stack,
            ..FormConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(FormConfig::from_toml_str(&text).unwrap(), config);
    }
}
