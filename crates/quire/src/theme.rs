//! Styles and theme presets.
//!
//! A [`Style`] pairs an optional fixed string (selectors, prefixes, error
//! indicators) with a `crossterm` [`ContentStyle`] and an optional left
//! border. Colors are written as `"#RRGGBB"` hex strings or ANSI 256 numbers.

use crossterm::style::{Attribute, Color, ContentStyle};
use serde::{Deserialize, Serialize};

/// Parse a color from `"#RRGGBB"` or an ANSI 256 index such as `"243"`.
pub fn parse_color(s: &str) -> Option<Color> {
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some(Color::Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        });
    }
    s.parse::<u8>().ok().map(Color::AnsiValue)
}

/// A renderable text style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    value: String,
    content: ContentStyle,
    border_left: Option<String>,
}

impl Style {
    /// Creates an empty style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fixed string rendered by [`Style::string`].
    #[must_use]
    pub fn set_string(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the foreground color. Unparseable colors are ignored.
    #[must_use]
    pub fn foreground(mut self, color: &str) -> Self {
        if let Some(c) = parse_color(color) {
            self.content.foreground_color = Some(c);
        }
        self
    }

    /// Sets the background color. Unparseable colors are ignored.
    #[must_use]
    pub fn background(mut self, color: &str) -> Self {
        if let Some(c) = parse_color(color) {
            self.content.background_color = Some(c);
        }
        self
    }

    /// Renders text in bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.content.attributes.set(Attribute::Bold);
        self
    }

    /// Prefixes every rendered line with `border`.
    #[must_use]
    pub fn border_left(mut self, border: impl Into<String>) -> Self {
        self.border_left = Some(border.into());
        self
    }

    /// The fixed string set with [`Style::set_string`].
    pub fn value(&self) -> &str {
        &self.value
    }

    fn is_plain(&self) -> bool {
        self.content.foreground_color.is_none()
            && self.content.background_color.is_none()
            && self.content.attributes.is_empty()
    }

    fn paint(&self, text: &str) -> String {
        if self.is_plain() || text.is_empty() {
            return text.to_string();
        }
        self.content.apply(text).to_string()
    }

    /// Renders `text` with this style, line by line.
    ///
    /// With a left border only the border is colored; the text is assumed
    /// to carry its own styling.
    pub fn render(&self, text: &str) -> String {
        text.split('\n')
            .map(|line| match &self.border_left {
                Some(border) => format!("{}{line}", self.paint(border)),
                None => self.paint(line),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders the fixed string.
    pub fn string(&self) -> String {
        self.render(&self.value)
    }
}

/// Collection of styles for form components.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Styles for group titles and descriptions.
    pub group: GroupStyles,
    /// Separator between fields.
    pub field_separator: Style,
    /// Styles for blurred (unfocused) fields.
    pub blurred: FieldStyles,
    /// Styles for focused fields.
    pub focused: FieldStyles,
    /// Styles for the help line.
    pub help: HelpStyles,
}

impl Default for Theme {
    fn default() -> Self {
        theme_charm()
    }
}

/// Styles for groups.
#[derive(Debug, Clone, Default)]
pub struct GroupStyles {
    /// Title style.
    pub title: Style,
    /// Description style.
    pub description: Style,
}

/// Styles for the short help line.
#[derive(Debug, Clone, Default)]
pub struct HelpStyles {
    /// Key column.
    pub short_key: Style,
    /// Description column.
    pub short_desc: Style,
    /// Separator between entries.
    pub short_separator: Style,
    /// Marker shown when the line is truncated.
    pub ellipsis: Style,
}

/// Styles for input fields.
#[derive(Debug, Clone, Default)]
pub struct FieldStyles {
    /// Wraps the whole field (left border).
    pub base: Style,
    /// Title style.
    pub title: Style,
    /// Description style.
    pub description: Style,
    /// Error indicator appended to the title.
    pub error_indicator: Style,
    /// Error message style.
    pub error_message: Style,

    // Select styles
    /// Select cursor.
    pub select_selector: Style,
    /// Unfocused option row.
    pub option: Style,

    // Multi-select styles
    /// Multi-select cursor.
    pub multi_select_selector: Style,
    /// Selected option style.
    pub selected_option: Style,
    /// Selected prefix.
    pub selected_prefix: Style,
    /// Unselected option style.
    pub unselected_option: Style,
    /// Unselected prefix.
    pub unselected_prefix: Style,

    /// Text area styles.
    pub text_input: TextInputStyles,
}

/// Styles for text areas.
#[derive(Debug, Clone, Default)]
pub struct TextInputStyles {
    /// Cursor style.
    pub cursor: Style,
    /// Placeholder style.
    pub placeholder: Style,
    /// Prompt shown in filter lines.
    pub prompt: Style,
    /// Text style.
    pub text: Style,
}

/// Named theme presets, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreset {
    /// Uncolored.
    Base,
    /// Indigo and fuchsia.
    #[default]
    Charm,
    /// Dracula palette.
    Dracula,
    /// Terminal ANSI colors.
    Base16,
}

impl ThemePreset {
    /// Builds the theme for this preset.
    pub fn theme(self) -> Theme {
        match self {
            Self::Base => theme_base(),
            Self::Charm => theme_charm(),
            Self::Dracula => theme_dracula(),
            Self::Base16 => theme_base16(),
        }
    }
}

/// Returns the base theme: layout strings only, no colors.
#[allow(clippy::field_reassign_with_default)]
pub fn theme_base() -> Theme {
    let mut focused = FieldStyles::default();
    focused.base = Style::new().border_left("┃ ");
    focused.error_indicator = Style::new().set_string(" *");
    focused.error_message = Style::new().set_string(" *");
    focused.select_selector = Style::new().set_string("> ");
    focused.multi_select_selector = Style::new().set_string("> ");
    focused.selected_prefix = Style::new().set_string("[•] ");
    focused.unselected_prefix = Style::new().set_string("[ ] ");
    focused.text_input.prompt = Style::new().set_string("/");
    focused.text_input.placeholder = Style::new().foreground("8");

    let mut blurred = focused.clone();
    blurred.base = Style::new().border_left("  ");
    blurred.select_selector = Style::new().set_string("  ");
    blurred.multi_select_selector = Style::new().set_string("  ");

    Theme {
        group: GroupStyles::default(),
        field_separator: Style::new().set_string("\n\n"),
        focused,
        blurred,
        help: HelpStyles {
            short_key: Style::new(),
            short_desc: Style::new(),
            short_separator: Style::new().set_string(" • "),
            ellipsis: Style::new().set_string("…"),
        },
    }
}

/// Returns the Charm theme (default).
pub fn theme_charm() -> Theme {
    let mut t = theme_base();

    let indigo = "#7571F9";
    let fuchsia = "#F780E2";
    let green = "#02BF87";
    let red = "#ED567A";
    let normal_fg = "252";

    t.focused.base = t.focused.base.foreground("238");
    t.focused.title = t.focused.title.foreground(indigo).bold();
    t.focused.description = t.focused.description.foreground("243");
    t.focused.error_indicator = t.focused.error_indicator.foreground(red);
    t.focused.error_message = t.focused.error_message.foreground(red);
    t.focused.select_selector = t.focused.select_selector.foreground(fuchsia);
    t.focused.option = t.focused.option.foreground(normal_fg);
    t.focused.multi_select_selector = t.focused.multi_select_selector.foreground(fuchsia);
    t.focused.selected_option = t.focused.selected_option.foreground(green);
    t.focused.selected_prefix = Style::new().foreground("#02A877").set_string("✓ ");
    t.focused.unselected_prefix = Style::new().foreground("243").set_string("• ");
    t.focused.unselected_option = t.focused.unselected_option.foreground(normal_fg);
    t.focused.text_input.cursor = t.focused.text_input.cursor.foreground(green);
    t.focused.text_input.placeholder = t.focused.text_input.placeholder.foreground("238");
    t.focused.text_input.prompt = t.focused.text_input.prompt.foreground(fuchsia);

    t.blurred = t.focused.clone();
    t.blurred.base = Style::new().border_left("  ");
    t.blurred.select_selector = Style::new().set_string("  ");
    t.blurred.multi_select_selector = Style::new().set_string("  ");

    t.group.title = t.focused.title.clone();
    t.group.description = t.focused.description.clone();
    t.help.short_key = t.help.short_key.foreground("246");
    t.help.short_desc = t.help.short_desc.foreground("240");
    t.help.short_separator = t.help.short_separator.foreground("238");

    t
}

/// Returns the Dracula theme.
pub fn theme_dracula() -> Theme {
    let mut t = theme_base();

    let selection = "#44475a";
    let foreground = "#f8f8f2";
    let comment = "#6272a4";
    let green = "#50fa7b";
    let purple = "#bd93f9";
    let red = "#ff5555";
    let yellow = "#f1fa8c";

    t.focused.base = t.focused.base.foreground(selection);
    t.focused.title = t.focused.title.foreground(purple);
    t.focused.description = t.focused.description.foreground(comment);
    t.focused.error_indicator = t.focused.error_indicator.foreground(red);
    t.focused.error_message = t.focused.error_message.foreground(red);
    t.focused.select_selector = t.focused.select_selector.foreground(yellow);
    t.focused.option = t.focused.option.foreground(foreground);
    t.focused.multi_select_selector = t.focused.multi_select_selector.foreground(yellow);
    t.focused.selected_option = t.focused.selected_option.foreground(green);
    t.focused.selected_prefix = t.focused.selected_prefix.foreground(green);
    t.focused.unselected_option = t.focused.unselected_option.foreground(foreground);
    t.focused.unselected_prefix = t.focused.unselected_prefix.foreground(comment);
    t.focused.text_input.cursor = t.focused.text_input.cursor.foreground(yellow);
    t.focused.text_input.placeholder = t.focused.text_input.placeholder.foreground(comment);
    t.focused.text_input.prompt = t.focused.text_input.prompt.foreground(yellow);

    t.blurred = t.focused.clone();
    t.blurred.base = Style::new().border_left("  ");
    t.blurred.select_selector = Style::new().set_string("  ");
    t.blurred.multi_select_selector = Style::new().set_string("  ");

    t.group.title = t.focused.title.clone();
    t.group.description = t.focused.description.clone();
    t.help.short_key = t.help.short_key.foreground(comment);
    t.help.short_desc = t.help.short_desc.foreground(selection);

    t
}

/// Returns the Base16 theme.
pub fn theme_base16() -> Theme {
    let mut t = theme_base();

    t.focused.base = t.focused.base.foreground("8");
    t.focused.title = t.focused.title.foreground("6");
    t.focused.description = t.focused.description.foreground("8");
    t.focused.error_indicator = t.focused.error_indicator.foreground("9");
    t.focused.error_message = t.focused.error_message.foreground("9");
    t.focused.select_selector = t.focused.select_selector.foreground("3");
    t.focused.option = t.focused.option.foreground("7");
    t.focused.multi_select_selector = t.focused.multi_select_selector.foreground("3");
    t.focused.selected_option = t.focused.selected_option.foreground("2");
    t.focused.selected_prefix = t.focused.selected_prefix.foreground("2");
    t.focused.unselected_option = t.focused.unselected_option.foreground("7");

    t.blurred = t.focused.clone();
    t.blurred.base = Style::new().border_left("  ");
    t.blurred.title = t.blurred.title.foreground("8");
    t.blurred.text_input.text = t.blurred.text_input.text.foreground("7");
    t.blurred.select_selector = Style::new().set_string("  ");
    t.blurred.multi_select_selector = Style::new().set_string("  ");

    t.group.title = t.focused.title.clone();
    t.group.description = t.focused.description.clone();

    t
}
