//! Default key bindings for every field type.
//!
//! A [`KeyMap`] is handed from the form to each group and from each group to
//! its fields when they are built. Fields copy the part that concerns them
//! and toggle individual bindings as their state changes (filtering, first
//! or last position), so help output only ever lists keys that do something.

use crate::key::Binding;

/// Keybindings for form navigation.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Quit the form.
    pub quit: Binding,
    /// Select field keybindings.
    pub select: SelectKeyMap,
    /// Multi-select field keybindings.
    pub multi_select: MultiSelectKeyMap,
    /// Text area keybindings.
    pub text: TextKeyMap,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMap {
    /// Creates a new default keymap.
    pub fn new() -> Self {
        Self {
            quit: Binding::new().keys(&["ctrl+c"]),
            select: SelectKeyMap::default(),
            multi_select: MultiSelectKeyMap::default(),
            text: TextKeyMap::default(),
        }
    }
}

/// Keybindings for select fields.
#[derive(Debug, Clone)]
pub struct SelectKeyMap {
    /// Go to next field.
    pub next: Binding,
    /// Go to previous field.
    pub prev: Binding,
    /// Move cursor up.
    pub up: Binding,
    /// Move cursor down.
    pub down: Binding,
    /// Open filter.
    pub filter: Binding,
    /// Apply filter.
    pub set_filter: Binding,
    /// Clear filter.
    pub clear_filter: Binding,
    /// Half page up.
    pub half_page_up: Binding,
    /// Half page down.
    pub half_page_down: Binding,
    /// Go to top.
    pub goto_top: Binding,
    /// Go to bottom.
    pub goto_bottom: Binding,
    /// Submit the form.
    pub submit: Binding,
}

impl Default for SelectKeyMap {
    fn default() -> Self {
        Self {
            prev: Binding::new()
                .keys(&["shift+tab"])
                .help("shift+tab", "back"),
            next: Binding::new()
                .keys(&["enter", "tab"])
                .help("enter", "select"),
            submit: Binding::new().keys(&["enter"]).help("enter", "submit"),
            up: Binding::new()
                .keys(&["up", "k", "ctrl+k", "ctrl+p"])
                .help("↑", "up"),
            down: Binding::new()
                .keys(&["down", "j", "ctrl+j", "ctrl+n"])
                .help("↓", "down"),
            filter: Binding::new().keys(&["/"]).help("/", "filter"),
            set_filter: Binding::new()
                .keys(&["enter", "esc"])
                .help("esc", "set filter")
                .disabled(),
            clear_filter: Binding::new()
                .keys(&["esc"])
                .help("esc", "clear filter")
                .disabled(),
            half_page_up: Binding::new().keys(&["ctrl+u"]).help("ctrl+u", "½ page up"),
            half_page_down: Binding::new()
                .keys(&["ctrl+d"])
                .help("ctrl+d", "½ page down"),
            goto_top: Binding::new()
                .keys(&["home", "g"])
                .help("g/home", "go to start"),
            goto_bottom: Binding::new()
                .keys(&["end", "G"])
                .help("G/end", "go to end"),
        }
    }
}

/// Keybindings for multi-select fields.
#[derive(Debug, Clone)]
pub struct MultiSelectKeyMap {
    /// Go to next field.
    pub next: Binding,
    /// Go to previous field.
    pub prev: Binding,
    /// Move cursor up.
    pub up: Binding,
    /// Move cursor down.
    pub down: Binding,
    /// Toggle selection.
    pub toggle: Binding,
    /// Open filter.
    pub filter: Binding,
    /// Apply filter.
    pub set_filter: Binding,
    /// Clear filter.
    pub clear_filter: Binding,
    /// Half page up.
    pub half_page_up: Binding,
    /// Half page down.
    pub half_page_down: Binding,
    /// Go to top.
    pub goto_top: Binding,
    /// Go to bottom.
    pub goto_bottom: Binding,
    /// Select all.
    pub select_all: Binding,
    /// Select none.
    pub select_none: Binding,
    /// Submit the form.
    pub submit: Binding,
}

impl Default for MultiSelectKeyMap {
    fn default() -> Self {
        Self {
            prev: Binding::new()
                .keys(&["shift+tab"])
                .help("shift+tab", "back"),
            next: Binding::new()
                .keys(&["enter", "tab"])
                .help("enter", "confirm"),
            submit: Binding::new().keys(&["enter"]).help("enter", "submit"),
            toggle: Binding::new().keys(&[" ", "x"]).help("x", "toggle"),
            up: Binding::new().keys(&["up", "k", "ctrl+p"]).help("↑", "up"),
            down: Binding::new()
                .keys(&["down", "j", "ctrl+n"])
                .help("↓", "down"),
            filter: Binding::new().keys(&["/"]).help("/", "filter"),
            set_filter: Binding::new()
                .keys(&["enter", "esc"])
                .help("esc", "set filter")
                .disabled(),
            clear_filter: Binding::new()
                .keys(&["esc"])
                .help("esc", "clear filter")
                .disabled(),
            half_page_up: Binding::new().keys(&["ctrl+u"]).help("ctrl+u", "½ page up"),
            half_page_down: Binding::new()
                .keys(&["ctrl+d"])
                .help("ctrl+d", "½ page down"),
            goto_top: Binding::new()
                .keys(&["home", "g"])
                .help("g/home", "go to start"),
            goto_bottom: Binding::new()
                .keys(&["end", "G"])
                .help("G/end", "go to end"),
            select_all: Binding::new()
                .keys(&["ctrl+a"])
                .help("ctrl+a", "select all"),
            select_none: Binding::new()
                .keys(&["ctrl+a"])
                .help("ctrl+a", "select none")
                .disabled(),
        }
    }
}

/// Keybindings for text area fields.
#[derive(Debug, Clone)]
pub struct TextKeyMap {
    /// Go to next field.
    pub next: Binding,
    /// Go to previous field.
    pub prev: Binding,
    /// Insert a new line.
    pub new_line: Binding,
    /// Submit the form.
    pub submit: Binding,
}

impl Default for TextKeyMap {
    fn default() -> Self {
        Self {
            prev: Binding::new()
                .keys(&["shift+tab"])
                .help("shift+tab", "back"),
            next: Binding::new().keys(&["tab", "enter"]).help("enter", "next"),
            submit: Binding::new().keys(&["enter"]).help("enter", "submit"),
            new_line: Binding::new()
                .keys(&["alt+enter", "ctrl+j"])
                .help("alt+enter / ctrl+j", "new line"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyMsg, KeyType, matches_one};

    #[test]
    fn test_filter_bindings_start_disabled() {
        let km = MultiSelectKeyMap::default();
        assert!(km.filter.enabled());
        assert!(!km.set_filter.enabled());
        assert!(!km.clear_filter.enabled());
        assert!(!km.select_none.enabled());
    }

    #[test]
    fn test_toggle_matches_space_and_x() {
        let km = MultiSelectKeyMap::default();
        assert!(matches_one(&KeyMsg::from_char(' '), &km.toggle));
        assert!(matches_one(&KeyMsg::from_char('x'), &km.toggle));
        assert!(!matches_one(&KeyMsg::from_type(KeyType::Enter), &km.toggle));
    }

    #[test]
    fn test_text_new_line_keys() {
        let km = TextKeyMap::default();
        let alt_enter = KeyMsg::from_type(KeyType::Enter).with_alt();
        assert!(matches_one(&alt_enter, &km.new_line));
        assert!(matches_one(&KeyMsg::from_type(KeyType::CtrlJ), &km.new_line));
        assert!(!matches_one(&alt_enter, &km.next));
    }
}
