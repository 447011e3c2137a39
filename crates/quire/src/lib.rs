#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Quire
//!
//! A library for building multi-step interactive forms in the terminal.
//!
//! Quire provides:
//! - Select menus and multi-select lists with filtering and selection limits
//! - Multi-line text areas
//! - Titles, descriptions and option lists computed from live bindings
//! - Groups of fields with a scrolling viewport, chained into forms
//! - A line-based accessible mode that runs the same validators
//!
//! Forms follow the Elm architecture: a [`Form`] is a [`Model`] that receives
//! [`Message`]s and answers with [`Cmd`]s. Any runtime that owns a terminal
//! can drive it; tests drive it with the [`Simulator`].
//!
//! ## Example
//!
//! ```rust
//! use quire::{Bound, Form, FormState, Group, KeyMsg, KeyType, MultiSelect, Select};
//! use quire::{Simulator, SelectOption, Text, new_options, validate_required};
//!
//! let toppings = Bound::new(Vec::new());
//! let size = Bound::new(String::new());
//! let notes = Bound::new(String::new());
//!
//! let form = Form::new(vec![
//!     Group::new(vec![
//!         Box::new(MultiSelect::new()
//!             .key("toppings")
//!             .title("Toppings")
//!             .options(new_options(["Lettuce", "Tomato", "Cheese"]))
//!             .limit(2)
//!             .value(toppings.clone())),
//!         Box::new(Select::new()
//!             .key("size")
//!             .title("Size")
//!             .options(vec![
//!                 SelectOption::new("Small", "s".to_string()),
//!                 SelectOption::new("Large", "l".to_string()),
//!             ])
//!             .value(size.clone())),
//!     ]),
//!     Group::new(vec![
//!         Box::new(Text::new()
//!             .key("notes")
//!             .title("Anything else?")
//!             .validate(validate_required("notes"))
//!             .value(notes.clone())),
//!     ]),
//! ]);
//!
//! let mut sim = Simulator::new(form);
//! sim.init();
//! for key in [
//!     KeyMsg::from_char('x'),
//!     KeyMsg::from_type(KeyType::Enter),
//!     KeyMsg::from_type(KeyType::Down),
//!     KeyMsg::from_type(KeyType::Enter),
//!     KeyMsg::from_runes("no onions".chars().collect()),
//!     KeyMsg::from_type(KeyType::Enter),
//! ] {
//!     sim.send_key(key);
//!     sim.run_until_empty();
//! }
//!
//! assert_eq!(sim.model().state(), FormState::Completed);
//! assert_eq!(toppings.get(), vec!["Lettuce".to_string()]);
//! assert_eq!(size.get(), "l");
//! assert_eq!(notes.get(), "no onions");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

pub mod accessible;
pub mod bound;
pub mod config;
pub mod error;
pub mod eval;
pub mod field;
pub mod form;
pub mod group;
pub mod header;
pub mod help;
pub mod key;
pub mod keymap;
pub mod list;
pub mod multiselect;
pub mod option;
pub mod runtime;
pub mod select;
pub mod simulator;
pub mod spinner;
pub mod text;
pub mod theme;
pub mod validate;
pub mod viewport;

pub use bound::Bound;
pub use config::{ACCESSIBLE_ENV, FormConfig, Layout};
pub use error::{FormError, Result};
pub use eval::{EvalDoneMsg, EvalSlot, SPINNER_SHOW_THRESHOLD};
pub use field::{
    Field, FieldPosition, NextFieldMsg, NextGroupMsg, PrevFieldMsg, PrevGroupMsg, UpdateFieldMsg,
};
pub use form::{Form, FormState};
pub use group::Group;
pub use key::{Binding, KeyMsg, KeyType};
pub use keymap::{KeyMap, MultiSelectKeyMap, SelectKeyMap, TextKeyMap};
pub use list::CursorMove;
pub use multiselect::MultiSelect;
pub use option::{SelectOption, new_options};
pub use runtime::{Cmd, Message, Model, QuitMsg, batch, quit};
pub use select::Select;
pub use simulator::Simulator;
pub use spinner::{Spinner, SpinnerType};
pub use text::Text;
pub use theme::{Style, Theme, ThemePreset};
pub use validate::{
    validate_email, validate_max_length, validate_min_length, validate_min_selected,
    validate_required,
};

// -----------------------------------------------------------------------------
// ID Generation
// -----------------------------------------------------------------------------

static LAST_ID: AtomicUsize = AtomicUsize::new(0);

/// Identifies a field or spinner in messages addressed to it.
pub(crate) fn next_id() -> usize {
    LAST_ID.fetch_add(1, Ordering::SeqCst)
}
