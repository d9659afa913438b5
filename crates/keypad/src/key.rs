//! Physical key presses and focus state as seen by the engine.

use serde::{Deserialize, Serialize};

/// Modifier keys held while a key was pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn control() -> Self {
        Self {
            control: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    /// True when at least one modifier is held.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// A single key-press event.
///
/// `key` is the symbol the OS layout produced (`"2"`, `"é"`, `"Enter"`).
/// Handlers that act on the event consume it through
/// [`KeyPress::prevent_default`] and [`KeyPress::stop_propagation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    key: String,
    modifiers: Modifiers,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_modifiers(key, Modifiers::NONE)
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// The key as a single character, if it is one.
    pub fn as_char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Both the default action and propagation were suppressed.
    pub fn is_consumed(&self) -> bool {
        self.default_prevented && self.propagation_stopped
    }
}

/// What currently holds keyboard focus on the terminal screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusTarget {
    /// Nothing in particular (document body).
    #[default]
    None,
    /// A non-editable control such as a button or a tile.
    Control,
    /// A text input or text area.
    TextInput,
    /// A rich content-editable surface.
    ContentEditable,
    /// A region explicitly marked as "no shortcuts".
    NoShortcutsRegion,
}

impl FocusTarget {
    /// True when typed characters belong to the focused element.
    pub fn is_text_editable(self) -> bool {
        matches!(self, FocusTarget::TextInput | FocusTarget::ContentEditable)
    }

    /// True when global shortcuts must leave key presses alone.
    pub fn suppresses_shortcuts(self) -> bool {
        self.is_text_editable() || self == FocusTarget::NoShortcutsRegion
    }
}
