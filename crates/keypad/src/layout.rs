//! Physical key symbol to logical keypad action.
//!
//! Terminals ship with either a US or a French (AZERTY) keyboard. On AZERTY
//! the unshifted number row produces punctuation and accented letters, and
//! on Mac layouts Option+digit produces symbols. Every one of those has to
//! land on the same logical digit before it reaches a [`crate::mask`].

use serde::{Deserialize, Serialize};

use crate::key::{KeyPress, Modifiers};

/// Logical action for a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Digit(u8),
    DecimalPoint,
    Backspace,
    Confirm,
    /// The key means nothing to the keypad and must not reach a mask.
    Unmapped,
}

/// Unshifted AZERTY number row.
const ALTERNATE_LAYOUT: [(&str, u8); 10] = [
    ("à", 0),
    ("&", 1),
    ("é", 2),
    ("\"", 3),
    ("'", 4),
    ("(", 5),
    ("-", 6),
    ("è", 7),
    ("_", 8),
    ("ç", 9),
];

/// Mac number row with Option (alt) held.
const ALT_QUALIFIED: [(&str, u8); 10] = [
    ("º", 0),
    ("¡", 1),
    ("™", 2),
    ("£", 3),
    ("¢", 4),
    ("∞", 5),
    ("§", 6),
    ("¶", 7),
    ("•", 8),
    ("ª", 9),
];

const MODIFIER_KEYS: [&str; 7] = [
    "Shift", "Control", "Alt", "AltGraph", "Meta", "OS", "CapsLock",
];

/// Resolves raw key symbols into [`KeyAction`]s.
///
/// Lookup order: modifier key names, direct digits, the alternate-layout
/// table, the alt-qualified table, special keys.
#[derive(Debug, Clone)]
pub struct LayoutKeyTranslator {
    alternate: &'static [(&'static str, u8)],
    alt_qualified: &'static [(&'static str, u8)],
}

impl Default for LayoutKeyTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutKeyTranslator {
    pub fn new() -> Self {
        Self {
            alternate: &ALTERNATE_LAYOUT,
            alt_qualified: &ALT_QUALIFIED,
        }
    }

    pub fn translate_press(&self, press: &KeyPress) -> KeyAction {
        self.translate(press.key(), press.modifiers())
    }

    pub fn translate(&self, key: &str, modifiers: Modifiers) -> KeyAction {
        if is_modifier_key(key) {
            return KeyAction::Unmapped;
        }
        if let Some(d) = direct_digit(key) {
            return KeyAction::Digit(d);
        }
        if let Some(d) = lookup(self.alternate, key) {
            return KeyAction::Digit(d);
        }
        if modifiers.alt {
            if let Some(d) = lookup(self.alt_qualified, key) {
                return KeyAction::Digit(d);
            }
        }
        match key {
            "Backspace" | "Delete" => KeyAction::Backspace,
            "." | "," => KeyAction::DecimalPoint,
            "Enter" | "+" | "=" => KeyAction::Confirm,
            _ => KeyAction::Unmapped,
        }
    }
}

pub fn is_modifier_key(key: &str) -> bool {
    MODIFIER_KEYS.contains(&key)
}

fn direct_digit(key: &str) -> Option<u8> {
    match key.as_bytes() {
        [b @ b'0'..=b'9'] => Some(b - b'0'),
        _ => None,
    }
}

fn lookup(table: &[(&str, u8)], key: &str) -> Option<u8> {
    table
        .iter()
        .find(|(symbol, _)| *symbol == key)
        .map(|(_, digit)| *digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(key: &str) -> KeyAction {
        LayoutKeyTranslator::new().translate(key, Modifiers::NONE)
    }

    #[test]
    fn direct_and_alternate_keys_yield_the_same_digit() {
        assert_eq!(translate("2"), KeyAction::Digit(2));
        assert_eq!(translate("é"), KeyAction::Digit(2));
        for (symbol, digit) in ALTERNATE_LAYOUT {
            assert_eq!(translate(symbol), translate(&digit.to_string()));
        }
    }

    #[test]
    fn alt_table_requires_alt() {
        let translator = LayoutKeyTranslator::new();
        assert_eq!(translator.translate("™", Modifiers::alt()), KeyAction::Digit(2));
        assert_eq!(translator.translate("™", Modifiers::NONE), KeyAction::Unmapped);
        for (symbol, digit) in ALT_QUALIFIED {
            assert_eq!(translator.translate(symbol, Modifiers::alt()), KeyAction::Digit(digit));
        }
    }

    #[test]
    fn special_keys() {
        assert_eq!(translate("Backspace"), KeyAction::Backspace);
        assert_eq!(translate("Delete"), KeyAction::Backspace);
        assert_eq!(translate("."), KeyAction::DecimalPoint);
        assert_eq!(translate(","), KeyAction::DecimalPoint);
        assert_eq!(translate("Enter"), KeyAction::Confirm);
        assert_eq!(translate("+"), KeyAction::Confirm);
        assert_eq!(translate("="), KeyAction::Confirm);
        assert_eq!(translate("x"), KeyAction::Unmapped);
        assert_eq!(translate("F5"), KeyAction::Unmapped);
        assert_eq!(translate("22"), KeyAction::Unmapped);
    }

    #[test]
    fn modifier_keys_are_never_forwarded() {
        let translator = LayoutKeyTranslator::new();
        for key in ["Shift", "Control", "Alt", "Meta", "AltGraph"] {
            assert_eq!(translator.translate(key, Modifiers::NONE), KeyAction::Unmapped);
            assert_eq!(translator.translate(key, Modifiers::shift()), KeyAction::Unmapped);
        }
    }

    #[test]
    fn shifted_digits_still_resolve_directly() {
        let press = KeyPress::with_modifiers("7", Modifiers::shift());
        assert_eq!(LayoutKeyTranslator::new().translate_press(&press), KeyAction::Digit(7));
    }
}
