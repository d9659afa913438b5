//! Positional keyboard shortcuts for tile grids.
//!
//! Position N on screen is always bound to the same physical key, whatever
//! item happens to sit there. Keys follow the three AZERTY letter rows so the
//! on-screen grid mirrors the keyboard: positions 1..=10 on the top row,
//! 11..=20 on the home row and 21..=26 on the bottom row.
//!
//! A mapper is an explicit handle: whoever shows a tile grid owns one and
//! pairs [`PositionalShortcutMapper::activate`] with
//! [`PositionalShortcutMapper::deactivate`]. While inactive it never reacts.

use serde::{Deserialize, Serialize};

use crate::key::{FocusTarget, KeyPress};

pub const MAX_POSITIONS: usize = 26;

/// Row sizes, top to bottom.
pub const ROW_SIZES: [usize; 3] = [10, 10, 6];

const KEY_TABLE: [char; MAX_POSITIONS] = [
    'A', 'Z', 'E', 'R', 'T', 'Y', 'U', 'I', 'O', 'P', //
    'Q', 'S', 'D', 'F', 'G', 'H', 'J', 'K', 'L', 'M', //
    'W', 'X', 'C', 'V', 'B', 'N',
];

/// One position bound to one letter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShortcutBinding {
    /// 1-based position on screen.
    pub position: usize,
    /// Uppercase letter.
    pub key: char,
}

impl ShortcutBinding {
    /// Keyboard row (0, 1 or 2) of this binding.
    pub fn row(&self) -> usize {
        row_of(self.position)
    }
}

/// Fixed key for a 1-based position, `None` outside 1..=26.
pub fn key_for_position(position: usize) -> Option<char> {
    position
        .checked_sub(1)
        .and_then(|index| KEY_TABLE.get(index))
        .copied()
}

fn row_of(position: usize) -> usize {
    let mut upper = 0;
    for (row, size) in ROW_SIZES.iter().enumerate() {
        upper += size;
        if position <= upper {
            return row;
        }
    }
    ROW_SIZES.len() - 1
}

/// Bindings for the first `min(item_count, 26)` positions, in position order.
pub fn build_bindings(item_count: usize) -> Vec<ShortcutBinding> {
    (1..=item_count.min(MAX_POSITIONS))
        .filter_map(|position| {
            key_for_position(position).map(|key| ShortcutBinding { position, key })
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct PositionalShortcutMapper {
    bindings: Vec<ShortcutBinding>,
    active: bool,
    installs: u64,
}

impl PositionalShortcutMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the binding table for `item_count` items and (re)install the
    /// listener.
    ///
    /// The previous listener is removed before the new table goes in, so a
    /// key can never fire against both the old and the new table.
    pub fn initialize(&mut self, item_count: usize) -> &[ShortcutBinding] {
        self.deactivate();
        self.bindings = build_bindings(item_count);
        self.activate();
        &self.bindings
    }

    /// Install the key listener. Idempotent.
    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.installs += 1;
        tracing::debug!(
            bindings = self.bindings.len(),
            install = self.installs,
            "positional shortcuts activated"
        );
    }

    /// Remove the key listener. Idempotent.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        tracing::debug!(install = self.installs, "positional shortcuts deactivated");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn bindings(&self) -> &[ShortcutBinding] {
        &self.bindings
    }

    /// Bindings grouped by keyboard row, for rendering key hints.
    pub fn rows(&self) -> [Vec<ShortcutBinding>; 3] {
        let mut rows: [Vec<ShortcutBinding>; 3] = Default::default();
        for binding in &self.bindings {
            rows[binding.row()].push(*binding);
        }
        rows
    }

    pub fn key_for(&self, position: usize) -> Option<char> {
        self.bindings
            .iter()
            .find(|binding| binding.position == position)
            .map(|binding| binding.key)
    }

    /// Offer a key press to the listener.
    ///
    /// Returns the selected 1-based position when the press matched a bound
    /// key; the press is then consumed. Anything else leaves the press
    /// untouched for other handlers.
    pub fn on_key_press(&self, press: &mut KeyPress, focus: FocusTarget) -> Option<usize> {
        // Typing into a field always wins over shortcuts.
        if focus.suppresses_shortcuts() {
            return None;
        }
        if !self.active || press.modifiers().any() {
            return None;
        }
        let typed = press.as_char()?.to_ascii_uppercase();
        let binding = self.bindings.iter().find(|binding| binding.key == typed)?;

        press.prevent_default();
        press.stop_propagation();
        tracing::debug!(position = binding.position, key = %binding.key, "shortcut fired");
        Some(binding.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Modifiers;

    fn press(key: &str) -> KeyPress {
        KeyPress::new(key)
    }

    #[test]
    fn initialize_binds_first_letters_of_top_row() {
        let mut mapper = PositionalShortcutMapper::new();
        let bindings = mapper.initialize(3).to_vec();

        assert_eq!(
            bindings,
            vec![
                ShortcutBinding { position: 1, key: 'A' },
                ShortcutBinding { position: 2, key: 'Z' },
                ShortcutBinding { position: 3, key: 'E' },
            ]
        );
        assert_eq!(mapper.key_for(4), None);
        assert!(mapper.is_active());
    }

    #[test]
    fn table_caps_at_twenty_six_positions_in_three_rows() {
        let mut mapper = PositionalShortcutMapper::new();
        mapper.initialize(40);
        assert_eq!(mapper.bindings().len(), MAX_POSITIONS);

        let rows = mapper.rows();
        assert_eq!(rows.iter().map(Vec::len).collect::<Vec<_>>(), ROW_SIZES.to_vec());
        assert_eq!(rows[1][0], ShortcutBinding { position: 11, key: 'Q' });
        assert_eq!(rows[2][5], ShortcutBinding { position: 26, key: 'N' });
        assert_eq!(key_for_position(0), None);
        assert_eq!(key_for_position(27), None);
    }

    #[test]
    fn bound_key_fires_once_and_is_consumed() {
        let mut mapper = PositionalShortcutMapper::new();
        mapper.initialize(12);

        let mut event = press("s");
        assert_eq!(mapper.on_key_press(&mut event, FocusTarget::None), Some(12));
        assert!(event.is_consumed());
    }

    #[test]
    fn editable_focus_blocks_shortcuts() {
        let mut mapper = PositionalShortcutMapper::new();
        mapper.initialize(3);

        for focus in [
            FocusTarget::TextInput,
            FocusTarget::ContentEditable,
            FocusTarget::NoShortcutsRegion,
        ] {
            let mut event = press("a");
            assert_eq!(mapper.on_key_press(&mut event, focus), None);
            assert!(!event.is_default_prevented());
            assert!(!event.is_propagation_stopped());
        }

        let mut event = press("a");
        assert_eq!(mapper.on_key_press(&mut event, FocusTarget::Control), Some(1));
    }

    #[test]
    fn modifiers_and_unbound_keys_pass_through() {
        let mut mapper = PositionalShortcutMapper::new();
        mapper.initialize(3);

        let mut with_ctrl = KeyPress::with_modifiers("a", Modifiers::control());
        assert_eq!(mapper.on_key_press(&mut with_ctrl, FocusTarget::None), None);
        let mut with_shift = KeyPress::with_modifiers("A", Modifiers::shift());
        assert_eq!(mapper.on_key_press(&mut with_shift, FocusTarget::None), None);

        let mut unbound = press("r");
        assert_eq!(mapper.on_key_press(&mut unbound, FocusTarget::None), None);
        assert!(!unbound.is_default_prevented());

        let mut named = press("Enter");
        assert_eq!(mapper.on_key_press(&mut named, FocusTarget::None), None);
    }

    #[test]
    fn inactive_mapper_ignores_everything() {
        let mut mapper = PositionalShortcutMapper::new();
        mapper.initialize(3);
        mapper.deactivate();
        mapper.deactivate();

        let mut event = press("a");
        assert_eq!(mapper.on_key_press(&mut event, FocusTarget::None), None);

        mapper.activate();
        mapper.activate();
        assert_eq!(mapper.on_key_press(&mut event, FocusTarget::None), Some(1));
    }

    #[test]
    fn rebuild_replaces_the_previous_table() {
        let mut mapper = PositionalShortcutMapper::new();
        mapper.initialize(12);
        mapper.initialize(2);

        assert_eq!(mapper.bindings().len(), 2);
        let mut stale = press("q");
        assert_eq!(mapper.on_key_press(&mut stale, FocusTarget::None), None);
        assert!(!stale.is_consumed());
    }

    #[test]
    fn empty_grid_has_no_bindings() {
        let mut mapper = PositionalShortcutMapper::new();
        assert!(mapper.initialize(0).is_empty());
        let mut event = press("a");
        assert_eq!(mapper.on_key_press(&mut event, FocusTarget::None), None);
    }
}
