//! Keyboard-facing input primitives for the entry terminal.
//!
//! Everything here is synchronous and side-effect free apart from logging:
//! the host feeds key presses in, and gets logical actions, normalized
//! buffers or selected positions back.

pub mod key;
pub mod layout;
pub mod mask;
pub mod shortcuts;

pub use key::{FocusTarget, KeyPress, Modifiers};
pub use layout::{KeyAction, LayoutKeyTranslator};
pub use mask::{MaskMode, NumericInputMask};
pub use shortcuts::{MAX_POSITIONS, PositionalShortcutMapper, ShortcutBinding};
