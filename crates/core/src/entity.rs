//! Identity-bearing records.

/// A record that stays the same thing while its attributes change (a
/// category renamed is still the same category).
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
