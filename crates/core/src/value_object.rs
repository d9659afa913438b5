//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two weight
/// readings of `1.50` are interchangeable, while two categories with the same
/// name are not (those are entities, see [`crate::Entity`]).
///
/// To "modify" a value object, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
