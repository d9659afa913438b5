//! Domain building blocks shared by the cash-desk crates.
//!
//! Pure domain primitives: no IO, no UI, no clocks.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, LineId, PresetId, TerminalId};
pub use value_object::ValueObject;
