//! Sale-line entry engine of a cash-desk terminal.
//!
//! A line is built step by step (category, optional sub-category, weight,
//! quantity, price) by the [`EntryWizard`] aggregate. [`EntrySession`] wraps
//! it with the keypad, the weight readings and the inactivity timer, and
//! hands finished lines to a [`LineSink`].

pub mod config;
pub mod directory;
pub mod draft;
pub mod pricing;
pub mod quantity;
pub mod session;
pub mod sink;
pub mod step;
pub mod timer;
pub mod weight;
pub mod wizard;

pub use config::EntryConfig;
pub use directory::{CategoryDirectory, CategoryEntry, InMemoryCategoryDirectory};
pub use draft::{FinishedLine, SaleLineDraft};
pub use pricing::{CategoryPriceRule, PriceRejection, PriceVerdict, PricingMode, PricingPolicy};
pub use quantity::{QuantityRejection, validate_quantity};
pub use session::{EntrySession, EntryView, Feedback, FieldMessage};
pub use sink::{LineSink, PresetCalculator};
pub use step::WizardStep;
pub use timer::InactivityTimer;
pub use weight::{WeightAggregator, WeightReading, WeightRejection};
pub use wizard::{DiscardReason, EntryCommand, EntryEvent, EntryWizard};
