//! Price rules: which pricing mode applies to a line and what it accepts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cashdesk_core::ValueObject;

/// Lowest price accepted for free-form entry (0.01).
pub const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// Highest price accepted anywhere (9999.99).
pub const MAX_PRICE: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);

/// Price metadata attached to a category by the category directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPriceRule {
    #[serde(default)]
    pub fixed_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
}

impl ValueObject for CategoryPriceRule {}

impl CategoryPriceRule {
    pub fn fixed(price: Decimal) -> Self {
        Self {
            fixed_price: Some(price),
            max_price: None,
        }
    }

    pub fn ranged(min: Decimal, max: Decimal) -> Self {
        Self {
            fixed_price: Some(min),
            max_price: Some(max),
        }
    }

    pub fn free() -> Self {
        Self::default()
    }

    /// No price metadata at all.
    pub fn is_unset(&self) -> bool {
        self.fixed_price.is_none() && self.max_price.is_none()
    }

    /// Use `parent`'s rule when this one carries no metadata.
    pub fn or_inherit(self, parent: CategoryPriceRule) -> Self {
        if self.is_unset() { parent } else { self }
    }
}

/// How the price of the current line is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum PricingMode {
    /// Pre-filled, not editable.
    Fixed { price: Decimal },
    /// Manual entry within `[min, max]`.
    Ranged { min: Decimal, max: Decimal },
    /// Manual entry within the global bounds.
    Free,
    /// A preset is selected: unit price is zero and the amount comes from
    /// the preset calculator.
    PresetOverride,
}

impl PricingMode {
    /// True when the operator types the price.
    pub fn is_editable(&self) -> bool {
        matches!(self, PricingMode::Ranged { .. } | PricingMode::Free)
    }

    /// Price to pre-fill when the price step opens, if the mode dictates one.
    pub fn prefill(&self) -> Option<Decimal> {
        match self {
            PricingMode::Fixed { price } => Some(*price),
            PricingMode::PresetOverride => Some(Decimal::ZERO),
            PricingMode::Ranged { .. } | PricingMode::Free => None,
        }
    }
}

/// Reason a price was refused. Only meant for the operator's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceRejection {
    #[error("price must be at least {min}")]
    BelowMinimum { min: Decimal },
    #[error("price must not exceed {max}")]
    AboveMaximum { max: Decimal },
    #[error("price is fixed at {price}")]
    FixedPrice { price: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceVerdict {
    Accepted,
    Rejected(PriceRejection),
}

impl PriceVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PriceVerdict::Accepted)
    }

    pub fn reason(&self) -> Option<&PriceRejection> {
        match self {
            PriceVerdict::Accepted => None,
            PriceVerdict::Rejected(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), PriceRejection> {
        match self {
            PriceVerdict::Accepted => Ok(()),
            PriceVerdict::Rejected(reason) => Err(reason),
        }
    }
}

pub struct PricingPolicy;

impl PricingPolicy {
    /// Derive the pricing mode for a rule. A selected preset always wins.
    ///
    /// Metadata the rule table does not describe is resolved as follows:
    /// a negative fixed price counts as absent, a maximum below the fixed
    /// price leaves the fixed price in force, and a maximum on its own is a
    /// range starting at [`MIN_PRICE`].
    pub fn resolve(rule: &CategoryPriceRule, preset_active: bool) -> PricingMode {
        if preset_active {
            return PricingMode::PresetOverride;
        }

        let fixed = rule.fixed_price.filter(|price| *price >= Decimal::ZERO);
        let max = rule.max_price.filter(|max| *max > Decimal::ZERO);

        match (fixed, max) {
            (Some(min), Some(max)) if max >= min => PricingMode::Ranged { min, max },
            (Some(price), _) => PricingMode::Fixed { price },
            (None, Some(max)) => PricingMode::Ranged {
                min: MIN_PRICE.min(max),
                max,
            },
            (None, None) => PricingMode::Free,
        }
    }

    pub fn validate(mode: &PricingMode, candidate: Decimal) -> PriceVerdict {
        let bounds = match mode {
            PricingMode::PresetOverride => return PriceVerdict::Accepted,
            PricingMode::Fixed { price } => {
                return if candidate == *price {
                    PriceVerdict::Accepted
                } else {
                    PriceVerdict::Rejected(PriceRejection::FixedPrice { price: *price })
                };
            }
            PricingMode::Ranged { min, max } => (*min, *max),
            PricingMode::Free => (MIN_PRICE, MAX_PRICE),
        };

        let (min, max) = bounds;
        if candidate < min {
            PriceVerdict::Rejected(PriceRejection::BelowMinimum { min })
        } else if candidate > max {
            PriceVerdict::Rejected(PriceRejection::AboveMaximum { max })
        } else {
            PriceVerdict::Accepted
        }
    }
}
