//! Quantity field rule.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityRejection {
    #[error("quantity must be a whole number")]
    NotWhole,
    #[error("quantity must be at least {min}")]
    BelowMinimum { min: u32 },
    #[error("quantity must not exceed {max}")]
    AboveMaximum { max: u32 },
}

/// Accept whole numbers in `[1, 9999]`.
pub fn validate_quantity(candidate: Decimal) -> Result<u32, QuantityRejection> {
    if !candidate.fract().is_zero() {
        return Err(QuantityRejection::NotWhole);
    }
    if candidate < Decimal::from(MIN_QUANTITY) {
        return Err(QuantityRejection::BelowMinimum { min: MIN_QUANTITY });
    }
    if candidate > Decimal::from(MAX_QUANTITY) {
        return Err(QuantityRejection::AboveMaximum { max: MAX_QUANTITY });
    }
    candidate
        .to_u32()
        .ok_or(QuantityRejection::AboveMaximum { max: MAX_QUANTITY })
}
