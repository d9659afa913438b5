//! Multi-reading weight aggregation.
//!
//! Operators often weigh one item in several goes (several bins, a scale
//! that is too small) and need to fix a single misreading without typing
//! the whole total again, so the weight step keeps an ordered list of
//! readings instead of one running number.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cashdesk_core::ValueObject;

/// Largest single reading the scale can report (9999.99).
pub const MAX_READING: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightRejection {
    #[error("weight must be greater than zero")]
    NotPositive,
    #[error("weight must not exceed {max}")]
    AboveMaximum { max: Decimal },
    #[error("no reading at position {index} (there are {len})")]
    NoSuchReading { index: usize, len: usize },
    #[error("add at least one reading before continuing")]
    NothingToCommit,
}

/// One confirmed measurement, always in `(0, 9999.99]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightReading {
    value: Decimal,
}

impl ValueObject for WeightReading {}

impl WeightReading {
    pub fn new(value: Decimal) -> Result<Self, WeightRejection> {
        if value <= Decimal::ZERO {
            return Err(WeightRejection::NotPositive);
        }
        if value > MAX_READING {
            return Err(WeightRejection::AboveMaximum { max: MAX_READING });
        }
        Ok(Self { value })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightAggregator {
    readings: Vec<WeightReading>,
}

impl WeightAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading. Rejected candidates leave the list untouched.
    pub fn confirm(&mut self, candidate: Decimal) -> Result<WeightReading, WeightRejection> {
        let reading = WeightReading::new(candidate)?;
        self.readings.push(reading);
        Ok(reading)
    }

    /// Remove the reading at `index`; later readings shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<WeightReading, WeightRejection> {
        if index >= self.readings.len() {
            return Err(WeightRejection::NoSuchReading {
                index,
                len: self.readings.len(),
            });
        }
        Ok(self.readings.remove(index))
    }

    pub fn total(&self) -> Decimal {
        self.readings.iter().map(WeightReading::value).sum()
    }

    /// Hand over the total and discard the readings.
    ///
    /// Only a positive total can be committed.
    pub fn commit(&mut self) -> Result<Decimal, WeightRejection> {
        let total = self.total();
        if total <= Decimal::ZERO {
            return Err(WeightRejection::NothingToCommit);
        }
        self.readings.clear();
        Ok(total)
    }

    pub fn readings(&self) -> &[WeightReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn reset(&mut self) {
        self.readings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(units: i64, scale: u32) -> Decimal {
        Decimal::new(units, scale)
    }

    #[test]
    fn bounds_are_enforced() {
        let mut agg = WeightAggregator::new();
        assert_eq!(agg.confirm(Decimal::ZERO), Err(WeightRejection::NotPositive));
        assert_eq!(agg.confirm(dec(-1, 0)), Err(WeightRejection::NotPositive));
        assert_eq!(
            agg.confirm(dec(10_000, 0)),
            Err(WeightRejection::AboveMaximum { max: MAX_READING })
        );
        assert!(agg.is_empty());

        assert!(agg.confirm(dec(999_999, 2)).is_ok());
        assert_eq!(agg.total(), MAX_READING);
    }

    #[test]
    fn remove_shifts_later_readings() {
        let mut agg = WeightAggregator::new();
        for units in [100, 250, 75] {
            agg.confirm(dec(units, 2)).unwrap();
        }

        let removed = agg.remove(1).unwrap();
        assert_eq!(removed.value(), dec(250, 2));
        assert_eq!(
            agg.readings().iter().map(WeightReading::value).collect::<Vec<_>>(),
            vec![dec(100, 2), dec(75, 2)]
        );
        assert_eq!(agg.total(), dec(175, 2));
    }

    #[test]
    fn remove_out_of_bounds_errors() {
        let mut agg = WeightAggregator::new();
        agg.confirm(Decimal::ONE).unwrap();
        assert_eq!(
            agg.remove(1),
            Err(WeightRejection::NoSuchReading { index: 1, len: 1 })
        );
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn commit_requires_positive_total_and_drains_the_list() {
        let mut agg = WeightAggregator::new();
        assert_eq!(agg.total(), Decimal::ZERO);
        assert_eq!(agg.commit(), Err(WeightRejection::NothingToCommit));

        agg.confirm(Decimal::from(2)).unwrap();
        agg.confirm(Decimal::from(3)).unwrap();
        assert_eq!(agg.commit(), Ok(Decimal::from(5)));
        assert!(agg.is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Confirm(i64),
            Remove(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => (-500i64..1_100_000).prop_map(Op::Confirm),
                1 => (0usize..12).prop_map(Op::Remove),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: total always equals the sum of the current readings.
            #[test]
            fn total_matches_model(ops in prop::collection::vec(op(), 0..60)) {
                let mut agg = WeightAggregator::new();
                let mut model: Vec<Decimal> = Vec::new();

                for op in ops {
                    match op {
                        Op::Confirm(cents) => {
                            let candidate = Decimal::new(cents, 2);
                            let accepted = agg.confirm(candidate).is_ok();
                            let valid = candidate > Decimal::ZERO && candidate <= MAX_READING;
                            prop_assert_eq!(accepted, valid);
                            if valid {
                                model.push(candidate);
                            }
                        }
                        Op::Remove(index) => {
                            let removed = agg.remove(index).is_ok();
                            prop_assert_eq!(removed, index < model.len());
                            if removed {
                                model.remove(index);
                            }
                        }
                    }
                    let expected: Decimal = model.iter().copied().sum();
                    prop_assert_eq!(agg.total(), expected);
                    prop_assert_eq!(agg.len(), model.len());
                }
            }
        }
    }
}
