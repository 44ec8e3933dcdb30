//! Monetary amounts.
//!
//! The system is single-currency, so an amount is just a positive decimal
//! bounded by a configurable ceiling.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Smallest chargeable amount (one cent).
pub const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Default upper bound for a single operation.
pub const DEFAULT_AMOUNT_CEILING: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Reasons a decimal cannot become an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Below [`MIN_AMOUNT`], including zero and negative values.
    #[error("Amount must be greater than 0.")]
    BelowMinimum,
    /// Above the configured ceiling.
    #[error("Amount must not exceed {ceiling}.")]
    AboveCeiling {
        /// The ceiling that was exceeded.
        ceiling: Decimal,
    },
}

/// A validated amount of at least [`MIN_AMOUNT`] and no larger than the
/// ceiling it was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Checks `value` against [`MIN_AMOUNT`] and `ceiling`.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::BelowMinimum`] when `value < MIN_AMOUNT` and
    /// [`AmountError::AboveCeiling`] when `value > ceiling`.
    pub fn try_new(value: Decimal, ceiling: Decimal) -> Result<Self, AmountError> {
        if value < MIN_AMOUNT {
            return Err(AmountError::BelowMinimum);
        }
        if value > ceiling {
            return Err(AmountError::AboveCeiling { ceiling });
        }
        Ok(Self(value))
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_accepts_smallest_and_ceiling() {
        assert_eq!(
            Amount::try_new(MIN_AMOUNT, DEFAULT_AMOUNT_CEILING).unwrap().value(),
            dec("0.01")
        );
        assert!(Amount::try_new(dec("1000000"), DEFAULT_AMOUNT_CEILING).is_ok());
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(
            Amount::try_new(Decimal::ZERO, DEFAULT_AMOUNT_CEILING),
            Err(AmountError::BelowMinimum)
        );
        assert_eq!(
            Amount::try_new(dec("-5"), DEFAULT_AMOUNT_CEILING),
            Err(AmountError::BelowMinimum)
        );
    }

    #[test]
    fn test_rejects_sub_cent_amounts() {
        for value in ["0.001", "0.005", "0.009"] {
            let err = Amount::try_new(dec(value), DEFAULT_AMOUNT_CEILING).unwrap_err();
            assert_eq!(err, AmountError::BelowMinimum, "{value}");
            assert_eq!(err.to_string(), "Amount must be greater than 0.");
        }
        assert!(Amount::try_new(dec("0.010"), DEFAULT_AMOUNT_CEILING).is_ok());
    }

    #[test]
    fn test_rejects_above_ceiling() {
        let err = Amount::try_new(dec("1000000.01"), DEFAULT_AMOUNT_CEILING).unwrap_err();
        assert_eq!(err.to_string(), "Amount must not exceed 1000000.");
    }
}
