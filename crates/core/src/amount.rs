//! Amount - Non-negative decimal wrapper for user-facing amounts
//!
//! Order prices, urgency surcharges and payout requests are always
//! non-negative. The sign of a ledger movement lives on the transaction
//! record, not on the amount the caller supplies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when constructing an amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative decimal amount.
///
/// # Invariant
/// The inner value is always >= 0, enforced by the constructor.
///
/// # Example
/// ```
/// use fourmiz_core::Amount;
/// use rust_decimal::Decimal;
///
/// let price = Amount::new(Decimal::new(4250, 2)).unwrap(); // 42.50
/// assert_eq!(price.value(), Decimal::new(4250, 2));
///
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error if the value is negative.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            Err(AmountError::Negative(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Whole currency units, mostly useful in tests and defaults.
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::new(units, 0))
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition over two amounts
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if the result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(Amount(result))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(42.50)).unwrap();
        assert_eq!(amount.value(), dec!(42.50));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let result = Amount::new(dec!(-5));
        assert!(matches!(result, Err(AmountError::Negative(_))));
    }

    #[test]
    fn test_from_major() {
        assert_eq!(Amount::from_major(10).value(), dec!(10));
    }

    #[test]
    fn test_checked_add() {
        let total = Amount::from_major(40)
            .checked_add(&Amount::new(dec!(2.50)).unwrap())
            .unwrap();
        assert_eq!(total.value(), dec!(42.50));
    }

    #[test]
    fn test_checked_sub_prevents_negative() {
        let a = Amount::from_major(10);
        let b = Amount::from_major(20);
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn test_serde_roundtrip() {
        let amount = Amount::new(dec!(123.45)).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, parsed);
    }
}
