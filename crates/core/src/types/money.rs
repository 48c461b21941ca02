//! Monetary amounts using decimal arithmetic.
//!
//! The backend speaks JSON floats for every price, subtotal and discount. A
//! [`Money`] decodes from either a JSON number or a numeric string, does its
//! arithmetic in [`Decimal`], and serializes back out as a JSON number so
//! request payloads keep the wire shape the backend expects.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul, Sub};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Money`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input string is empty.
    #[error("amount cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
}

/// An amount of money in the store's currency.
///
/// Displays with exactly two decimal places (`27.50`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from minor units (e.g., `2750` -> `27.50`).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Parse an amount from user input such as `"50"` or `"7.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not a decimal number.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }

        Decimal::from_str(trimmed)
            .map(Self)
            .map_err(|_| MoneyError::Invalid(trimmed.to_owned()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, qty: u32) -> Self::Output {
        Self(self.0 * Decimal::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_two_places() {
        assert_eq!(Money::parse("27.5").unwrap().to_string(), "27.50");
        assert_eq!(Money::parse("45").unwrap().to_string(), "45.00");
        assert_eq!(Money::from_minor(750).to_string(), "7.50");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Money::parse("  "), Err(MoneyError::Empty));
        assert!(matches!(Money::parse("ten"), Err(MoneyError::Invalid(_))));
    }

    #[test]
    fn test_deserialize_from_number_and_string() {
        let from_float: Money = serde_json::from_str("7.5").unwrap();
        let from_int: Money = serde_json::from_str("10").unwrap();
        let from_str: Money = serde_json::from_str("\"7.50\"").unwrap();

        assert_eq!(from_float, Money::from_minor(750));
        assert_eq!(from_int, Money::from_minor(1000));
        assert_eq!(from_str, Money::from_minor(750));
    }

    #[test]
    fn test_serializes_as_json_number() {
        let value = serde_json::to_value(Money::from_minor(5000)).unwrap();
        assert!(value.is_number());
        assert_eq!(value.as_f64(), Some(50.0));
    }

    #[test]
    fn test_arithmetic() {
        let ten = Money::from_minor(1000);
        let seven_fifty = Money::from_minor(750);

        assert_eq!(ten * 2 + seven_fifty, Money::from_minor(2750));
        assert_eq!(ten - seven_fifty, Money::from_minor(250));
        assert_eq!((seven_fifty - ten).to_string(), "-2.50");
    }
}
