//! Money type
//!
//! Domain primitive for incentive amounts: plan prices, bonuses, totals and
//! rank thresholds. All values are validated at construction time, so a
//! negative sales total cannot exist in the system.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum allowed amount (1 trillion)
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Maximum decimal places (paise)
const MAX_SCALE: u32 = 2;

/// Money represents a validated, non-negative monetary value.
///
/// # Invariants
/// - Value is always >= 0
/// - Maximum 2 decimal places
/// - Maximum value is 1 trillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use sec_incentives::domain::Money;
///
/// let price = Money::new(Decimal::new(25000, 0)).unwrap();
/// let bonus = Money::from_integer(10000).unwrap();
/// assert_eq!(price.checked_add(&bonus).unwrap().value(), Decimal::new(35000, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

/// Errors that can occur when creating Money
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount must not be negative (got {0})")]
    Negative(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Money {
    /// Create a new Money value with validation.
    ///
    /// # Errors
    /// - `MoneyError::Negative` if value < 0
    /// - `MoneyError::TooManyDecimals` if more than 2 decimal places
    /// - `MoneyError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO {
            return Err(MoneyError::Negative(value));
        }

        // Trailing zeros ("100.000") are not extra precision
        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(MoneyError::TooManyDecimals(value.scale()));
        }

        if value > Decimal::from(MAX_AMOUNT) {
            return Err(MoneyError::Overflow);
        }

        Ok(Self(value))
    }

    /// Create Money from a whole number of rupees.
    pub fn from_integer(value: i64) -> Result<Self, MoneyError> {
        Self::new(Decimal::from(value))
    }

    /// Whole amount from trusted constants, bypassing validation.
    pub(crate) fn from_trusted(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Add two amounts, failing if the sum leaves the valid range.
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        Money::new(self.0 + other.0)
    }

    /// Check whether this amount reaches a threshold (inclusive).
    pub fn reaches(&self, threshold: &Money) -> bool {
        self.0 >= threshold.0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
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
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| MoneyError::ParseError(e.to_string()))?;
        Money::new(decimal)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::from_str(&value)
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_zero_allowed() {
        let money = Money::new(Decimal::ZERO).unwrap();
        assert!(money.is_zero());
        assert_eq!(money, Money::zero());
    }

    #[test]
    fn test_money_negative_rejected() {
        let money = Money::new(dec!(-1));
        assert!(matches!(money, Err(MoneyError::Negative(_))));
    }

    #[test]
    fn test_money_too_many_decimals() {
        let money = Money::new(dec!(10.125));
        assert!(matches!(money, Err(MoneyError::TooManyDecimals(3))));
    }

    #[test]
    fn test_money_trailing_zeros_ok() {
        let money = Money::new(dec!(10.500)).unwrap();
        assert_eq!(money.value(), dec!(10.5));
    }

    #[test]
    fn test_money_overflow() {
        let money = Money::new(dec!(1000000000000.01));
        assert!(matches!(money, Err(MoneyError::Overflow)));
    }

    #[test]
    fn test_money_from_str() {
        let money: Money = " 1499.50 ".parse().unwrap();
        assert_eq!(money.value(), dec!(1499.50));

        let bad: Result<Money, _> = "abc".parse();
        assert!(matches!(bad, Err(MoneyError::ParseError(_))));
    }

    #[test]
    fn test_money_reaches_is_inclusive() {
        let threshold = Money::from_integer(21000).unwrap();
        assert!(Money::from_integer(21000).unwrap().reaches(&threshold));
        assert!(!Money::new(dec!(20999.99)).unwrap().reaches(&threshold));
    }

    #[test]
    fn test_money_serializes_as_string() {
        let money = Money::from_integer(56000).unwrap();
        assert_eq!(serde_json::to_string(&money).unwrap(), "\"56000.00\"");

        let parsed: Money = serde_json::from_str("\"250.5\"").unwrap();
        assert_eq!(parsed.value(), dec!(250.5));
    }
}
