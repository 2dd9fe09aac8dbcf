//! Fixed-scale amounts for journal lines.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount is a `rust_decimal::Decimal` rescaled to [`AMOUNT_SCALE`]
//! places with banker's rounding, so sums over many lines never drift.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places every amount carries.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount a single line can carry: 999,999,999,999.99.
///
/// Keeps column totals and report balances far away from `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, AMOUNT_SCALE);

/// Errors produced when an amount is entered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Amounts on journal lines are never negative.
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),

    /// The input is not a decimal number.
    #[error("Invalid amount: {0}")]
    Invalid(String),

    /// Above [`MAX_AMOUNT`].
    #[error("Amount exceeds the maximum of {MAX_AMOUNT}: {0}")]
    TooLarge(Decimal),
}

/// A non-negative monetary amount with a fixed scale of two places.
///
/// Serialized as a decimal string; deserializes from either a string or a
/// JSON number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, AMOUNT_SCALE));

    /// Creates an amount, rounding to the fixed scale.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Negative`] for values below zero and
    /// [`AmountError::TooLarge`] above [`MAX_AMOUNT`].
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        if value.is_zero() {
            return Ok(Self::ZERO);
        }
        let rounded = round_to_scale(value);
        if rounded > MAX_AMOUNT {
            return Err(AmountError::TooLarge(value));
        }
        Ok(Self(rounded))
    }

    /// Parses user input. Blank input is treated as zero, the way an empty
    /// debit or credit cell is.
    ///
    /// # Errors
    ///
    /// Returns an error for non-numeric, negative or oversized input.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }
        let value: Decimal = trimmed
            .replace(',', "")
            .parse()
            .map_err(|_| AmountError::Invalid(trimmed.to_string()))?;
        Self::new(value)
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

/// Rounds a decimal to [`AMOUNT_SCALE`] places using banker's rounding and
/// pins the scale so equal values also print identically.
#[must_use]
pub fn round_to_scale(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(AMOUNT_SCALE);
    rounded
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
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

impl std::str::FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(round_to_scale(self.0 + rhs.0))
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, amount| acc + amount)
    }
}
