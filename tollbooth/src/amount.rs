//! Human-readable USD amount parsing.
//!
//! Prices in the price table are written the way a person writes them
//! (`"$0.001"`, `"1.50"`). [`MoneyAmount`] keeps the exact decimal value and
//! renders back to the canonical dollar string that 402 metadata carries.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A positive USD amount in human-readable currency format.
///
/// Accepts strings like `"$0.001"`, `"0.01"`, or `"1,000"`. The currency
/// marker and grouping separators are cosmetic; only the decimal value is
/// kept.
///
/// # Serialization
///
/// Serialized as a dollar string (`"$0.001"`) so that payment-required
/// responses echo the configured price verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MoneyAmount(Decimal);

/// Errors produced when parsing a [`MoneyAmount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoneyAmountParseError {
    /// The input is not a decimal number.
    #[error("invalid number format")]
    InvalidFormat,
    /// The value is outside the accepted range.
    #[error("amount must be between $0.000000001 and $999999999")]
    OutOfRange,
    /// Negative amounts are not valid prices.
    #[error("negative value is not allowed")]
    Negative,
}

/// Smallest accepted amount, one nano-dollar.
fn min_amount() -> Decimal {
    Decimal::new(1, 9)
}

/// Largest accepted amount.
fn max_amount() -> Decimal {
    Decimal::new(999_999_999, 0)
}

impl MoneyAmount {
    /// Parses a human-readable amount string.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyAmountParseError`] if the input is not a decimal
    /// number, is negative, or falls outside the accepted range.
    pub fn parse(input: &str) -> Result<Self, MoneyAmountParseError> {
        // Only currency decoration ($, commas, whitespace) may accompany the
        // number itself; anything else is not an amount.
        if !input
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '$' | ',') || c.is_whitespace())
        {
            return Err(MoneyAmountParseError::InvalidFormat);
        }
        let cleaned: String = input
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();

        let parsed =
            Decimal::from_str(&cleaned).map_err(|_| MoneyAmountParseError::InvalidFormat)?;

        if parsed.is_sign_negative() {
            return Err(MoneyAmountParseError::Negative);
        }
        if parsed < min_amount() || parsed > max_amount() {
            return Err(MoneyAmountParseError::OutOfRange);
        }

        Ok(Self(parsed))
    }

    /// Returns the underlying decimal value.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for MoneyAmount {
    type Err = MoneyAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Display for MoneyAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0.normalize())
    }
}

impl Serialize for MoneyAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MoneyAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
