//! Product price using decimal arithmetic.
//!
//! Prices travel as JSON numbers. User input is parsed with [`Price::parse`],
//! which is the client-side fast-fail check: the server's validation remains
//! authoritative, and prices coming back from the server are adopted as-is.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why a price input was rejected.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// Nothing was entered.
    #[error("price is required")]
    Missing,
    /// The input is not a number.
    #[error("price must be a number")]
    NotANumber,
    /// The number is zero or negative.
    #[error("price must be greater than zero")]
    NotPositive,
}

/// A product price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Parse a price from form input.
    ///
    /// Accepts plain decimals (`"12"`, `"19.99"`) and scientific
    /// notation (`"1e2"`), surrounded by optional whitespace. The value must be
    /// strictly greater than zero.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] when the input is blank, not numeric, or not
    /// positive.
    ///
    /// # Example
    ///
    /// ```
    /// use wishlist_core::{Price, PriceError};
    ///
    /// assert!(Price::parse("19.99").is_ok());
    /// assert_eq!(Price::parse("0"), Err(PriceError::NotPositive));
    /// assert_eq!(Price::parse("abc"), Err(PriceError::NotANumber));
    /// ```
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Missing);
        }

        let amount = if trimmed.contains(['e', 'E']) {
            Decimal::from_scientific(trimmed)
        } else {
            Decimal::from_str(trimmed)
        }
        .map_err(|_| PriceError::NotANumber)?;

        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }

        Ok(Self(amount))
    }

    /// Wrap an amount received from a trusted source without validation.
    #[must_use]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded to two decimal places, e.g. `19.90`.
    #[must_use]
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.display_amount())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_positive_numbers() {
        for input in ["1", "19.99", "0.01", " 42 ", "1e2", "2.5E1"] {
            assert!(Price::parse(input).is_ok(), "expected {input:?} to parse");
        }
    }

    #[test]
    fn test_rejects_blank_input() {
        assert_eq!(Price::parse(""), Err(PriceError::Missing));
        assert_eq!(Price::parse("   "), Err(PriceError::Missing));
    }

    #[test]
    fn test_rejects_non_numeric_input() {
        for input in ["abc", "12abc", "1,5", "$5", "NaN", "Infinity", "--1"] {
            assert_eq!(
                Price::parse(input),
                Err(PriceError::NotANumber),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        for input in ["0", "0.00", "-0", "-1", "-19.99"] {
            assert_eq!(
                Price::parse(input),
                Err(PriceError::NotPositive),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_scientific_notation_value() {
        assert_eq!(Price::parse("1.5e1").unwrap().amount(), Decimal::new(15, 0));
    }

    #[test]
    fn test_display() {
        let price = Price::parse("19.9").unwrap();
        assert_eq!(price.display_amount(), "19.90");
        assert_eq!(price.to_string(), "$19.90");
    }

    #[test]
    fn test_wire_format_is_a_json_number() {
        let price = Price::parse("19.99").unwrap();
        assert_eq!(serde_json::to_value(price).unwrap(), serde_json::json!(19.99));

        let parsed: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(parsed, price);
    }

    #[test]
    fn test_server_prices_are_not_revalidated() {
        let parsed: Price = serde_json::from_str("0").unwrap();
        assert_eq!(parsed.amount(), Decimal::ZERO);
    }
}
