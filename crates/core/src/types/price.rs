//! Type-safe price representation using decimal arithmetic.
//!
//! The `clothes.price` column is a Postgres `numeric`, which PostgREST returns
//! as a bare JSON number. Amounts are parsed from their textual form so that
//! `199.9` stays exactly `199.9` instead of passing through `f64`.

use core::fmt;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`Price`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is not a decimal number.
    #[error("invalid price amount: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Chinese yuan; the catalog is priced in CNY.
    #[default]
    CNY,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::CNY => "¥",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (yuan, not fen).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A price in the default catalog currency.
    #[must_use]
    pub fn cny(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::CNY)
    }

    /// Zero in the default catalog currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(Decimal::ZERO, CurrencyCode::CNY)
    }

    /// Parse a non-negative amount in the default catalog currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] for non-numeric input and
    /// [`PriceError::Negative`] for amounts below zero.
    pub fn parse(amount: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| PriceError::Invalid(amount.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self::cny(amount))
    }

    /// The line price for `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Format for display with two decimal places, e.g. `¥199.00`.
    ///
    /// Half-cent amounts round away from zero.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{}{:.2}", self.currency_code.symbol(), rounded)
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Deserialize a `numeric` column (JSON number or string) into a CNY [`Price`].
///
/// Use with `#[serde(deserialize_with = "stylefinder_core::price::deserialize_amount")]`.
///
/// # Errors
///
/// Fails when the value is neither a number nor a numeric string.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let text = match raw {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => return Ok(Price::zero()),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected numeric price, got {other}"
            )));
        }
    };
    Price::parse(&text).map_err(serde::de::Error::custom)
}

/// Serialize a [`Price`] as its bare amount, matching the `numeric` column.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize_amount<S>(price: &Price, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&price.amount.normalize().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "deserialize_amount")]
        price: Price,
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::parse("199").unwrap().display(), "¥199.00");
        assert_eq!(Price::parse("59.9").unwrap().display(), "¥59.90");
        assert_eq!(Price::zero().to_string(), "¥0.00");
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::parse("19.999").unwrap().display(), "¥20.00");
        assert_eq!(Price::parse("0.125").unwrap().display(), "¥0.13");
        assert_eq!(Price::parse("10.994").unwrap().display(), "¥10.99");
    }

    #[test]
    fn test_times_and_add() {
        let unit = Price::parse("59.9").unwrap();
        let total = unit.times(3) + Price::parse("0.3").unwrap();
        assert_eq!(total.display(), "¥180.00");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
    }

    #[test]
    fn test_deserialize_number_keeps_exact_decimal() {
        let row: Row = serde_json::from_str(r#"{"price": 199.9}"#).unwrap();
        assert_eq!(row.price.amount, Decimal::from_str("199.9").unwrap());
    }

    #[test]
    fn test_deserialize_string_and_null() {
        let row: Row = serde_json::from_str(r#"{"price": "88.00"}"#).unwrap();
        assert_eq!(row.price.display(), "¥88.00");
        let row: Row = serde_json::from_str(r#"{"price": null}"#).unwrap();
        assert_eq!(row.price, Price::zero());
    }

    #[test]
    fn test_deserialize_rejects_objects() {
        assert!(serde_json::from_str::<Row>(r#"{"price": {"amount": 1}}"#).is_err());
    }
}
