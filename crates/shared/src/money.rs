//! Currency amounts held as integer cents.
//!
//! The backend speaks plain JSON numbers in major units (`10.5` for R$ 10,50);
//! conversion happens only at the serde boundary and when parsing form input.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,
    #[error("{0:?} is not a valid amount")]
    Invalid(String),
}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Rounds a major-unit value to the nearest cent. Non-finite or
    /// out-of-range values yield `None`.
    pub fn from_major(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Parses user-typed amounts. Accepts a comma as the decimal separator
    /// (`"10,50"`), surrounding whitespace, and rounds past two decimals.
    pub fn parse_amount(input: &str) -> Result<Self, MoneyParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let normalized = trimmed.replacen(',', ".", 1);
        normalized
            .parse::<f64>()
            .ok()
            .and_then(Money::from_major)
            .ok_or_else(|| MoneyParseError::Invalid(trimmed.to_string()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "R$ {sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
    }
}

struct MoneyVisitor;

impl<'de> de::Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a currency amount as a number, numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Money, E> {
        value
            .checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {value} is out of range")))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Money, E> {
        i64::try_from(value)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Money)
            .ok_or_else(|| E::custom(format!("amount {value} is out of range")))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Money, E> {
        Money::from_major(value).ok_or_else(|| E::custom(format!("amount {value} is not finite")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Money, E> {
        Money::parse_amount(value).map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Money, E> {
        Ok(Money::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}
