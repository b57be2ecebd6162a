//! Non-negative decimal price.
//!
//! Prices are kept in the store's single currency; amounts use decimal
//! arithmetic so line totals never pick up floating point error. Stored
//! prices fit `NUMERIC(12, 2)`: at most two decimal places, below 10^10.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("Price cannot be negative")]
    Negative,

    #[error("Price can have at most {} decimal places", Price::SCALE)]
    TooPrecise,

    #[error("Price must be less than 10000000000")]
    TooLarge,
}

/// A price in the store currency.
///
/// Serialized as a decimal string (`"19.99"`) to avoid float round-off in
/// JSON clients; deserialization accepts either a string or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Maximum decimal places.
    pub const SCALE: u32 = 2;

    /// Exclusive upper bound (ten integer digits).
    const LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

    /// Create a price.
    ///
    /// Trailing zeros do not count towards the scale, so `12.500` is `12.5`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount < 0`, `TooPrecise` for more
    /// than two decimal places, or `TooLarge` if `amount >= 10^10`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount < Decimal::ZERO {
            return Err(PriceError::Negative);
        }
        let amount = amount.normalize();
        if amount.scale() > Self::SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount >= Self::LIMIT {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units. Saturates instead of overflowing.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// Sum of two prices. Saturates instead of overflowing.
    #[must_use]
    pub fn plus(&self, other: Self) -> Self {
        Self(self.0.checked_add(other.0).unwrap_or(Decimal::MAX))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = match RawAmount::deserialize(deserializer)? {
            RawAmount::Integer(n) => Decimal::from(n),
            // Via the shortest round-trip text so `19.99` stays `19.99`.
            RawAmount::Float(f) => f.to_string().parse().map_err(serde::de::Error::custom)?,
            RawAmount::Text(s) => s.trim().parse().map_err(serde::de::Error::custom)?,
        };
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
