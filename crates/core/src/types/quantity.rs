//! Strictly positive line quantity.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative.
    #[error("Quantity must be greater than zero")]
    NotPositive,
    /// Larger than a cart line can hold.
    #[error("Quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
    },
}

/// Number of units on a cart line. Never zero.
///
/// Clients send quantities as signed JSON integers; [`Quantity::new`] is the
/// single place where "zero or negative" is rejected.
///
/// ```
/// use shoppy_globe_core::Quantity;
///
/// assert_eq!(Quantity::new(3).unwrap().get(), 3);
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(-2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Largest quantity a single line may carry (fits a Postgres `INTEGER`).
    pub const MAX: u32 = 2_147_483_647;

    /// Validate a client-supplied quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` for `n <= 0` and
    /// `QuantityError::TooLarge` above [`Quantity::MAX`].
    pub fn new(n: i64) -> Result<Self, QuantityError> {
        if n <= 0 {
            return Err(QuantityError::NotPositive);
        }
        u32::try_from(n)
            .ok()
            .filter(|q| *q <= Self::MAX)
            .map(Self)
            .ok_or(QuantityError::TooLarge { max: Self::MAX })
    }

    /// The unit count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add two quantities, `None` on overflow past [`Quantity::MAX`].
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0
            .checked_add(other.0)
            .filter(|q| *q <= Self::MAX)
            .map(Self)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = i64::deserialize(deserializer)?;
        Self::new(n).map_err(serde::de::Error::custom)
    }
}
