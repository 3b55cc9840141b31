//! Amount type for handling non-negative money values such as unit prices and sale totals.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Negative values are rejected
//! since neither a price nor a total can go below zero in the ledger. Arithmetic is checked: an
//! overflow is returned as `None` rather than panicking.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a money amount that is zero or greater.
///
/// Amounts are stored in SQLite as `REAL`, but all arithmetic in the program happens on the
/// `Decimal` value so that sums over many sales stay exact.
///
/// # Examples
///
/// ```
/// # use shop_ledger::Amount;
/// # use std::str::FromStr;
/// let price = Amount::from_str("1250.5").unwrap();
/// assert_eq!(price.checked_times(3).unwrap().to_string(), "3,751.50");
/// ```
///
/// Commas are only used for display. A decimal comma is not a number:
/// ```
/// # use shop_ledger::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("2,5").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates an `Amount`, returning `None` if `value` is negative.
    pub fn new(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The total for `quantity` units at this amount each, or `None` on overflow.
    pub fn checked_times(&self, quantity: u32) -> Option<Amount> {
        self.0.checked_mul(Decimal::from(quantity)).map(Amount)
    }

    /// `self + rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Converts to `f64` for storage in a SQLite `REAL` column.
    pub(crate) fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Converts a value read from a SQLite `REAL` column.
    ///
    /// # Errors
    /// - If `value` is NaN, infinite, too large for a `Decimal` or negative.
    pub(crate) fn from_f64(value: f64) -> anyhow::Result<Amount> {
        let decimal = Decimal::from_f64(value)
            .ok_or_else(|| anyhow::anyhow!("{value} cannot be represented as an amount"))?;
        Amount::new(decimal).ok_or_else(|| anyhow::anyhow!("{value} is a negative amount"))
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    /// The string is not a decimal number.
    Parse(rust_decimal::Error),
    /// The string is a number below zero.
    Negative(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Parse(e) => Debug::fmt(e, f),
            AmountError::Negative(d) => write!(f, "Negative({d})"),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Parse(e) => Display::fmt(e, f),
            AmountError::Negative(d) => write!(f, "{d} is negative"),
        }
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Parse(e) => Some(e),
            AmountError::Negative(_) => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(AmountError::Parse)?;
        Amount::new(value).ok_or(AmountError::Negative(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            format_num::format_num!(",.2", self.0.round_dp(2).to_f64().unwrap_or_default())
        )
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
