//! Validation of the raw strings a user types for a commodity name, quantity or price.
//!
//! Each function returns the parsed value or an `InvalidInput` reason. Nothing reaches the
//! ledger until its inputs have been through here.

use crate::error::{Error, ErrorType};
use crate::model::Amount;
use rust_decimal::Decimal;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::warn;

/// Why a piece of user input was rejected.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InvalidInput {
    /// The commodity name was empty or only whitespace.
    EmptyName,
    /// The quantity was not a whole number of zero or more.
    BadQuantity(String),
    /// The price was not a decimal number from zero to `MAX_PRICE`.
    BadPrice(String),
}

impl Display for InvalidInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidInput::EmptyName => write!(f, "A commodity name is required"),
            InvalidInput::BadQuantity(s) => {
                write!(f, "Quantity '{s}' is not a whole number of zero or more")
            }
            InvalidInput::BadPrice(s) => {
                write!(f, "Price '{s}' is not a number from 0 to {MAX_PRICE}")
            }
        }
    }
}

impl std::error::Error for InvalidInput {}

impl From<InvalidInput> for Error {
    fn from(value: InvalidInput) -> Self {
        Error::new(ErrorType::InvalidInput, value)
    }
}

/// The name is kept exactly as typed, so `" Rice"` and `"Rice"` are different commodities. A name
/// that is empty or only whitespace is rejected.
pub fn parse_name(s: &str) -> Result<String, InvalidInput> {
    if s.trim().is_empty() {
        return Err(InvalidInput::EmptyName);
    }
    Ok(s.to_string())
}

/// Accepts only ASCII digits, so signs, decimals and exponents are all rejected.
pub fn parse_quantity(s: &str) -> Result<u32, InvalidInput> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidInput::BadQuantity(s.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| InvalidInput::BadQuantity(s.to_string()))
}

/// The largest accepted unit price. Any whole-number quantity times this still fits in an
/// `Amount`, as does the sum of many such sales.
pub const MAX_PRICE: u64 = 1_000_000_000_000;

pub fn parse_price(s: &str) -> Result<Amount, InvalidInput> {
    let price = Amount::from_str(s).map_err(|_| InvalidInput::BadPrice(s.to_string()))?;
    if price.value() > Decimal::from(MAX_PRICE) {
        return Err(InvalidInput::BadPrice(s.to_string()));
    }
    Ok(price)
}

/// The intake price is optional. An absent or blank price is `None`, and so is a price that does
/// not parse: the intake goes ahead without a price annotation.
pub fn parse_optional_price(s: Option<&str>) -> Option<Amount> {
    let s = s?;
    if s.trim().is_empty() {
        return None;
    }
    match parse_price(s) {
        Ok(price) => Some(price),
        Err(e) => {
            warn!("{e}; the intake will be recorded without a price");
            None
        }
    }
}
