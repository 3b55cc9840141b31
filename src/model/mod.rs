//! Types that represent the core data model: the `Commodity` balances and the `SaleEvent` log.
mod amount;
mod input;

pub use amount::{Amount, AmountError};
pub use input::{
    parse_name, parse_optional_price, parse_price, parse_quantity, InvalidInput, MAX_PRICE,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The format of the `date` column in the `sales` table.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// A named stock item and the quantity currently on hand.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Commodity {
    /// Unique, case-sensitive name.
    pub name: String,
    /// Stock on hand. Never negative.
    pub quantity: u64,
}

/// One row of the sales log: either a real sale or a price annotation recorded with an intake.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SaleEvent {
    pub name: String,
    /// Zero for a price annotation.
    pub quantity_sold: u32,
    pub price_per_unit: Amount,
    /// `quantity_sold * price_per_unit` for sales, zero for annotations.
    pub total_price: Amount,
    pub date: NaiveDate,
}

impl SaleEvent {
    /// A sale of `quantity` units at `price` each. `None` if the total does not fit in an
    /// `Amount`.
    pub fn sale(
        name: impl Into<String>,
        quantity: u32,
        price: Amount,
        date: NaiveDate,
    ) -> Option<Self> {
        Some(Self {
            name: name.into(),
            quantity_sold: quantity,
            price_per_unit: price,
            total_price: price.checked_times(quantity)?,
            date,
        })
    }

    /// A price annotation recorded alongside an intake.
    pub fn intake_price(name: impl Into<String>, price: Amount, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            quantity_sold: 0,
            price_per_unit: price,
            total_price: Amount::ZERO,
            date,
        }
    }

    /// Only events that moved stock count towards sales figures.
    pub fn is_sale(&self) -> bool {
        self.quantity_sold > 0
    }
}

/// The result of a successful intake.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Intake {
    pub name: String,
    pub added: u32,
    /// Stock on hand after the intake.
    pub quantity: u64,
    /// The price annotation that was logged, if any.
    pub price: Option<Amount>,
}

/// What the ledger knows about one commodity.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CommodityStatus {
    pub name: String,
    /// `None` if the commodity has never been stocked.
    pub in_stock: Option<u64>,
    /// Sum of `quantity_sold` over real sales of this name.
    pub total_sold: u64,
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    use anyhow::Context;
    NaiveDate::parse_from_str(s, DATE_FORMAT).with_context(|| format!("Invalid sale date '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    #[test]
    fn test_sale_total() {
        let event = SaleEvent::sale("Rice", 3, Amount::from_str("25.0").unwrap(), day()).unwrap();
        assert_eq!(event.total_price, Amount::from_str("75").unwrap());
        assert!(event.is_sale());
    }

    #[test]
    fn test_sale_total_overflow() {
        let price = Amount::from_str("79228162514264337593543950335").unwrap();
        assert_eq!(SaleEvent::sale("Gold", 2, price, day()), None);
    }

    #[test]
    fn test_intake_price_is_not_a_sale() {
        let event = SaleEvent::intake_price("Rice", Amount::from_str("20.0").unwrap(), day());
        assert_eq!(event.quantity_sold, 0);
        assert!(event.total_price.is_zero());
        assert!(!event.is_sale());
    }

    #[test]
    fn test_date_format() {
        assert_eq!(format_date(day()), "2025-03-09");
        assert_eq!(parse_date("2025-03-09").unwrap(), day());
        assert!(parse_date("09/03/2025").is_err());
    }
}
