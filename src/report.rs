//! Text views derived from the ledger: the unsold inventory listing, the daily sales summary and
//! the combined message handed to a messaging app.

use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Commodity};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use url::Url;

/// Base of the pre-filled share link. The report text goes in the `text` query parameter.
pub const SHARE_BASE_URL: &str = "https://wa.me/";

/// Current stock of every tracked commodity.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsoldInventory {
    /// Nothing has ever been stocked.
    NoCommodities,
    /// Tracked commodities in the order they were first stocked.
    Commodities(Vec<Commodity>),
}

impl UnsoldInventory {
    pub fn iter(&self) -> impl Iterator<Item = &Commodity> {
        let commodities: &[Commodity] = match self {
            UnsoldInventory::NoCommodities => &[],
            UnsoldInventory::Commodities(c) => c,
        };
        commodities.iter()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, UnsoldInventory::NoCommodities)
    }
}

impl From<Vec<Commodity>> for UnsoldInventory {
    fn from(value: Vec<Commodity>) -> Self {
        if value.is_empty() {
            UnsoldInventory::NoCommodities
        } else {
            UnsoldInventory::Commodities(value)
        }
    }
}

impl Display for UnsoldInventory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnsoldInventory::NoCommodities => writeln!(f, "No commodities in stock."),
            UnsoldInventory::Commodities(commodities) => {
                writeln!(f, "Name\tQuantity")?;
                for c in commodities {
                    writeln!(f, "{}\t{}", c.name, c.quantity)?;
                }
                Ok(())
            }
        }
    }
}

/// Sales of one commodity on one date.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SalesLine {
    pub name: String,
    pub quantity_sold: u64,
    pub total_price: Amount,
}

/// All sales on one date, one line per commodity ordered by name.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DaySales {
    pub date: NaiveDate,
    /// Empty when the date only has price annotations.
    pub lines: Vec<SalesLine>,
}

impl DaySales {
    /// The sum of every line's total, or `None` if it overflows.
    pub fn total(&self) -> Option<Amount> {
        self.lines
            .iter()
            .try_fold(Amount::ZERO, |acc, l| acc.checked_add(l.total_price))
    }
}

/// The sales log summarised per date, most recent date first.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailySales {
    NoSales,
    Days(Vec<DaySales>),
}

impl DailySales {
    pub fn iter(&self) -> impl Iterator<Item = &DaySales> {
        let days: &[DaySales] = match self {
            DailySales::NoSales => &[],
            DailySales::Days(d) => d,
        };
        days.iter()
    }
}

impl From<Vec<DaySales>> for DailySales {
    fn from(value: Vec<DaySales>) -> Self {
        if value.is_empty() {
            DailySales::NoSales
        } else {
            DailySales::Days(value)
        }
    }
}

impl Display for DailySales {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let days = match self {
            DailySales::NoSales => return writeln!(f, "No sales data available."),
            DailySales::Days(days) => days,
        };
        for (i, day) in days.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "Progress for {}", day.date.format("%Y-%m-%d"))?;
            writeln!(f, "Item\tSold\tTotal")?;
            for line in &day.lines {
                writeln!(
                    f,
                    "{}\t{}\t{}",
                    line.name, line.quantity_sold, line.total_price
                )?;
            }
        }
        Ok(())
    }
}

/// Both report blocks, as refreshed after every change to the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ShopReport {
    pub shop_name: String,
    pub unsold: UnsoldInventory,
    pub daily: DailySales,
}

impl ShopReport {
    /// The message handed to the messaging app.
    pub fn share_message(&self) -> String {
        format!(
            "📋 {} Report\n\nUnsold Commodities:\n{}\n\nDaily Sales Progress:\n{}",
            self.shop_name,
            self.unsold.to_string().trim(),
            self.daily.to_string().trim()
        )
    }

    /// A link that opens the messaging app with `share_message` pre-filled.
    pub fn share_url(&self) -> Result<Url> {
        let mut url = Url::parse(SHARE_BASE_URL)
            .with_context(|| format!("Unable to parse share URL '{SHARE_BASE_URL}'"))
            .pub_result(ErrorType::Config)?;
        url.query_pairs_mut()
            .append_pair("text", &self.share_message());
        Ok(url)
    }
}

impl Display for ShopReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Unsold Commodities:")?;
        write!(f, "{}", self.unsold)?;
        writeln!(f)?;
        writeln!(f, "Daily Progress:")?;
        write!(f, "{}", self.daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn sample() -> ShopReport {
        ShopReport {
            shop_name: "M & B Shop".to_string(),
            unsold: UnsoldInventory::from(vec![
                Commodity {
                    name: "Rice".to_string(),
                    quantity: 12,
                },
                Commodity {
                    name: "Beans".to_string(),
                    quantity: 0,
                },
            ]),
            daily: DailySales::from(vec![
                DaySales {
                    date: date(2),
                    lines: vec![SalesLine {
                        name: "Rice".to_string(),
                        quantity_sold: 3,
                        total_price: amount("75"),
                    }],
                },
                DaySales {
                    date: date(1),
                    lines: vec![],
                },
            ]),
        }
    }

    #[test]
    fn test_unsold_text() {
        assert_eq!(
            sample().unsold.to_string(),
            "Name\tQuantity\nRice\t12\nBeans\t0\n"
        );
        assert_eq!(
            UnsoldInventory::from(vec![]).to_string(),
            "No commodities in stock.\n"
        );
    }

    #[test]
    fn test_unsold_len() {
        assert_eq!(sample().unsold.len(), 2);
        assert!(!sample().unsold.is_empty());
        assert!(UnsoldInventory::NoCommodities.is_empty());
        assert_eq!(UnsoldInventory::NoCommodities.len(), 0);
    }

    #[test]
    fn test_daily_text() {
        assert_eq!(
            sample().daily.to_string(),
            "Progress for 2025-06-02\nItem\tSold\tTotal\nRice\t3\t75.00\n\n\
            Progress for 2025-06-01\nItem\tSold\tTotal\n"
        );
        assert_eq!(
            DailySales::from(vec![]).to_string(),
            "No sales data available.\n"
        );
    }

    #[test]
    fn test_day_total() {
        let day = DaySales {
            date: date(3),
            lines: vec![
                SalesLine {
                    name: "A".to_string(),
                    quantity_sold: 1,
                    total_price: amount("1.10"),
                },
                SalesLine {
                    name: "B".to_string(),
                    quantity_sold: 2,
                    total_price: amount("2.20"),
                },
            ],
        };
        assert_eq!(day.total(), Some(amount("3.3")));
    }

    #[test]
    fn test_share_message() {
        let message = sample().share_message();
        assert!(message.starts_with("📋 M & B Shop Report\n\nUnsold Commodities:\nName\tQuantity"));
        assert!(message.contains("\n\nDaily Sales Progress:\nProgress for 2025-06-02"));
        assert!(!message.ends_with('\n'));
    }

    #[test]
    fn test_share_url_round_trips_message() {
        let report = sample();
        let url = report.share_url().unwrap();
        assert_eq!(url.host_str(), Some("wa.me"));
        let text = url
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(text, report.share_message());
        assert!(url.as_str().starts_with("https://wa.me/?text="));
        assert!(!url.as_str().contains(' '));
        assert!(!url.as_str().contains('&'));
    }
}
