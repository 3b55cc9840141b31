//! Read-only queries behind the reports.

use crate::db::ledger::to_quantity;
use crate::db::Db;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Amount, Commodity};
use crate::report::{DailySales, DaySales, SalesLine, UnsoldInventory};
use crate::Result;
use anyhow::Context;
use std::collections::BTreeMap;

impl Db {
    /// Every tracked commodity with its stock on hand, in the order they were first stocked.
    pub(crate) async fn unsold_inventory(&self) -> Result<UnsoldInventory> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT name, quantity FROM commodities ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .context("Failed to list commodities")
                .pub_result(ErrorType::Database)?;

        let commodities = rows
            .into_iter()
            .map(|(name, quantity)| {
                Ok(Commodity {
                    name,
                    quantity: to_quantity(quantity)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(UnsoldInventory::from(commodities))
    }

    /// Sales grouped by date, most recent first, and within a date by commodity name. Only events
    /// with `quantity_sold > 0` are counted; a date that only has price annotations is kept with
    /// no lines.
    pub(crate) async fn daily_sales_summary(&self) -> Result<DailySales> {
        let events = self.sale_events().await?;

        let mut by_date: BTreeMap<_, BTreeMap<String, (u64, Amount)>> = BTreeMap::new();
        for event in events {
            let lines = by_date.entry(event.date).or_default();
            if !event.is_sale() {
                continue;
            }
            let (sold, total) = lines.entry(event.name).or_default();
            *sold += u64::from(event.quantity_sold);
            *total = total.checked_add(event.total_price).ok_or_else(|| {
                Error::msg(
                    ErrorType::Database,
                    format!("The sales total on {} is too large to add up", event.date),
                )
            })?;
        }

        let days = by_date
            .into_iter()
            .rev()
            .map(|(date, lines)| DaySales {
                date,
                lines: lines
                    .into_iter()
                    .map(|(name, (quantity_sold, total_price))| SalesLine {
                        name,
                        quantity_sold,
                        total_price,
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        Ok(DailySales::from(days))
    }
}
