//! Ledger mutations and lookups: stock intake, sales, commodity queries and clearing a day of
//! sales. Each mutation runs in a single SQLite transaction so a failure leaves nothing behind.

use crate::db::Db;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{format_date, parse_date, Amount, CommodityStatus, Intake, SaleEvent};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

impl Db {
    /// Adds `quantity` units of `name`, creating the commodity if it is new. When `price` is given
    /// a price annotation (`quantity_sold = 0`, `total_price = 0`) is appended to the sales log in
    /// the same transaction.
    pub(crate) async fn add_stock(
        &self,
        name: &str,
        quantity: u32,
        price: Option<Amount>,
        date: NaiveDate,
    ) -> Result<Intake> {
        let mut tx = self.begin().await?;

        if let Some(price) = price {
            insert_event(&mut tx, &SaleEvent::intake_price(name, price, date)).await?;
        }

        let existing = stock_on_hand(&mut tx, name).await?;
        let new_quantity = match existing {
            Some(on_hand) => {
                sqlx::query("UPDATE commodities SET quantity = quantity + ? WHERE name = ?")
                    .bind(i64::from(quantity))
                    .bind(name)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to increase commodity quantity")
                    .pub_result(ErrorType::Database)?;
                on_hand + u64::from(quantity)
            }
            None => {
                sqlx::query("INSERT INTO commodities (name, quantity) VALUES (?, ?)")
                    .bind(name)
                    .bind(i64::from(quantity))
                    .execute(&mut *tx)
                    .await
                    .context("Failed to insert commodity")
                    .pub_result(ErrorType::Database)?;
                u64::from(quantity)
            }
        };

        commit(tx).await?;
        debug!("Stock of '{name}' is now {new_quantity}");
        Ok(Intake {
            name: name.to_string(),
            added: quantity,
            quantity: new_quantity,
            price,
        })
    }

    /// Sells `quantity` units of `name` at `price` each. The stock check, the decrement and the
    /// sale event all happen in one transaction.
    ///
    /// # Errors
    /// - `InvalidInput` if `quantity * price` is too large to represent.
    /// - `InsufficientStock` if the commodity does not exist or has fewer than `quantity` units.
    pub(crate) async fn sell_stock(
        &self,
        name: &str,
        quantity: u32,
        price: Amount,
        date: NaiveDate,
    ) -> Result<SaleEvent> {
        let event = SaleEvent::sale(name, quantity, price, date).ok_or_else(|| {
            Error::msg(
                ErrorType::InvalidInput,
                format!("The total for {quantity} of '{name}' at {price} each is too large"),
            )
        })?;

        let mut tx = self.begin().await?;

        let on_hand = match stock_on_hand(&mut tx, name).await? {
            Some(on_hand) => on_hand,
            None => {
                return Err(Error::msg(
                    ErrorType::InsufficientStock,
                    format!("Not enough stock or item not found: '{name}' is not in inventory"),
                ))
            }
        };
        if on_hand < u64::from(quantity) {
            return Err(Error::msg(
                ErrorType::InsufficientStock,
                format!(
                    "Not enough stock or item not found: {on_hand} of '{name}' on hand, \
                    {quantity} requested"
                ),
            ));
        }

        sqlx::query("UPDATE commodities SET quantity = quantity - ? WHERE name = ?")
            .bind(i64::from(quantity))
            .bind(name)
            .execute(&mut *tx)
            .await
            .context("Failed to decrease commodity quantity")
            .pub_result(ErrorType::Database)?;

        insert_event(&mut tx, &event).await?;

        commit(tx).await?;
        debug!(
            "Sold {quantity} of '{name}', {} left",
            on_hand - u64::from(quantity)
        );
        Ok(event)
    }

    /// Returns the stock on hand of `name` and how many units of it have been sold in total.
    pub(crate) async fn query_commodity(&self, name: &str) -> Result<CommodityStatus> {
        let in_stock: Option<(i64,)> =
            sqlx::query_as("SELECT quantity FROM commodities WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to query commodity")
                .pub_result(ErrorType::Database)?;

        let (total_sold,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(quantity_sold), 0) FROM sales \
            WHERE name = ? AND quantity_sold > 0",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum quantity sold")
        .pub_result(ErrorType::Database)?;

        Ok(CommodityStatus {
            name: name.to_string(),
            in_stock: in_stock.map(|(q,)| to_quantity(q)).transpose()?,
            total_sold: to_quantity(total_sold)?,
        })
    }

    /// The most recent date in the sales log, counting price annotations.
    pub(crate) async fn latest_sales_date(&self) -> Result<Option<NaiveDate>> {
        let (date,): (Option<String>,) = sqlx::query_as("SELECT MAX(date) FROM sales")
            .fetch_one(&self.pool)
            .await
            .context("Failed to query the latest sales date")
            .pub_result(ErrorType::Database)?;
        date.map(|d| parse_date(&d))
            .transpose()
            .pub_result(ErrorType::Database)
    }

    /// Deletes every sales log row for the most recent date and returns that date, or `None` if
    /// the log is empty. Commodity quantities are left as they are.
    pub(crate) async fn clear_latest_sales(&self) -> Result<Option<(NaiveDate, u64)>> {
        let mut tx = self.begin().await?;

        let (latest,): (Option<String>,) = sqlx::query_as("SELECT MAX(date) FROM sales")
            .fetch_one(&mut *tx)
            .await
            .context("Failed to query the latest sales date")
            .pub_result(ErrorType::Database)?;
        let latest = match latest {
            Some(latest) => latest,
            None => return Ok(None),
        };

        let deleted = sqlx::query("DELETE FROM sales WHERE date = ?")
            .bind(&latest)
            .execute(&mut *tx)
            .await
            .context("Failed to delete sales")
            .pub_result(ErrorType::Database)?
            .rows_affected();

        commit(tx).await?;
        let date = parse_date(&latest).pub_result(ErrorType::Database)?;
        debug!("Deleted {deleted} sales rows dated {latest}");
        Ok(Some((date, deleted)))
    }

    /// Every row of the sales log in insertion order.
    pub(crate) async fn sale_events(&self) -> Result<Vec<SaleEvent>> {
        let rows: Vec<(String, i64, f64, f64, String)> = sqlx::query_as(
            "SELECT name, quantity_sold, price_per_unit, total_price, date FROM sales ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to read the sales log")
        .pub_result(ErrorType::Database)?;

        rows.into_iter()
            .map(|(name, quantity_sold, price, total, date)| {
                Ok(SaleEvent {
                    name,
                    quantity_sold: u32::try_from(quantity_sold)
                        .context("Invalid quantity_sold in the sales log")
                        .pub_result(ErrorType::Database)?,
                    price_per_unit: Amount::from_f64(price)
                        .context("Invalid price_per_unit in the sales log")
                        .pub_result(ErrorType::Database)?,
                    total_price: Amount::from_f64(total)
                        .context("Invalid total_price in the sales log")
                        .pub_result(ErrorType::Database)?,
                    date: parse_date(&date).pub_result(ErrorType::Database)?,
                })
            })
            .collect()
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .context("Failed to begin transaction")
            .pub_result(ErrorType::Database)
    }
}

async fn stock_on_hand(tx: &mut Transaction<'static, Sqlite>, name: &str) -> Result<Option<u64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT quantity FROM commodities WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to query commodity")
        .pub_result(ErrorType::Database)?;
    row.map(|(q,)| to_quantity(q)).transpose()
}

async fn insert_event(tx: &mut Transaction<'static, Sqlite>, event: &SaleEvent) -> Result<()> {
    sqlx::query(
        "INSERT INTO sales (name, quantity_sold, price_per_unit, total_price, date) \
        VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&event.name)
    .bind(i64::from(event.quantity_sold))
    .bind(event.price_per_unit.to_f64())
    .bind(event.total_price.to_f64())
    .bind(format_date(event.date))
    .execute(&mut **tx)
    .await
    .context("Failed to insert into the sales log")
    .pub_result(ErrorType::Database)?;
    Ok(())
}

async fn commit(tx: Transaction<'static, Sqlite>) -> Result<()> {
    tx.commit()
        .await
        .context("Failed to commit transaction")
        .pub_result(ErrorType::Database)
}

pub(super) fn to_quantity(value: i64) -> Result<u64> {
    u64::try_from(value)
        .with_context(|| format!("Negative quantity {value} found in the database"))
        .pub_result(ErrorType::Database)
}
