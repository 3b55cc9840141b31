//! Report command handlers: the two report blocks, the share link and clearing a day of sales.

use crate::args::ClearArgs;
use crate::commands::{refresh, with_refreshed_report, Out};
use crate::error::{Error, ErrorType, IntoResult};
use crate::report::{DailySales, ShopReport, UnsoldInventory};
use crate::{Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Lists every commodity and its stock on hand.
pub async fn unsold(config: Config) -> Result<Out<UnsoldInventory>> {
    let inventory = config.db().unsold_inventory().await?;
    let count = inventory.len();
    let message = format!(
        "{} commodit{} tracked",
        count,
        if count == 1 { "y" } else { "ies" }
    );
    let text = inventory.to_string();
    Ok(Out::new(message, inventory).with_text(text))
}

/// Summarises sales per commodity for each date in the sales log, most recent first.
pub async fn progress(config: Config) -> Result<Out<DailySales>> {
    let daily = config.db().daily_sales_summary().await?;
    let days = daily.iter().count();
    let message = format!("Sales on {} day{}", days, if days == 1 { "" } else { "s" });
    let text = daily.to_string();
    Ok(Out::new(message, daily).with_text(text))
}

/// Both report blocks together.
pub async fn report(config: Config) -> Result<Out<ShopReport>> {
    let report = refresh(&config).await?;
    let text = report.to_string();
    Ok(Out::new(format!("{} report", report.shop_name), report).with_text(text))
}

/// Builds the link that opens a WhatsApp chat with the combined report pre-filled. Nothing is
/// sent: the link is printed for the user to open.
pub async fn share(config: Config) -> Result<Out<String>> {
    let report = refresh(&config).await?;
    let url = report.share_url()?.to_string();
    debug!("Share message:\n{}", report.share_message());
    Ok(Out::new("Open this link to send the report", url.clone()).with_text(url))
}

/// The outcome of clearing the most recent report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Cleared {
    /// The date whose sales log rows were deleted.
    pub date: NaiveDate,
    /// How many rows were deleted, price annotations included.
    pub rows_deleted: u64,
    /// The copy of the database taken before deleting.
    pub backup: PathBuf,
}

/// Deletes every sales log row dated on the most recent date in the log, after checking the
/// passphrase and taking a backup of the database. Commodity stock is not restored.
///
/// # Errors
///
/// - `AccessDenied` if the passphrase does not match. Nothing is changed.
/// - `NoData` if the sales log is empty.
pub async fn clear_report(config: Config, args: ClearArgs) -> Result<Out<Cleared>> {
    if !config.passphrase_matches(args.passphrase()) {
        return Err(Error::msg(
            ErrorType::AccessDenied,
            "Incorrect password. Cannot clear report.",
        ));
    }

    let db = config.db();
    if db.latest_sales_date().await?.is_none() {
        return Err(no_reports());
    }

    let backup = config
        .backup()
        .copy_sqlite()
        .await
        .context("Unable to back up the database before clearing the report")
        .pub_result(ErrorType::Filesystem)?;
    info!("Saved database backup to {}", backup.display());

    let (date, rows_deleted) = db.clear_latest_sales().await?.ok_or_else(no_reports)?;

    let message = format!("Cleared sales report for {}.", date.format("%Y-%m-%d"));
    let cleared = Cleared {
        date,
        rows_deleted,
        backup,
    };
    Ok(with_refreshed_report(&config, Out::new(message, cleared)).await)
}

fn no_reports() -> Error {
    Error::msg(ErrorType::NoData, "No reports found to clear.")
}
