//! Command handlers for the shop CLI.
//!
//! This module contains implementations for all CLI subcommands. Every handler returns an `Out`
//! so the outcome can be printed consistently.

mod init;
mod report;
mod stock;

use crate::error::{ErrorType, IntoResult};
use crate::report::ShopReport;
use crate::{Config, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info, warn};

pub use init::init;
pub use report::{clear_report, progress, report, share, unsold, Cleared};
pub use stock::{add_stock, search, sell_stock};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data and rendered report text.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// Report text meant for stdout.
    text: Option<String>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            text: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            text: None,
        }
    }

    /// Attach text to be written to stdout.
    pub fn with_text<S>(mut self, text: S) -> Self
    where
        S: Into<String>,
    {
        self.text = Some(text.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Get the report text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Print the message to `info!`, the structured data (if it exists) as JSON to `debug!` and
    /// the text (if it exists) to stdout.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
        if let Some(text) = self.text() {
            println!("{}", text.trim_end());
        }
    }
}

/// Loads the configuration and opens the ledger in `shop_home`. Every command other than `init`
/// starts here.
pub async fn load_config(shop_home: &Path) -> Result<Config> {
    Config::load(shop_home).await.pub_result(ErrorType::Config)
}

/// The local calendar date, which is the date recorded on every sales log row.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Re-reads both reports.
pub(crate) async fn refresh(config: &Config) -> Result<ShopReport> {
    let db = config.db();
    Ok(ShopReport {
        shop_name: config.shop_name().to_string(),
        unsold: db.unsold_inventory().await?,
        daily: db.daily_sales_summary().await?,
    })
}

/// Attaches the refreshed reports to the outcome of a committed change. The change is already
/// saved, so a failure to refresh is logged and `out` is returned without text.
pub(crate) async fn with_refreshed_report<T>(config: &Config, out: Out<T>) -> Out<T>
where
    T: Serialize + Clone + Debug,
{
    match refresh(config).await {
        Ok(report) => out.with_text(report.to_string()),
        Err(e) => {
            warn!("The change was saved, but the reports could not be refreshed: {e}");
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_config_missing_home() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_config(&dir.path().join("missing")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_with_refreshed_report() {
        let env = crate::test::TestEnv::new().await;
        let out = with_refreshed_report(&env.config(), Out::new("Added", 1u32)).await;
        assert!(out.text().unwrap().starts_with("Unsold Commodities:"));
    }

    #[tokio::test]
    async fn test_with_refreshed_report_failure_keeps_outcome() {
        let env = crate::test::TestEnv::new().await;
        env.db().close().await;
        let out = with_refreshed_report(&env.config(), Out::new("Added", 1u32)).await;
        assert_eq!(out.message(), "Added");
        assert_eq!(out.structure(), Some(&1));
        assert!(out.text().is_none());
    }

    #[test]
    fn test_out_from_str() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
        assert!(out.text().is_none());
    }

    #[test]
    fn test_out_with_text() {
        let out = Out::new("Added 3 of Rice", 3u32).with_text("Name\tQuantity\n");
        assert_eq!(out.structure(), Some(&3));
        assert_eq!(out.text(), Some("Name\tQuantity\n"));
    }
}
