//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::db::Db;
use crate::Config;
use chrono::NaiveDate;
use tempfile::TempDir;

/// Test environment that sets up a shop home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// The passphrase written to the test environment's config.json.
    pub const PASSPHRASE: &'static str = "let me in";

    /// Creates a test environment with Config and initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("shop");
        let config = Config::create(&root, Some("Test Shop"), Some(Self::PASSPHRASE))
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn db(&self) -> &Db {
        self.config.db()
    }

    /// Stock on hand for `name`, or `None` if it has never been added.
    pub async fn stock(&self, name: &str) -> Option<u64> {
        self.db().query_commodity(name).await.unwrap().in_stock
    }

    /// Number of database backups in the backups directory.
    pub async fn backup_count(&self) -> usize {
        std::fs::read_dir(self.config.backups()).unwrap().count()
    }
}

/// A day in January 2025.
pub fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, n).unwrap()
}
