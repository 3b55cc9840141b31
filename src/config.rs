//! Configuration file handling for the shop ledger.
//!
//! The configuration file is stored at `$SHOP_HOME/config.json` and holds the shop name used in
//! report headers, the passphrase that guards clearing a report, and backup settings.

use crate::backup::Backup;
use crate::db::Db;
use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "shop";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const SHOP_SQLITE: &str = "shop.sqlite";
pub(crate) const DEFAULT_SHOP_NAME: &str = "M & B Shop";
pub(crate) const DEFAULT_PASSPHRASE: &str = "1234";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SHOP_HOME` and from there it loads `$SHOP_HOME/config.json` and opens the ledger
/// database at `$SHOP_HOME/shop.sqlite`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory, its backups subdirectory, an initial `config.json` and an
    /// empty ledger database.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/shop`
    /// - `shop_name` - Shown at the top of shared reports. Defaults to `M & B Shop`.
    /// - `passphrase` - Required to clear the most recent sales report. Defaults to `1234`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or a database already exists in `dir`.
    pub async fn create(
        dir: impl Into<PathBuf>,
        shop_name: Option<&str>,
        passphrase: Option<&str>,
    ) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the shop home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            shop_name: shop_name.unwrap_or(DEFAULT_SHOP_NAME).to_string(),
            passphrase: passphrase.unwrap_or(DEFAULT_PASSPHRASE).to_string(),
            ..ConfigFile::default()
        };

        let db_path = root.join(SHOP_SQLITE);
        let db = Db::init(&db_path)
            .await
            .context("Unable to create SQLite DB")?;
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups: backups_dir,
            config_path,
            config_file,
            db,
            sqlite_path: db_path,
        })
    }

    /// This will
    /// - validate that `shop_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - open the database, creating the schema if it is missing
    pub async fn load(shop_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = shop_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Shop Home is missing, run 'shop init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let backups = root.join(BACKUPS);
        if !backups.is_dir() {
            bail!("The backups directory is missing '{}'", backups.display())
        }

        let db_path = root.join(SHOP_SQLITE);
        let db = Db::load(&db_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            db,
            sqlite_path: db_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn shop_name(&self) -> &str {
        &self.config_file.shop_name
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Exact comparison against the configured passphrase.
    pub(crate) fn passphrase_matches(&self, supplied: &str) -> bool {
        self.config_file.passphrase == supplied
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub(crate) fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "shop",
///   "config_version": 1,
///   "shop_name": "M & B Shop",
///   "passphrase": "1234",
///   "backup_copies": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "shop"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Name shown in the header of shared reports
    #[serde(default = "default_shop_name")]
    shop_name: String,

    /// Passphrase required to clear the most recent sales report
    passphrase: String,

    /// Number of database backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,
}

fn default_shop_name() -> String {
    DEFAULT_SHOP_NAME.to_string()
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            shop_name: default_shop_name(),
            passphrase: DEFAULT_PASSPHRASE.to_string(),
            backup_copies: BACKUP_COPIES,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("shop_home");

        let config = Config::create(&home_dir, Some("Corner Store"), Some("s3cret"))
            .await
            .unwrap();

        assert_eq!(config.shop_name(), "Corner Store");
        assert!(config.passphrase_matches("s3cret"));
        assert!(!config.passphrase_matches("S3cret"));
        assert!(config.backups().is_dir());
        assert!(config.sqlite_path().is_file());
        assert!(config.config_path().is_file());
        assert_eq!(config.root(), home_dir.canonicalize().unwrap());
    }

    #[tokio::test]
    async fn test_config_create_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), None, None).await.unwrap();
        assert_eq!(config.shop_name(), DEFAULT_SHOP_NAME);
        assert!(config.passphrase_matches(DEFAULT_PASSPHRASE));
        assert_eq!(config.backup_copies(), 5);
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        let _config = Config::create(dir.path(), None, None).await.unwrap();
        assert!(Config::create(dir.path(), None, None).await.is_err());
    }

    #[tokio::test]
    async fn test_config_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), Some("Kiosk"), None)
            .await
            .unwrap();

        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.shop_name(), "Kiosk");
        assert_eq!(loaded.root(), created.root());
        assert_eq!(loaded.sqlite_path(), created.sqlite_path());
    }

    #[tokio::test]
    async fn test_ledger_survives_reopen() {
        use crate::model::Amount;
        use chrono::NaiveDate;
        use std::str::FromStr;

        let dir = TempDir::new().unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let price = Amount::from_str("12.5").unwrap();

        let created = Config::create(dir.path(), None, None).await.unwrap();
        let db = created.db();
        db.add_stock("Rice", 10, Some(Amount::from_str("9").unwrap()), day)
            .await
            .unwrap();
        db.sell_stock("Rice", 4, price, day).await.unwrap();
        let stock = db.query_commodity("Rice").await.unwrap();
        let events = db.sale_events().await.unwrap();
        let unsold = db.unsold_inventory().await.unwrap();
        let daily = db.daily_sales_summary().await.unwrap();
        db.close().await;
        drop(created);

        let loaded = Config::load(dir.path()).await.unwrap();
        let db = loaded.db();
        assert_eq!(db.query_commodity("Rice").await.unwrap(), stock);
        assert_eq!(stock.in_stock, Some(6));
        assert_eq!(db.sale_events().await.unwrap(), events);
        assert_eq!(events.len(), 2);
        assert_eq!(db.unsold_inventory().await.unwrap(), unsold);
        assert_eq!(db.daily_sales_summary().await.unwrap(), daily);
        assert_eq!(db.latest_sales_date().await.unwrap(), Some(day));
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("run 'shop init' first"));
    }

    #[tokio::test]
    async fn test_config_load_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("The config file is missing"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original = ConfigFile {
            shop_name: "Stall 9".to_string(),
            passphrase: "open sesame".to_string(),
            backup_copies: 2,
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();

        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "shop",
            "config_version": 1,
            "passphrase": "9876"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.passphrase, "9876");
        assert_eq!(config.shop_name, DEFAULT_SHOP_NAME);
        assert_eq!(config.backup_copies, BACKUP_COPIES);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "inventory",
            "config_version": 1,
            "passphrase": "1234"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }
}
