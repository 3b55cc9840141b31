use crate::commands::Out;
use crate::config::DEFAULT_PASSPHRASE;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;
use tracing::warn;

/// Creates the data directory, `config.json` and an empty ledger database.
///
/// # Arguments
/// - `shop_home` - The directory that will be the root of data directory, e.g. `$HOME/shop`
/// - `shop_name` - The name shown at the top of shared reports.
/// - `passphrase` - The passphrase required by `shop clear`. When omitted the default `1234` is
///   used and a warning is logged.
///
/// # Errors
/// - Returns an error if any file operations fail or a ledger already exists in `shop_home`.
pub async fn init(
    shop_home: &Path,
    shop_name: Option<&str>,
    passphrase: Option<&str>,
) -> Result<Out<()>> {
    if passphrase.is_none() {
        warn!(
            "No --passphrase given, clearing reports will use the default passphrase \
            '{DEFAULT_PASSPHRASE}'. Change it in config.json."
        );
    }
    let config = Config::create(shop_home, shop_name, passphrase)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the shop directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("shop");
        let out = init(&home, Some("Corner Store"), Some("pw")).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.shop_name(), "Corner Store");
    }

    #[tokio::test]
    async fn test_init_twice_is_config_error() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), None, None).await.unwrap();
        let err = init(dir.path(), None, None).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
