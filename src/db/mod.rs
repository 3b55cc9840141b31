//! This module is responsible for reading, writing and managing the SQLite database that holds
//! the ledger: commodity balances in `commodities` and the sale-event log in `sales`.

mod ledger;
mod migrations;
mod reports;

use crate::error::Res;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::debug;

/// The owned handle to the ledger database.
///
/// The pool holds a single connection, so every unit of work (a transaction or a single query)
/// has exclusive use of the file until it finishes. Cloning a `Db` shares the same pool.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        Self::open(path).await
    }

    /// - Opens (creating if missing) the SQLite file at `path`
    /// - Brings the schema up to date with migrations
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        Self::open(path.as_ref()).await
    }

    async fn open(path: &Path) -> Res<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            // Committed data must live in the main file so that a plain file copy is a backup.
            .journal_mode(SqliteJournalMode::Delete);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open SQLite database '{}'", path.display()))?;

        let db = Self { pool };
        let current = db.schema_version().await?;
        let target = migrations::latest_version();
        if current > target {
            bail!(
                "The database schema is at version {current}, which is newer than this program \
                supports ({target})"
            );
        }
        migrations::run(&db.pool, current, target).await?;
        debug!("Opened database '{}' at schema version {target}", path.display());
        Ok(db)
    }

    /// Returns the schema version, creating the `schema_version` table at version 0 if this is a
    /// new file.
    async fn schema_version(&self) -> Res<i32> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await
            .context("Failed to create schema_version table")?;

        let row: Option<(i32,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query schema version")?;

        match row {
            Some((version,)) => Ok(version),
            None => {
                sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
                    .execute(&self.pool)
                    .await
                    .context("Failed to insert initial schema version")?;
                Ok(0)
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn close(&self) {
        self.pool.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sqlite");
        let db = Db::init(&path).await.unwrap();
        assert!(path.is_file());
        assert_eq!(db.schema_version().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_init_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sqlite");
        let _db = Db::init(&path).await.unwrap();
        assert!(Db::init(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sqlite");
        let first = Db::load(&path).await.unwrap();
        first.close().await;
        let second = Db::load(&path).await.unwrap();
        assert_eq!(second.schema_version().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_refuses_newer_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sqlite");
        let db = Db::init(&path).await.unwrap();
        sqlx::query("UPDATE schema_version SET version = 99")
            .execute(&db.pool)
            .await
            .unwrap();
        db.close().await;

        let err = Db::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("newer than this program"));
    }
}
