//! Rotating copies of the ledger database, taken before a destructive operation.

use crate::error::Res;
use crate::{utils, Config};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;

/// Prefix for SQLite backup files.
pub const SQLITE: &str = "shop.sqlite";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
    sqlite_path: PathBuf,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
            sqlite_path: config.sqlite_path().to_path_buf(),
        }
    }

    /// Copies the SQLite database file to the backups directory as `shop.sqlite.YYYY-MM-DD-NNN`
    /// and deletes the oldest copies beyond `backup_copies`.
    ///
    /// Returns the path to the created backup file.
    pub async fn copy_sqlite(&self) -> Res<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(&date).await?;
        let path = self.backups_dir.join(format!("{SQLITE}.{date}-{seq:03}"));

        utils::copy(&self.sqlite_path, &path).await?;
        self.rotate().await?;

        Ok(path)
    }

    /// Returns one more than the highest sequence number used for `date`.
    async fn next_sequence_number(&self, date: &str) -> Res<u32> {
        let max_seq = self
            .backup_names()
            .await?
            .iter()
            .filter_map(|name| parse_sequence_number(name, date))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    /// Keeps only the newest `backup_copies` backup files.
    async fn rotate(&self) -> Res<()> {
        let mut names = self.backup_names().await?;
        // The name format makes lexical order chronological.
        names.sort();

        let to_delete = names.len().saturating_sub(self.backup_copies as usize);
        for name in names.into_iter().take(to_delete) {
            utils::remove(&self.backups_dir.join(name)).await?;
        }
        Ok(())
    }

    async fn backup_names(&self) -> Res<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses `NNN` out of `shop.sqlite.{date}-NNN`.
fn parse_sequence_number(filename: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{SQLITE}.{date}-"))?
        .parse()
        .ok()
}

fn is_backup_file(filename: &str) -> bool {
    match filename.strip_prefix(&format!("{SQLITE}.")) {
        Some(rest) => {
            rest.len() > 11 && rest.as_bytes()[10] == b'-' && rest.bytes().all(|b| b != b'.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("shop.sqlite.2025-12-14-001", "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("shop.sqlite.2025-12-14-042", "2025-12-14"),
            Some(42)
        );
        assert_eq!(
            parse_sequence_number("shop.sqlite.2025-12-13-001", "2025-12-14"),
            None
        );
        assert_eq!(
            parse_sequence_number("shop.sqlite.2025-12-14-abc", "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("shop.sqlite.2025-12-14-001"));
        assert!(!is_backup_file("shop.sqlite"));
        assert!(!is_backup_file("shop.sqlite-journal"));
        assert!(!is_backup_file("shop.sqlite.2025-12-14-001.json"));
        assert!(!is_backup_file("config.json"));
    }

    #[tokio::test]
    async fn test_copy_sqlite_numbers_and_rotates() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();

        let first = backup.copy_sqlite().await.unwrap();
        assert!(first.is_file());
        assert!(first.to_string_lossy().ends_with("-001"));

        for _ in 0..6 {
            backup.copy_sqlite().await.unwrap();
        }

        let names = backup.backup_names().await.unwrap();
        assert_eq!(names.len(), env.config().backup_copies() as usize);
        assert!(!first.exists());
    }
}
