//! Relational store for profiles, tasks, announcements and monthly reports,
//! backed by a local SQLite database.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

mod announcements;
mod profiles;
mod reports;
mod tasks;

pub const TABLES: [&str; 5] = [
    "profiles",
    "tasks",
    "announcements",
    "monthly_reports",
    "teamlead_original_reports",
];

pub struct Store {
    connection: Connection,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        let connection = Connection::open(db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        configure_connection(&connection)?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().context("failed to open in-memory database")?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    #[cfg(test)]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        TABLES
            .iter()
            .map(|table| -> Result<(&'static str, i64)> {
                let count: i64 = self
                    .connection
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                    .with_context(|| format!("failed to count rows in {table}"))?;
                Ok((*table, count))
            })
            .collect()
    }
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS profiles (
              id TEXT PRIMARY KEY,
              name TEXT NOT NULL,
              email TEXT NOT NULL DEFAULT '',
              avatar_url TEXT NOT NULL DEFAULT '',
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              user_id TEXT NOT NULL,
              title TEXT NOT NULL,
              status TEXT NOT NULL,
              created_at TEXT NOT NULL,
              updated_at TEXT
            );

            CREATE TABLE IF NOT EXISTS announcements (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              title TEXT NOT NULL,
              message TEXT NOT NULL,
              created_by TEXT NOT NULL,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS monthly_reports (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              user_id TEXT NOT NULL,
              month TEXT NOT NULL,
              summary TEXT NOT NULL DEFAULT '',
              person_name TEXT,
              report BLOB NOT NULL,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS teamlead_original_reports (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              user_id TEXT NOT NULL,
              month TEXT NOT NULL,
              file_path TEXT NOT NULL,
              file_url TEXT NOT NULL,
              file_sha256 TEXT NOT NULL,
              file BLOB NOT NULL,
              created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_monthly_reports_created ON monthly_reports(created_at);
            CREATE INDEX IF NOT EXISTS idx_original_reports_month
              ON teamlead_original_reports(month, created_at);
            ",
        )
        .context("failed to create schema")?;

    Ok(())
}
