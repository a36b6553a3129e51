//! SQLite database utilities for the vocabulary store.
//!
//! Runtime defaults:
//! - `journal_mode = WAL` so readers in other `lx` processes are not blocked
//! - `busy_timeout = 5s` to ride out short write contention
//! - `foreign_keys = ON` so category deletes uncategorize words and word
//!   deletes cascade to reports

pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the store database, apply runtime pragmas, and migrate
/// the schema to the latest version.
///
/// # Errors
///
/// Returns an error if opening/configuring/migrating the database fails.
pub fn open_store_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create store directory {}", parent.display()))?;
    }

    let mut conn =
        Connection::open(path).with_context(|| format!("open store database {}", path.display()))?;

    configure_connection(&conn).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply store migrations")?;

    Ok(conn)
}

/// In-memory store database with the full schema applied.
///
/// # Errors
///
/// Returns an error if migrating the database fails.
pub fn open_memory_db() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("open in-memory store")?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("enable foreign keys")?;
    migrations::migrate(&mut conn).context("apply store migrations")?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

/// Current wall clock as microseconds since the epoch.
#[must_use]
pub fn now_us() -> i64 {
    Utc::now().timestamp_micros()
}

/// Convert a stored microsecond timestamp back into a UTC datetime.
#[must_use]
pub fn from_us(us: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(us).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BUSY_TIMEOUT, from_us, now_us, open_store_db};
    use crate::db::migrations;
    use tempfile::TempDir;

    fn temp_db_path() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("lexis-store.sqlite3");
        (dir, path)
    }

    #[test]
    fn open_store_sets_wal_busy_timeout_and_fk() {
        let (_dir, path) = temp_db_path();
        let conn = open_store_db(&path).expect("open store db");

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("query journal_mode");
        assert_eq!(journal_mode.to_ascii_lowercase(), "wal");

        let busy_timeout_ms: u64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(
            u128::from(busy_timeout_ms),
            DEFAULT_BUSY_TIMEOUT.as_millis()
        );

        let foreign_keys: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("query foreign_keys");
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn open_store_runs_migrations() {
        let (_dir, path) = temp_db_path();
        let conn = open_store_db(&path).expect("open store db");

        let version = migrations::current_schema_version(&conn).expect("schema version query");
        assert_eq!(version, migrations::LATEST_SCHEMA_VERSION);
    }

    #[test]
    fn timestamps_round_trip_through_micros() {
        let us = now_us();
        assert_eq!(from_us(us).timestamp_micros(), us);
    }
}
