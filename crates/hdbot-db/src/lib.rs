//! # hdbot-db
//!
//! SQLite persistence for the campaign tracker: the most recent upstream
//! status and one normalized snapshot per season, each stored next to the
//! raw upstream payload it came from.
//!
//! Season rows are never deleted. A row for a concluded season is frozen;
//! see [`queries::seasons::upsert`].

pub mod migrations;
pub mod queries;
pub mod schema;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

pub use migrations::SCHEMA_VERSION;

/// File name of the database inside the data directory.
pub const DB_FILE: &str = "hdbot.db";

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema v{found} is newer than supported v{supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("stored JSON is unreadable: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot create data directory {path}: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open (creating if needed) `DB_FILE` inside `data_dir`.
pub fn open_in(data_dir: &Path) -> Result<Connection> {
    std::fs::create_dir_all(data_dir).map_err(|source| DbError::DataDir {
        path: data_dir.display().to_string(),
        source,
    })?;
    open(&data_dir.join(DB_FILE))
}

/// Open the database file at `path` and migrate it.
pub fn open(path: &Path) -> Result<Connection> {
    prepare(Connection::open(path)?)
}

/// A private in-memory database, migrated and ready.
pub fn open_memory() -> Result<Connection> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    // journal_mode answers with a row, so it cannot go through pragma_update.
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    tracing::debug!(journal_mode = %mode, "database opened");
    migrations::run(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_database_is_migrated() {
        let conn = open_memory().expect("open in-memory db");
        assert_eq!(migrations::version(&conn).expect("version"), SCHEMA_VERSION);
    }

    #[test]
    fn test_open_in_creates_directory_and_uses_wal() {
        let dir = std::env::temp_dir().join(format!("hdbot-db-test-{}", std::process::id()));
        let nested = dir.join("nested");

        let conn = open_in(&nested).expect("open");
        assert!(nested.join(DB_FILE).exists());
        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("journal_mode");
        assert_eq!(mode, "wal");

        drop(conn);
        let reopened = open_in(&nested).expect("reopen");
        assert_eq!(
            migrations::version(&reopened).expect("version"),
            SCHEMA_VERSION
        );
        drop(reopened);
        std::fs::remove_dir_all(&dir).ok();
    }
}
