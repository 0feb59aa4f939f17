//! Forward-only migrations keyed by `PRAGMA user_version`.
//!
//! `STEPS[n]` takes the schema from version `n` to `n + 1`. Each step and
//! its version bump commit together, so a crash mid-upgrade leaves the
//! database at the last completed version. There is no downgrade: a stale
//! database is deleted and refilled by the poller.

use rusqlite::Connection;

use crate::{schema, DbError, Result};

const STEPS: &[&str] = &[schema::SCHEMA_V1];

/// Version a fully migrated database reports.
pub const SCHEMA_VERSION: u32 = STEPS.len() as u32;

/// Version currently recorded in the database file.
pub fn version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Bring the schema up to `SCHEMA_VERSION`.
pub fn run(conn: &Connection) -> Result<()> {
    let found = version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::UnsupportedVersion {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    for (index, sql) in STEPS.iter().enumerate().skip(found as usize) {
        let target = index as u32 + 1;
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", target)?;
        tx.commit()?;
        tracing::info!(from = target - 1, to = target, "database schema migrated");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Connection {
        Connection::open_in_memory().expect("open")
    }

    #[test]
    fn test_blank_database_reaches_current_version() {
        let conn = blank();
        assert_eq!(version(&conn).expect("version"), 0);
        run(&conn).expect("migrate");
        assert_eq!(version(&conn).expect("version"), SCHEMA_VERSION);
    }

    #[test]
    fn test_rerun_is_noop() {
        let conn = blank();
        run(&conn).expect("first run");
        conn.execute(
            "INSERT INTO status (id, season, fetched_at, payload_json) VALUES (1, 150, 0, '{}')",
            [],
        )
        .expect("insert");
        run(&conn).expect("second run");

        let season: i64 = conn
            .query_row("SELECT season FROM status", [], |row| row.get(0))
            .expect("row survives");
        assert_eq!(season, 150);
    }

    #[test]
    fn test_newer_database_refused() {
        let conn = blank();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .expect("set version");
        match run(&conn) {
            Err(DbError::UnsupportedVersion { found, supported }) => {
                assert_eq!(found, SCHEMA_VERSION + 1);
                assert_eq!(supported, SCHEMA_VERSION);
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_v1_tables() {
        let conn = blank();
        run(&conn).expect("migrate");

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .expect("prepare");
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("query")
            .collect::<std::result::Result<_, _>>()
            .expect("collect");
        assert_eq!(tables, ["seasons", "status"]);
    }

    #[test]
    fn test_season_zero_rejected_by_schema() {
        let conn = blank();
        run(&conn).expect("migrate");
        let err = conn.execute(
            "INSERT INTO seasons (season, fetched_at, snapshot_json, payload_json)
             VALUES (0, 0, '{}', '{}')",
            [],
        );
        assert!(err.is_err(), "season 0 must violate the CHECK constraint");
    }
}
