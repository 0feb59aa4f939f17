//! Singleton status row.

use hdbot_types::Status;
use rusqlite::{Connection, OptionalExtension};

use crate::Result;

/// Get the most recently persisted status, if any poll has succeeded yet.
pub fn get(conn: &Connection) -> Result<Option<Status>> {
    let row = conn
        .query_row(
            "SELECT season, fetched_at FROM status WHERE id = 1",
            [],
            |row| {
                Ok(Status {
                    season: row.get::<_, i64>(0)? as u32,
                    fetched_at: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Overwrite the status row wholesale.
pub fn put(conn: &Connection, status: &Status, payload_json: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO status (id, season, fetched_at, payload_json)
         VALUES (1, ?1, ?2, ?3)",
        rusqlite::params![i64::from(status.season), status.fetched_at, payload_json],
    )?;
    Ok(())
}

/// The raw upstream payload behind the current status.
pub fn payload(conn: &Connection) -> Result<Option<String>> {
    let row = conn
        .query_row("SELECT payload_json FROM status WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_empty_status() {
        let conn = test_db();
        assert!(get(&conn).expect("get").is_none());
        assert!(payload(&conn).expect("payload").is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let conn = test_db();
        put(&conn, &Status { season: 149, fetched_at: 1000 }, "{\"season\":149}")
            .expect("put");
        put(&conn, &Status { season: 150, fetched_at: 2000 }, "{\"season\":150}")
            .expect("put");

        let status = get(&conn).expect("get").expect("status present");
        assert_eq!(status, Status { season: 150, fetched_at: 2000 });
        assert_eq!(payload(&conn).expect("payload").as_deref(), Some("{\"season\":150}"));

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM status", [], |row| row.get(0))
            .expect("count");
        assert_eq!(rows, 1);
    }
}
