//! Season-keyed snapshot rows.

use hdbot_types::{CampaignSnapshot, Season, UnixTime};
use rusqlite::{Connection, OptionalExtension};

use crate::Result;

/// What an upsert did to the stored row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row existed for the season.
    Inserted,
    /// The existing row was replaced.
    Updated,
    /// The existing row was kept: it is concluded, or newer than the incoming one.
    Kept,
}

/// Summary of a stored season.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SeasonRow {
    pub season: Season,
    pub fetched_at: UnixTime,
    pub concluded: bool,
}

/// Get the snapshot for a season.
pub fn get(conn: &Connection, season: Season) -> Result<Option<CampaignSnapshot>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT snapshot_json FROM seasons WHERE season = ?1",
            [i64::from(season)],
            |row| row.get(0),
        )
        .optional()?;
    decode(json)
}

/// Get the snapshot with the highest season number.
pub fn latest(conn: &Connection) -> Result<Option<CampaignSnapshot>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT snapshot_json FROM seasons ORDER BY season DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    decode(json)
}

/// Insert or replace a season's snapshot.
///
/// Compare-and-upsert: an existing row is only replaced while it is not
/// concluded and the incoming snapshot is not older than the stored one.
/// The read and the write run in one transaction.
pub fn upsert(
    conn: &Connection,
    snapshot: &CampaignSnapshot,
    payload_json: &str,
) -> Result<UpsertOutcome> {
    let snapshot_json = serde_json::to_string(snapshot)?;
    let tx = conn.unchecked_transaction()?;

    let existed = tx
        .query_row(
            "SELECT 1 FROM seasons WHERE season = ?1",
            [i64::from(snapshot.season)],
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    let changed = tx.execute(
        "INSERT INTO seasons (season, fetched_at, concluded, snapshot_json, payload_json)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(season) DO UPDATE SET
             fetched_at = excluded.fetched_at,
             concluded = excluded.concluded,
             snapshot_json = excluded.snapshot_json,
             payload_json = excluded.payload_json
         WHERE seasons.concluded = 0 AND excluded.fetched_at >= seasons.fetched_at",
        rusqlite::params![
            i64::from(snapshot.season),
            snapshot.fetched_at,
            snapshot.is_concluded(),
            snapshot_json,
            payload_json,
        ],
    )?;
    tx.commit()?;

    let outcome = match (changed, existed) {
        (0, _) => UpsertOutcome::Kept,
        (_, true) => UpsertOutcome::Updated,
        (_, false) => UpsertOutcome::Inserted,
    };
    tracing::debug!(season = snapshot.season, ?outcome, "season upsert");
    Ok(outcome)
}

/// List all stored seasons, newest first.
pub fn list(conn: &Connection) -> Result<Vec<SeasonRow>> {
    let mut stmt = conn.prepare(
        "SELECT season, fetched_at, concluded FROM seasons ORDER BY season DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(SeasonRow {
                season: row.get::<_, i64>(0)? as u32,
                fetched_at: row.get(1)?,
                concluded: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// The raw upstream payload behind a season's snapshot.
pub fn payload(conn: &Connection, season: Season) -> Result<Option<String>> {
    let row = conn
        .query_row(
            "SELECT payload_json FROM seasons WHERE season = ?1",
            [i64::from(season)],
            |row| row.get(0),
        )
        .optional()?;
    Ok(row)
}

fn decode(json: Option<String>) -> Result<Option<CampaignSnapshot>> {
    match json {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}
