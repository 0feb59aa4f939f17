//! SQL schema definitions.

/// Complete schema for the v1 database.
pub const SCHEMA_V1: &str = r#"
-- Most recent upstream status. Exactly one row once the first poll succeeds.
CREATE TABLE IF NOT EXISTS status (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    season INTEGER NOT NULL,
    fetched_at INTEGER NOT NULL,
    payload_json TEXT NOT NULL
);

-- One normalized snapshot per season. Rows are replaced while the season is
-- live and frozen once `concluded` is set.
CREATE TABLE IF NOT EXISTS seasons (
    season INTEGER PRIMARY KEY CHECK (season > 0),
    fetched_at INTEGER NOT NULL,
    concluded INTEGER NOT NULL DEFAULT 0,
    snapshot_json TEXT NOT NULL,
    payload_json TEXT NOT NULL
);
"#;
