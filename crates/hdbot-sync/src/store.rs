//! Async handle over the SQLite snapshot store.
//!
//! All access goes through one `tokio::sync::Mutex<Connection>`, so writes
//! to any season key are serialized and each upsert commits atomically.

use std::sync::Arc;

use hdbot_db::queries::seasons::{self, SeasonRow, UpsertOutcome};
use hdbot_db::queries::status;
use hdbot_db::Result;
use hdbot_types::{CampaignSnapshot, Season, Status};
use rusqlite::Connection;
use tokio::sync::Mutex;

/// Shared handle to the snapshot store.
#[derive(Clone)]
pub struct SnapshotStore {
    db: Arc<Mutex<Connection>>,
}

impl SnapshotStore {
    /// Wrap an open connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// An in-memory store with the schema applied (for testing).
    pub fn open_memory() -> Result<Self> {
        Ok(Self::new(hdbot_db::open_memory()?))
    }

    pub async fn status(&self) -> Result<Option<Status>> {
        let db = self.db.lock().await;
        status::get(&db)
    }

    pub async fn put_status(&self, value: &Status, raw: &serde_json::Value) -> Result<()> {
        let payload = serde_json::to_string(raw)?;
        let db = self.db.lock().await;
        status::put(&db, value, &payload)
    }

    pub async fn status_payload(&self) -> Result<Option<String>> {
        let db = self.db.lock().await;
        status::payload(&db)
    }

    pub async fn season(&self, season: Season) -> Result<Option<CampaignSnapshot>> {
        let db = self.db.lock().await;
        seasons::get(&db, season)
    }

    pub async fn latest(&self) -> Result<Option<CampaignSnapshot>> {
        let db = self.db.lock().await;
        seasons::latest(&db)
    }

    /// Read a specific season, or the newest one when `season` is `None`.
    pub async fn season_or_latest(&self, season: Option<Season>) -> Result<Option<CampaignSnapshot>> {
        match season {
            Some(s) => self.season(s).await,
            None => self.latest().await,
        }
    }

    pub async fn upsert(
        &self,
        snapshot: &CampaignSnapshot,
        raw: &serde_json::Value,
    ) -> Result<UpsertOutcome> {
        let payload = serde_json::to_string(raw)?;
        let db = self.db.lock().await;
        seasons::upsert(&db, snapshot, &payload)
    }

    pub async fn season_payload(&self, season: Season) -> Result<Option<String>> {
        let db = self.db.lock().await;
        seasons::payload(&db, season)
    }

    /// Every stored season, newest first.
    pub async fn list_seasons(&self) -> Result<Vec<SeasonRow>> {
        let db = self.db.lock().await;
        seasons::list(&db)
    }
}
