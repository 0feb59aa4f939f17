//! Integration test crate for the campaign tracker.
//!
//! The library half holds shared fixtures: a scriptable in-process upstream
//! that serves raw JSON through the real normalizer, and payload builders.
//! The tests themselves live under `tests/`.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p hdbot-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hdbot_remote::{normalize, CampaignSource, Fetched, RemoteError};
use hdbot_sync::{CampaignReader, SnapshotStore, SyncEngine};
use hdbot_types::{CampaignSnapshot, Season, Status};
use serde_json::{json, Value};

/// In-process upstream.
///
/// Seasons without a registered payload answer `null`, which is what the
/// real API does for seasons it does not know.
pub struct FakeUpstream {
    current: Season,
    seasons: HashMap<Season, Value>,
    delay_ms: AtomicU64,
    down: AtomicBool,
    pub status_calls: AtomicUsize,
    pub season_calls: AtomicUsize,
}

impl FakeUpstream {
    pub fn new(current: Season) -> Self {
        Self {
            current,
            seasons: HashMap::new(),
            delay_ms: AtomicU64::new(0),
            down: AtomicBool::new(false),
            status_calls: AtomicUsize::new(0),
            season_calls: AtomicUsize::new(0),
        }
    }

    /// Serve `payload` for `season`.
    pub fn with_season(mut self, season: Season, payload: Value) -> Self {
        self.seasons.insert(season, payload);
        self
    }

    /// Delay every response by `ms` milliseconds.
    pub fn set_delay_ms(&self, ms: u64) {
        self.delay_ms.store(ms, Ordering::SeqCst);
    }

    /// Fail every request with a network error while `down` is set.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn season_fetches(&self) -> usize {
        self.season_calls.load(Ordering::SeqCst)
    }

    pub fn status_fetches(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> hdbot_remote::Result<()> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("connection refused".into()));
        }
        Ok(())
    }
}

impl CampaignSource for FakeUpstream {
    async fn fetch_status(&self) -> hdbot_remote::Result<Fetched<Status>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        let raw = json!({ "season": self.current });
        let value = normalize::status(&raw, hdbot_types::unix_now())?;
        Ok(Fetched { value, raw })
    }

    async fn fetch_season(&self, season: Option<Season>) -> hdbot_remote::Result<Fetched<CampaignSnapshot>> {
        self.season_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        let season = season.unwrap_or(self.current);
        let raw = self.seasons.get(&season).cloned().unwrap_or(Value::Null);
        let value = normalize::season(&raw, Some(season), hdbot_types::unix_now())?;
        Ok(Fetched { value, raw })
    }
}

/// Upstream-shaped season payload with one campaign per `(status, points)`
/// pair, each out of 1000 points.
pub fn season_payload(season: Season, campaigns: &[(&str, u64)]) -> Value {
    let campaigns: Vec<Value> = campaigns
        .iter()
        .enumerate()
        .map(|(i, (status, points))| {
            json!({
                "faction_id": i,
                "status": status,
                "points": points.to_string(),
                "points_max": 1000,
            })
        })
        .collect();
    json!({
        "season": season,
        "campaigns": campaigns,
        "attack_events": [],
        "defend_events": [],
        "statistics": [],
    })
}

/// Engine and reader over a fresh in-memory store.
pub fn harness(upstream: FakeUpstream) -> (Arc<SyncEngine<FakeUpstream>>, CampaignReader<FakeUpstream>) {
    let store = SnapshotStore::open_memory().expect("in-memory store");
    let engine = Arc::new(SyncEngine::new(upstream, store));
    let reader = CampaignReader::new(Arc::clone(&engine));
    (engine, reader)
}
