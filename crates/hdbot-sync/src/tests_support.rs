//! In-process upstream used by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hdbot_remote::{CampaignSource, Fetched, Result, ValidationError};
use hdbot_types::{Campaign, CampaignSnapshot, CampaignStatus, Season, Status};
use serde_json::json;

pub(crate) struct FakeSource {
    current: Season,
    delay: Duration,
    null_seasons: bool,
    pub status_calls: AtomicUsize,
    pub season_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(current: Season) -> Self {
        Self {
            current,
            delay: Duration::ZERO,
            null_seasons: false,
            status_calls: AtomicUsize::new(0),
            season_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    pub fn with_null_seasons(mut self) -> Self {
        self.null_seasons = true;
        self
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl CampaignSource for FakeSource {
    async fn fetch_status(&self) -> Result<Fetched<Status>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(Fetched {
            value: Status {
                season: self.current,
                fetched_at: 1_000,
            },
            raw: json!({ "season": self.current }),
        })
    }

    async fn fetch_season(&self, season: Option<Season>) -> Result<Fetched<CampaignSnapshot>> {
        self.season_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.null_seasons {
            return Err(ValidationError::null("season").into());
        }
        let season = season.unwrap_or(self.current);
        let value = CampaignSnapshot {
            season,
            fetched_at: 1_000,
            campaigns: vec![Campaign {
                faction_id: 0,
                status: CampaignStatus::Active,
                points: 350,
                points_max: 1000,
            }],
            attack_events: vec![],
            defend_events: vec![],
            statistics: vec![],
        };
        Ok(Fetched {
            value,
            raw: json!({ "season": season }),
        })
    }
}
