//! Campaign, status and snapshot structures.

use serde::{Deserialize, Serialize};

use crate::{Event, FactionId, FactionStats, Season, UnixTime};

/// The upstream's pointer to the active season, as last polled.
///
/// Only the most recent one is kept; each poll overwrites it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Status {
    pub season: Season,
    pub fetched_at: UnixTime,
}

/// Outcome of a faction's campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Defeated,
}

/// One faction's territorial progress track for a season.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Campaign {
    pub faction_id: FactionId,
    pub status: CampaignStatus,
    pub points: u64,
    pub points_max: u64,
}

impl Campaign {
    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }
}

/// Full normalized campaign state for one season.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct CampaignSnapshot {
    pub season: Season,
    pub fetched_at: UnixTime,
    pub campaigns: Vec<Campaign>,
    pub attack_events: Vec<Event>,
    pub defend_events: Vec<Event>,
    pub statistics: Vec<FactionStats>,
}

impl CampaignSnapshot {
    /// A season is concluded once it has campaigns and none of them is
    /// still active. A snapshot without campaigns never counts as concluded.
    ///
    /// Concluded snapshots are historical and never overwritten.
    pub fn is_concluded(&self) -> bool {
        !self.campaigns.is_empty() && !self.campaigns.iter().any(Campaign::is_active)
    }
}
