//! Upstream JSON shapes.
//!
//! Every field is optional at this layer so that a missing or `null` value
//! can be reported by name during normalization instead of surfacing as an
//! opaque decode error. Numbers may arrive as JSON numbers or as numeric
//! strings.

use hdbot_types::BigCount;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst, Same};

/// A number that may also be sent as a decimal string.
type Num = PickFirst<(Same, DisplayFromStr)>;

/// `GET /status`
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct WireStatus {
    #[serde_as(as = "Option<Num>")]
    pub season: Option<u32>,
}

/// `GET /campaign/{season}`
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct WireSeason {
    #[serde_as(as = "Option<Num>")]
    pub season: Option<u32>,
    pub campaigns: Option<Vec<WireCampaign>>,
    pub attack_events: Option<Vec<WireEvent>>,
    pub defend_events: Option<Vec<WireEvent>>,
    pub statistics: Option<Vec<WireStats>>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct WireCampaign {
    #[serde_as(as = "Option<Num>")]
    pub faction_id: Option<u8>,
    pub status: Option<String>,
    #[serde_as(as = "Option<Num>")]
    pub points: Option<u64>,
    #[serde_as(as = "Option<Num>")]
    pub points_max: Option<u64>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct WireEvent {
    #[serde_as(as = "Option<Num>")]
    pub event_id: Option<u64>,
    #[serde_as(as = "Option<Num>")]
    pub enemy: Option<u8>,
    #[serde_as(as = "Option<Num>")]
    pub region: Option<u8>,
    pub status: Option<String>,
    #[serde_as(as = "Option<Num>")]
    pub points: Option<u64>,
    #[serde_as(as = "Option<Num>")]
    pub points_max: Option<u64>,
    #[serde_as(as = "Option<Num>")]
    pub start_time: Option<i64>,
    #[serde_as(as = "Option<Num>")]
    pub end_time: Option<i64>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct WireStats {
    #[serde_as(as = "Option<Num>")]
    pub faction_id: Option<u8>,
    #[serde_as(as = "Option<Num>")]
    pub players: Option<u64>,
    #[serde_as(as = "Option<Num>")]
    pub successful_missions: Option<u64>,
    pub deaths: Option<BigCount>,
    pub kills: Option<BigCount>,
    #[serde_as(as = "Option<Num>")]
    pub season_duration: Option<u64>,
}
