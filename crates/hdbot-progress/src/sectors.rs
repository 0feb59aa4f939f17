//! Sector ownership.
//!
//! A faction's campaign points fill its ten sectors in order. With
//! `pps = points_max / 10`, sectors `1..=floor(points / pps)` are captured,
//! the next one is in progress and the rest are lost. Region 11, the enemy
//! homeworld, is lost unless an attack event says otherwise. A campaign
//! that is no longer active shows every region lost.

use hdbot_types::{
    CampaignSnapshot, Event, EventStatus, FactionId, RegionId, UnixTime, HOMEWORLD_REGION,
    SECTOR_COUNT, SUPER_EARTH_FACTION, SUPER_EARTH_REGION,
};
use serde::Serialize;
use tracing::warn;

use crate::{DerivationError, Result};

/// A position on the galaxy map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ts_rs::TS)]
#[ts(export)]
pub struct MapPosition {
    pub faction: FactionId,
    pub region: RegionId,
}

/// Where defend events aimed at region 0 are drawn.
pub const SUPER_EARTH: MapPosition = MapPosition {
    faction: SUPER_EARTH_FACTION,
    region: SUPER_EARTH_REGION,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SectorStatus {
    Captured,
    InProgress,
    Lost,
}

/// Whether an event currently targets a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EventFlag {
    Active,
    Idle,
}

impl EventFlag {
    fn for_event(event: &Event, now: UnixTime) -> Self {
        if event.is_live(now) {
            Self::Active
        } else {
            Self::Idle
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ts_rs::TS)]
#[ts(export)]
pub struct SectorState {
    pub region: RegionId,
    pub status: SectorStatus,
    /// Campaign points counted toward this sector.
    pub points: f64,
    /// Campaign points needed to hold this sector.
    pub points_max: f64,
    /// Points earned within this sector alone.
    pub points_sector: f64,
    pub points_sector_max: f64,
    /// 0..=100
    pub percent: f64,
    pub event: Option<EventFlag>,
}

impl SectorState {
    fn lost(region: RegionId, points: f64, points_max: f64, points_sector_max: f64) -> Self {
        Self {
            region,
            status: SectorStatus::Lost,
            points,
            points_max,
            points_sector: 0.0,
            points_sector_max,
            percent: 0.0,
            event: None,
        }
    }
}

/// Sector states for regions `1..=11` of one faction.
///
/// `now` decides whether a reported-active event is still live; one whose
/// window has closed flags its region `idle`.
pub fn derive_sector_state(
    snapshot: &CampaignSnapshot,
    faction: FactionId,
    now: UnixTime,
) -> Result<Vec<SectorState>> {
    let (index, campaign) = snapshot
        .campaigns
        .iter()
        .enumerate()
        .find(|(_, c)| c.faction_id == faction)
        .ok_or(DerivationError::UnknownFaction { faction })?;

    if campaign.points_max == 0 {
        return Err(DerivationError::invalid(
            format!("campaigns[{index}].points_max"),
            "must be positive",
        ));
    }

    let points = campaign.points as f64;
    let per_sector = campaign.points_max as f64 / f64::from(SECTOR_COUNT);
    let earned = (points / per_sector).floor() as u64;

    let mut sectors: Vec<SectorState> = (1..=SECTOR_COUNT)
        .map(|region| {
            let total = f64::from(region) * per_sector;
            if !campaign.is_active() {
                return SectorState::lost(region, points, total, per_sector);
            }
            let region_index = u64::from(region);
            if region_index == earned + 1 {
                let in_sector = points - (total - per_sector);
                SectorState {
                    region,
                    status: SectorStatus::InProgress,
                    points,
                    points_max: total,
                    points_sector: in_sector,
                    points_sector_max: per_sector,
                    percent: in_sector / per_sector * 100.0,
                    event: None,
                }
            } else if region_index <= earned {
                SectorState {
                    region,
                    status: SectorStatus::Captured,
                    points: total,
                    points_max: total,
                    points_sector: per_sector,
                    points_sector_max: per_sector,
                    percent: 100.0,
                    event: None,
                }
            } else {
                SectorState::lost(region, points, total, per_sector)
            }
        })
        .collect();

    let mut homeworld = SectorState::lost(HOMEWORLD_REGION, 0.0, 0.0, 0.0);
    if campaign.is_active() {
        for (i, event) in snapshot.attack_events.iter().enumerate() {
            if event.enemy != faction {
                continue;
            }
            let status = match event.status {
                EventStatus::Active => SectorStatus::InProgress,
                EventStatus::Success => SectorStatus::Captured,
                EventStatus::Failure => continue,
            };
            if event.points_max == 0 {
                return Err(DerivationError::invalid(
                    format!("attack_events[{i}].points_max"),
                    "must be positive",
                ));
            }
            let percent = event.points as f64 / event.points_max as f64 * 100.0;
            homeworld = SectorState {
                region: HOMEWORLD_REGION,
                status,
                points: event.points as f64,
                points_max: event.points_max as f64,
                points_sector: event.points as f64,
                points_sector_max: event.points_max as f64,
                percent,
                event: Some(EventFlag::for_event(event, now)),
            };
        }
    }
    sectors.push(homeworld);

    for event in snapshot.defend_events.iter().filter(|e| e.enemy == faction) {
        match event.region {
            SUPER_EARTH_REGION => {}
            r if r > HOMEWORLD_REGION => {
                warn!(event_id = event.event_id, region = r, "defend event targets unknown region");
            }
            r => {
                if let Some(sector) = sectors.get_mut(usize::from(r) - 1) {
                    sector.event = Some(EventFlag::for_event(event, now));
                }
            }
        }
    }

    Ok(sectors)
}

/// State of Super Earth on the map.
#[derive(Clone, Debug, PartialEq, Serialize, ts_rs::TS)]
#[ts(export)]
pub struct SuperEarthState {
    pub position: MapPosition,
    pub event: Option<EventFlag>,
    /// Id of the defend event currently targeting Super Earth, if one is live.
    pub event_id: Option<u64>,
}

/// Super Earth's state: `active` while a defend event targeting region 0 is live.
pub fn derive_super_earth(snapshot: &CampaignSnapshot, now: UnixTime) -> SuperEarthState {
    let mut state = SuperEarthState {
        position: SUPER_EARTH,
        event: None,
        event_id: None,
    };
    for event in snapshot
        .defend_events
        .iter()
        .filter(|e| e.region == SUPER_EARTH.region)
    {
        let flag = EventFlag::for_event(event, now);
        if flag == EventFlag::Active {
            state.event = Some(flag);
            state.event_id = Some(event.event_id);
        } else if state.event.is_none() {
            state.event = Some(flag);
        }
    }
    state
}

/// One faction's front.
#[derive(Clone, Debug, PartialEq, Serialize, ts_rs::TS)]
#[ts(export)]
pub struct Front {
    pub faction: FactionId,
    pub sectors: Vec<SectorState>,
}

/// The whole map for one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, ts_rs::TS)]
#[ts(export)]
pub struct Galaxy {
    pub season: hdbot_types::Season,
    pub fronts: Vec<Front>,
    pub super_earth: SuperEarthState,
}

/// Every faction's front plus Super Earth.
pub fn derive_galaxy(snapshot: &CampaignSnapshot, now: UnixTime) -> Result<Galaxy> {
    let fronts = snapshot
        .campaigns
        .iter()
        .map(|c| {
            Ok(Front {
                faction: c.faction_id,
                sectors: derive_sector_state(snapshot, c.faction_id, now)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Galaxy {
        season: snapshot.season,
        fronts,
        super_earth: derive_super_earth(snapshot, now),
    })
}
