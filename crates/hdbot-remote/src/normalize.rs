//! Wire shapes to domain types.
//!
//! Casting is done by the wire layer; this module enforces that required
//! fields are present and that model invariants hold, naming the offending
//! field on failure.

use hdbot_types::{
    Campaign, CampaignSnapshot, CampaignStatus, Event, EventStatus, FactionStats, Season,
    Status, UnixTime,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::wire::{WireCampaign, WireEvent, WireSeason, WireStats, WireStatus};
use crate::ValidationError;

type Result<T> = std::result::Result<T, ValidationError>;

/// Normalize a status payload.
pub fn status(raw: &Value, fetched_at: UnixTime) -> Result<Status> {
    let wire: WireStatus = decode(raw, "status")?;
    let season = required(wire.season, "season")?;
    if !hdbot_types::is_valid_season(season) {
        return Err(ValidationError::constraint("season", "must be positive"));
    }
    Ok(Status { season, fetched_at })
}

/// Normalize a season payload.
///
/// `requested` is the season that was asked for, if any. A payload for a
/// different season is rejected; a payload without a season number takes
/// the requested one.
pub fn season(
    raw: &Value,
    requested: Option<Season>,
    fetched_at: UnixTime,
) -> Result<CampaignSnapshot> {
    let wire: WireSeason = decode(raw, "season")?;

    let season = match (wire.season, requested) {
        (Some(got), Some(want)) if got != want => {
            return Err(ValidationError::constraint(
                "season",
                format!("asked for season {want}, received {got}"),
            ));
        }
        (Some(got), _) => got,
        (None, Some(want)) => want,
        (None, None) => return Err(ValidationError::null("season")),
    };
    if !hdbot_types::is_valid_season(season) {
        return Err(ValidationError::constraint("season", "must be positive"));
    }

    let campaigns = required(wire.campaigns, "campaigns")?
        .into_iter()
        .enumerate()
        .map(|(i, c)| campaign(c, i))
        .collect::<Result<Vec<_>>>()?;
    // An empty list would read as a concluded season and freeze the row.
    if campaigns.is_empty() {
        return Err(ValidationError::constraint("campaigns", "must not be empty"));
    }

    let attack_events = events(wire.attack_events, "attack_events")?;
    let defend_events = events(wire.defend_events, "defend_events")?;

    let statistics = wire
        .statistics
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, s)| stats(s, i))
        .collect::<Result<Vec<_>>>()?;

    Ok(CampaignSnapshot {
        season,
        fetched_at,
        campaigns,
        attack_events,
        defend_events,
        statistics,
    })
}

/// Decode raw JSON into a wire shape, treating a bare `null` as a missing object.
fn decode<T: DeserializeOwned>(raw: &Value, field: &str) -> Result<T> {
    if raw.is_null() {
        return Err(ValidationError::null(field));
    }
    serde_json::from_value(raw.clone()).map_err(|e| ValidationError::invalid(field, e.to_string()))
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| ValidationError::null(field))
}

fn campaign(wire: WireCampaign, index: usize) -> Result<Campaign> {
    let at = |name: &str| format!("campaigns[{index}].{name}");

    // Upstream lists campaigns in faction order; the id is optional.
    let faction_id = match wire.faction_id {
        Some(id) => id,
        None => u8::try_from(index).map_err(|_| ValidationError::null(at("faction_id")))?,
    };
    let status = match required(wire.status, &at("status"))?.as_str() {
        "active" => CampaignStatus::Active,
        "defeated" => CampaignStatus::Defeated,
        other => return Err(ValidationError::invalid(at("status"), other)),
    };
    let points = required(wire.points, &at("points"))?;
    let points_max = required(wire.points_max, &at("points_max"))?;

    if points_max == 0 {
        return Err(ValidationError::constraint(at("points_max"), "must be positive"));
    }
    if points > points_max {
        return Err(ValidationError::constraint(
            at("points"),
            format!("{points} exceeds points_max {points_max}"),
        ));
    }

    Ok(Campaign {
        faction_id,
        status,
        points,
        points_max,
    })
}

fn events(wire: Option<Vec<WireEvent>>, list: &str) -> Result<Vec<Event>> {
    wire.unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, e)| event(e, &format!("{list}[{i}]")))
        .collect()
}

fn event(wire: WireEvent, path: &str) -> Result<Event> {
    let at = |name: &str| format!("{path}.{name}");

    let status = match required(wire.status, &at("status"))?.as_str() {
        "active" => EventStatus::Active,
        "success" => EventStatus::Success,
        "failure" | "fail" => EventStatus::Failure,
        other => return Err(ValidationError::invalid(at("status"), other)),
    };
    let event = Event {
        event_id: required(wire.event_id, &at("event_id"))?,
        enemy: required(wire.enemy, &at("enemy"))?,
        region: required(wire.region, &at("region"))?,
        status,
        points: required(wire.points, &at("points"))?,
        points_max: required(wire.points_max, &at("points_max"))?,
        start_time: required(wire.start_time, &at("start_time"))?,
        end_time: required(wire.end_time, &at("end_time"))?,
    };

    if event.start_time >= event.end_time {
        return Err(ValidationError::constraint(
            at("end_time"),
            format!("{} is not after start_time {}", event.end_time, event.start_time),
        ));
    }
    if event.is_active() && event.points > event.points_max {
        return Err(ValidationError::constraint(
            at("points"),
            format!("{} exceeds points_max {}", event.points, event.points_max),
        ));
    }
    Ok(event)
}

fn stats(wire: WireStats, index: usize) -> Result<FactionStats> {
    let at = |name: &str| format!("statistics[{index}].{name}");

    let faction_id = match wire.faction_id {
        Some(id) => id,
        None => u8::try_from(index).map_err(|_| ValidationError::null(at("faction_id")))?,
    };
    Ok(FactionStats {
        faction_id,
        players: required(wire.players, &at("players"))?,
        successful_missions: required(wire.successful_missions, &at("successful_missions"))?,
        deaths: required(wire.deaths, &at("deaths"))?,
        kills: required(wire.kills, &at("kills"))?,
        season_duration: required(wire.season_duration, &at("season_duration"))?,
    })
}
