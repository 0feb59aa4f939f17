//! Derived-view command handlers.
//!
//! Each call reads a snapshot through the cache-aside path and derives a
//! fresh view from it at the current time.

use std::sync::Arc;

use hdbot_types::{unix_now, CampaignSnapshot, EventKind, FactionId};
use serde::Serialize;
use serde_json::Value;

use super::season_param;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

async fn load_snapshot(
    state: &Arc<DaemonState>,
    params: &Value,
) -> std::result::Result<CampaignSnapshot, RpcError> {
    let season = season_param(params)?;
    state
        .reader
        .get_campaign(season)
        .await?
        .ok_or_else(|| RpcError::not_found("no campaign data stored"))
}

fn to_json<T: Serialize>(value: &T) -> Result {
    serde_json::to_value(value).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Sector states for one faction.
pub async fn get_sectors(state: &Arc<DaemonState>, params: &Value) -> Result {
    let faction = params
        .get("faction")
        .and_then(|v| v.as_u64())
        .and_then(|v| FactionId::try_from(v).ok())
        .ok_or_else(|| RpcError::invalid_params("faction required"))?;

    let snapshot = load_snapshot(state, params).await?;
    let sectors = hdbot_progress::derive_sector_state(&snapshot, faction, unix_now())?;
    to_json(&sectors)
}

/// Every front plus Super Earth.
pub async fn get_galaxy(state: &Arc<DaemonState>, params: &Value) -> Result {
    let snapshot = load_snapshot(state, params).await?;
    let galaxy = hdbot_progress::derive_galaxy(&snapshot, unix_now())?;
    to_json(&galaxy)
}

/// Ahead/behind projection for one event.
pub async fn get_event_progress(state: &Arc<DaemonState>, params: &Value) -> Result {
    let kind = match params.get("kind").and_then(|v| v.as_str()) {
        Some("attack") => EventKind::Attack,
        Some("defend") => EventKind::Defend,
        _ => return Err(RpcError::invalid_params("kind must be \"attack\" or \"defend\"")),
    };
    let event_id = params
        .get("event_id")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params("event_id required"))?;

    let snapshot = load_snapshot(state, params).await?;
    let events = match kind {
        EventKind::Attack => &snapshot.attack_events,
        EventKind::Defend => &snapshot.defend_events,
    };
    let event = events
        .iter()
        .find(|e| e.event_id == event_id)
        .ok_or_else(|| RpcError::not_found(&format!("no {kind} event {event_id}")))?;

    let progress = hdbot_progress::derive_event_progress(event, unix_now())?;
    to_json(&progress)
}

/// Active events, latest deadline first.
pub async fn get_alerts(state: &Arc<DaemonState>, params: &Value) -> Result {
    let snapshot = load_snapshot(state, params).await?;
    to_json(&hdbot_progress::active_alerts(&snapshot, unix_now()))
}

/// Season-wide statistics totals.
pub async fn get_statistics(state: &Arc<DaemonState>, params: &Value) -> Result {
    let snapshot = load_snapshot(state, params).await?;
    to_json(&hdbot_progress::statistics_totals(&snapshot))
}
