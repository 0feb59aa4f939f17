//! Rebroadcast: hand out the raw upstream payloads exactly as stored.
//!
//! Failures carry their own small error table in `data`:
//!
//! | code | meaning |
//! |---|---|
//! | 1 | no action set |
//! | 2 | invalid action |
//! | 3 | missing or invalid arguments |
//! | 4 | not found |

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::parse_season;
use crate::rpc::{code, RpcError};
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebroadcastError {
    NoAction,
    InvalidAction,
    InvalidArguments,
    NotFound,
}

impl RebroadcastError {
    pub fn code(self) -> u8 {
        match self {
            Self::NoAction => 1,
            Self::InvalidAction => 2,
            Self::InvalidArguments => 3,
            Self::NotFound => 4,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NoAction => "No action set",
            Self::InvalidAction => "Invalid action",
            Self::InvalidArguments => "Missing or invalid arguments",
            Self::NotFound => "Not found",
        }
    }
}

impl From<RebroadcastError> for RpcError {
    fn from(err: RebroadcastError) -> Self {
        let code = match err {
            RebroadcastError::NotFound => code::NOT_FOUND,
            _ => code::INVALID_PARAMS,
        };
        RpcError::new(
            code,
            err.message(),
            Some(json!({
                "time": hdbot_types::unix_now(),
                "error_code": err.code(),
                "error_message": err.message(),
            })),
        )
    }
}

/// Return a stored upstream payload.
///
/// - `get_campaign_status`: the last status payload
/// - `get_snapshots {season}`: that season's payload, fetched first if absent
pub async fn rebroadcast(state: &Arc<DaemonState>, params: &Value) -> Result {
    let action = params
        .get("action")
        .and_then(|v| v.as_str())
        .ok_or(RebroadcastError::NoAction)?;

    let payload = match action {
        "get_campaign_status" => state
            .store()
            .status_payload()
            .await
            .map_err(store_error)?,
        "get_snapshots" => {
            let season = params
                .get("season")
                .and_then(parse_season)
                .ok_or(RebroadcastError::InvalidArguments)?;
            snapshot_payload(state, season).await?
        }
        _ => return Err(RebroadcastError::InvalidAction.into()),
    };

    let payload = payload.ok_or(RebroadcastError::NotFound)?;
    serde_json::from_str(&payload).map_err(|e| RpcError::internal_error(&e.to_string()))
}

async fn snapshot_payload(
    state: &Arc<DaemonState>,
    season: hdbot_types::Season,
) -> std::result::Result<Option<String>, RpcError> {
    let store = state.store();
    if let Some(payload) = store.season_payload(season).await.map_err(store_error)? {
        return Ok(Some(payload));
    }
    if let Err(e) = state.engine.backfill_season(Some(season)).await {
        debug!(season, error = %e, "rebroadcast backfill failed");
        return Err(RebroadcastError::NotFound.into());
    }
    store.season_payload(season).await.map_err(store_error)
}

fn store_error(e: hdbot_db::DbError) -> RpcError {
    RpcError::from(hdbot_sync::SyncError::from(e))
}
