//! Campaign data command handlers.

use std::sync::Arc;

use serde_json::Value;

use super::season_param;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Snapshot for `season` (latest if omitted), backfilled on a miss.
pub async fn get_campaign(state: &Arc<DaemonState>, params: &Value) -> Result {
    let season = season_param(params)?;
    let snapshot = state.reader.get_campaign(season).await?;
    serde_json::to_value(snapshot).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// The current season pointer.
pub async fn get_status(state: &Arc<DaemonState>) -> Result {
    let status = state.reader.get_status().await?;
    serde_json::to_value(status).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Seasons held locally, newest first, without their snapshots.
pub async fn list_seasons(state: &Arc<DaemonState>) -> Result {
    let rows = state
        .store()
        .list_seasons()
        .await
        .map_err(hdbot_sync::SyncError::from)?;
    serde_json::to_value(rows).map_err(|e| RpcError::internal_error(&e.to_string()))
}
