//! Manual update trigger.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Refresh status and the current season. Requires the update key.
pub async fn update(state: &Arc<DaemonState>, params: &Value) -> Result {
    let key = params.get("key").and_then(|v| v.as_str());
    let report = state.trigger.run(key).await?;
    info!(
        season = report.status.season,
        elapsed_ms = report.elapsed_ms,
        "manual update complete"
    );
    Ok(serde_json::json!({
        "updated": {
            "status": report.status,
            "season": report.season,
        },
        "elapsed_ms": report.elapsed_ms,
    }))
}
