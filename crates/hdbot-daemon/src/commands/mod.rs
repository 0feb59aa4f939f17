//! IPC command handlers.
//!
//! Each submodule implements the commands for one IPC category.

pub mod campaign;
pub mod progress;
pub mod rebroadcast;
pub mod update;

use hdbot_types::Season;
use serde_json::Value;

use crate::rpc::RpcError;

/// Read an optional `season` parameter.
///
/// Accepts a positive integer or a string holding one. Absent and `null`
/// both mean "not given".
pub(crate) fn season_param(params: &Value) -> Result<Option<Season>, RpcError> {
    match params.get("season") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_season(v)
            .map(Some)
            .ok_or_else(|| RpcError::invalid_params("season must be a positive integer")),
    }
}

pub(crate) fn parse_season(v: &Value) -> Option<Season> {
    let season = match v {
        Value::Number(n) => n.as_u64().and_then(|n| Season::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<Season>().ok(),
        _ => None,
    }?;
    hdbot_types::is_valid_season(season).then_some(season)
}
