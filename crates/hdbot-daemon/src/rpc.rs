//! Newline-delimited JSON-RPC 2.0 over a Unix socket.
//!
//! One request per line, one response line per request, in order. A
//! connection stays open until the client closes it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hdbot_progress::DerivationError;
use hdbot_sync::{SyncError, TriggerError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::DaemonState;

/// Error codes. The -327xx/-326xx range is JSON-RPC's own; the rest are ours.
pub mod code {
    pub const PARSE: i32 = -32700;
    pub const BAD_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL: i32 = -32603;
    pub const UNAUTHORIZED: i32 = -32001;
    pub const NOT_FOUND: i32 = -32004;
    pub const DERIVATION: i32 = -32010;
}

const VERSION: &str = "2.0";

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// Must be `"2.0"`.
    pub jsonrpc: String,
    /// Echoed back unchanged in the response.
    pub id: Value,
    /// Handler name, e.g. `get_campaign`.
    pub method: String,
    /// Named arguments. Absent means `null`.
    #[serde(default)]
    pub params: Value,
}

/// Exactly one of `result` and `error` is set.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// The request's id, or `null` when the request could not be parsed.
    pub id: Value,
    /// Handler output on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    fn reply(id: Value, outcome: Result<Value, RpcError>) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err)),
        };
        Self {
            jsonrpc: VERSION,
            id,
            result,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    /// One of the [`code`] constants.
    pub code: i32,
    /// Short fixed text for the code.
    pub message: String,
    /// Structured detail, usually `{"detail": ...}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(code::PARSE, "request is not valid JSON-RPC", None)
    }

    /// Also used when an update is requested without a key.
    pub fn bad_request(detail: &str) -> Self {
        Self::new(code::BAD_REQUEST, "bad request", Some(json!({ "detail": detail })))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            code::METHOD_NOT_FOUND,
            "unknown method",
            Some(json!({ "method": method })),
        )
    }

    pub fn invalid_params(detail: &str) -> Self {
        Self::new(code::INVALID_PARAMS, "invalid params", Some(json!({ "detail": detail })))
    }

    pub fn internal_error(detail: &str) -> Self {
        Self::new(code::INTERNAL, "internal error", Some(json!({ "detail": detail })))
    }

    pub fn unauthorized() -> Self {
        Self::new(code::UNAUTHORIZED, "update key rejected", None)
    }

    pub fn not_found(detail: &str) -> Self {
        Self::new(code::NOT_FOUND, "not found", Some(json!({ "detail": detail })))
    }
}

impl From<SyncError> for RpcError {
    fn from(err: SyncError) -> Self {
        match &err {
            SyncError::NotFound { .. } => Self::not_found(&err.to_string()),
            SyncError::InvalidArgument(v) => Self::invalid_params(&v.to_string()),
            SyncError::Remote(_) | SyncError::Store(_) | SyncError::Conflict { .. } => {
                error!(error = %err, "request failed");
                Self::internal_error(&err.to_string())
            }
        }
    }
}

impl From<TriggerError> for RpcError {
    fn from(err: TriggerError) -> Self {
        match err {
            TriggerError::BadRequest => Self::bad_request("key is required"),
            TriggerError::Unauthorized => Self::unauthorized(),
            TriggerError::Sync(e) => e.into(),
        }
    }
}

impl From<DerivationError> for RpcError {
    fn from(err: DerivationError) -> Self {
        Self::new(
            code::DERIVATION,
            err.to_string(),
            serde_json::to_value(&err).ok(),
        )
    }
}

pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Bind the socket and serve connections until the task is dropped.
    pub async fn run(&self) -> anyhow::Result<()> {
        let listener = bind(&self.socket_path)?;
        info!(path = %self.socket_path.display(), "rpc listening");

        loop {
            let stream = match listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    error!(error = %e, "accept failed");
                    continue;
                }
            };
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                if let Err(e) = serve(state, stream).await {
                    warn!(error = %e, "rpc connection dropped");
                }
            });
        }
    }
}

/// Bind `path`, replacing a socket file left behind by an earlier run.
fn bind(path: &Path) -> std::io::Result<UnixListener> {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed stale socket"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    UnixListener::bind(path)
}

async fn serve(state: Arc<DaemonState>, stream: UnixStream) -> anyhow::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => dispatch_request(&state, request).await,
            Err(_) => RpcResponse::reply(Value::Null, Err(RpcError::parse_error())),
        };
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        write_half.write_all(&out).await?;
    }
    Ok(())
}

/// Route one request to its command handler.
pub async fn dispatch_request(state: &Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    if request.jsonrpc != VERSION {
        let err = RpcError::bad_request("jsonrpc must be \"2.0\"");
        return RpcResponse::reply(request.id, Err(err));
    }

    let params = &request.params;
    debug!(method = %request.method, "rpc call");

    let outcome = match request.method.as_str() {
        "get_campaign" => commands::campaign::get_campaign(state, params).await,
        "get_status" => commands::campaign::get_status(state).await,
        "list_seasons" => commands::campaign::list_seasons(state).await,
        "update" => commands::update::update(state, params).await,

        "get_sectors" => commands::progress::get_sectors(state, params).await,
        "get_galaxy" => commands::progress::get_galaxy(state, params).await,
        "get_event_progress" => commands::progress::get_event_progress(state, params).await,
        "get_alerts" => commands::progress::get_alerts(state, params).await,
        "get_statistics" => commands::progress::get_statistics(state, params).await,

        "rebroadcast" => commands::rebroadcast::rebroadcast(state, params).await,

        other => Err(RpcError::method_not_found(other)),
    };

    RpcResponse::reply(request.id, outcome)
}
