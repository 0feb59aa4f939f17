//! `reqwest`-backed upstream client.

use std::time::Duration;

use hdbot_types::{CampaignSnapshot, Season, Status};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::{check_season_arg, normalize, CampaignSource, Fetched, RemoteError, Result};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the upstream API.
///
/// - `GET {base_url}/status`
/// - `GET {base_url}/campaign/{season}` (or `/campaign` for the current season)
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: Client,
    base_url: String,
}

impl HttpSource {
    /// Create a client with the given per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hdbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a path and parse the body as JSON.
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "fetching upstream");

        let response = self.http.get(&url).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                crate::ValidationError::invalid("payload", e.to_string()).into()
            } else {
                classify(e)
            }
        })
    }
}

/// Map a transport error onto the remote error taxonomy.
fn classify(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Network(e.to_string())
    }
}

impl CampaignSource for HttpSource {
    async fn fetch_status(&self) -> Result<Fetched<Status>> {
        let raw = self.get_json("/status").await?;
        let value = normalize::status(&raw, hdbot_types::unix_now())?;
        Ok(Fetched { value, raw })
    }

    async fn fetch_season(&self, season: Option<Season>) -> Result<Fetched<CampaignSnapshot>> {
        check_season_arg(season)?;
        let path = match season {
            Some(s) => format!("/campaign/{s}"),
            None => "/campaign".to_string(),
        };
        let raw = self.get_json(&path).await?;
        let value = normalize::season(&raw, season, hdbot_types::unix_now())?;
        Ok(Fetched { value, raw })
    }
}
