//! Authenticated "update now" entry point.

use std::sync::Arc;
use std::time::Instant;

use hdbot_remote::CampaignSource;
use hdbot_types::{CampaignSnapshot, Status};
use serde::Serialize;
use tracing::warn;

use crate::engine::SyncEngine;
use crate::SyncError;

#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// No key was supplied.
    #[error("update key is required")]
    BadRequest,

    /// A key was supplied but does not match.
    #[error("update key does not match")]
    Unauthorized,

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Result of a completed update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub status: Status,
    pub season: CampaignSnapshot,
    pub elapsed_ms: u64,
}

pub struct UpdateTrigger<S> {
    engine: Arc<SyncEngine<S>>,
    key: String,
}

impl<S: CampaignSource> UpdateTrigger<S> {
    pub fn new(engine: Arc<SyncEngine<S>>, key: impl Into<String>) -> Self {
        Self {
            engine,
            key: key.into(),
        }
    }

    pub fn engine(&self) -> &Arc<SyncEngine<S>> {
        &self.engine
    }

    /// Check `provided` against the configured key, then run the full
    /// update sequence. No upstream call is made unless the key matches.
    pub async fn run(&self, provided: Option<&str>) -> Result<UpdateReport, TriggerError> {
        authorize(provided, &self.key)?;

        let started = Instant::now();
        let (status, season) = self.engine.update_all().await?;
        Ok(UpdateReport {
            status,
            season,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// An absent or empty key is a bad request; a wrong one is unauthorized.
pub fn authorize(provided: Option<&str>, expected: &str) -> Result<(), TriggerError> {
    match provided {
        None | Some("") => Err(TriggerError::BadRequest),
        Some(key) if key == expected => Ok(()),
        Some(_) => {
            warn!("update rejected: key mismatch");
            Err(TriggerError::Unauthorized)
        }
    }
}
