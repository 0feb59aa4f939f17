//! Cache-aside reads.
//!
//! A read is served from the store when the season is present. On a miss
//! the engine backfills it and the store is read again, so every answer
//! comes from local state.

use std::sync::Arc;

use hdbot_remote::{CampaignSource, RemoteError};
use hdbot_types::{CampaignSnapshot, Season, Status};
use tracing::{debug, warn};

use crate::engine::SyncEngine;
use crate::{Result, SyncError};

pub struct CampaignReader<S> {
    engine: Arc<SyncEngine<S>>,
}

impl<S> Clone for CampaignReader<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<S: CampaignSource> CampaignReader<S> {
    pub fn new(engine: Arc<SyncEngine<S>>) -> Self {
        Self { engine }
    }

    /// Snapshot for `season`, or the newest stored one when `None`.
    ///
    /// A hit never touches upstream. On a miss the season is backfilled;
    /// if upstream has no valid data for it the result is
    /// [`SyncError::NotFound`].
    pub async fn get_campaign(&self, season: Option<Season>) -> Result<Option<CampaignSnapshot>> {
        if season == Some(0) {
            return Err(SyncError::InvalidArgument(hdbot_remote::ValidationError::constraint(
                "season",
                "must be positive",
            )));
        }

        let store = self.engine.store();
        if let Some(snapshot) = store.season_or_latest(season).await? {
            return Ok(Some(snapshot));
        }

        debug!(?season, "campaign miss, backfilling");
        match self.engine.backfill_season(season).await {
            Ok(_) => {}
            Err(SyncError::Remote(RemoteError::Validation(v))) => {
                warn!(?season, error = %v, "season has no valid upstream data");
                return Err(SyncError::NotFound { season });
            }
            Err(e) => return Err(e),
        }

        Ok(store.season_or_latest(season).await?)
    }

    /// The stored status, fetching it if none has been stored yet.
    pub async fn get_status(&self) -> Result<Status> {
        if let Some(status) = self.engine.store().status().await? {
            return Ok(status);
        }
        debug!("status miss, fetching");
        self.engine.update_status().await
    }
}
