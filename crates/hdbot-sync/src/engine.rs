//! Fetch → normalize → persist.
//!
//! The engine is the only writer to the snapshot store. Season fetches run
//! single-flight per season key: a concurrent caller for the same season
//! waits for the running fetch instead of issuing its own.

use std::time::{Duration, Instant};

use hdbot_db::queries::seasons::UpsertOutcome;
use hdbot_remote::{check_season_arg, CampaignSource, RemoteError};
use hdbot_types::{CampaignSnapshot, Season, Status};
use tracing::{debug, info, warn};

use crate::flight::{follow, InFlight, Role};
use crate::store::SnapshotStore;
use crate::{Result, SyncError};

/// Default bound on a full status + season update.
pub const DEFAULT_SEQUENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// What the leader of a flight does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    /// Always fetch from upstream.
    Always,
    /// Fetch only if the season is still absent once the flight starts.
    IfMissing,
}

pub struct SyncEngine<S> {
    source: S,
    store: SnapshotStore,
    flights: InFlight,
    sequence_timeout: Duration,
}

impl<S: CampaignSource> SyncEngine<S> {
    pub fn new(source: S, store: SnapshotStore) -> Self {
        Self {
            source,
            store,
            flights: InFlight::default(),
            sequence_timeout: DEFAULT_SEQUENCE_TIMEOUT,
        }
    }

    pub fn with_sequence_timeout(mut self, timeout: Duration) -> Self {
        self.sequence_timeout = timeout;
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the current status and replace the stored one.
    pub async fn update_status(&self) -> Result<Status> {
        let fetched = self.source.fetch_status().await?;
        self.store.put_status(&fetched.value, &fetched.raw).await?;
        debug!(season = fetched.value.season, "status updated");
        Ok(fetched.value)
    }

    /// Fetch a season and write it through the compare-and-upsert.
    ///
    /// `None` means the season named by the stored status. Returns the
    /// snapshot now held locally, which is the stored one if the fetched
    /// data lost the freshness comparison.
    pub async fn update_season(&self, season: Option<Season>) -> Result<CampaignSnapshot> {
        let season = self.resolve(season).await?;
        self.single_flight(season, Refresh::Always).await
    }

    /// Make sure a season exists locally, fetching it if it does not.
    ///
    /// The presence check is repeated inside the flight, so callers that
    /// raced on the same miss trigger at most one upstream fetch.
    pub async fn backfill_season(&self, season: Option<Season>) -> Result<CampaignSnapshot> {
        let season = self.resolve(season).await?;
        self.single_flight(season, Refresh::IfMissing).await
    }

    /// Refresh the status, then the season it names, within the sequence
    /// timeout. On timeout neither write after the point of cancellation
    /// happens and the error is [`RemoteError::Timeout`].
    pub async fn update_all(&self) -> Result<(Status, CampaignSnapshot)> {
        let started = Instant::now();
        let sequence = async {
            let status = self.update_status().await?;
            let snapshot = self.update_season(Some(status.season)).await?;
            Ok::<_, SyncError>((status, snapshot))
        };

        let result = tokio::time::timeout(self.sequence_timeout, sequence)
            .await
            .map_err(|_| SyncError::Remote(RemoteError::Timeout))?;
        if let Ok((status, _)) = &result {
            info!(
                season = status.season,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "update sequence complete"
            );
        }
        result
    }

    async fn resolve(&self, season: Option<Season>) -> Result<Season> {
        match season {
            Some(s) => {
                check_season_arg(Some(s)).map_err(SyncError::InvalidArgument)?;
                Ok(s)
            }
            None => self
                .store
                .status()
                .await?
                .map(|st| st.season)
                .ok_or(SyncError::NotFound { season: None }),
        }
    }

    async fn single_flight(&self, season: Season, refresh: Refresh) -> Result<CampaignSnapshot> {
        loop {
            match self.flights.join(season) {
                Role::Leader(guard) => {
                    let outcome = self.fetch_and_store(season, refresh).await;
                    guard.complete(&outcome);
                    return outcome;
                }
                Role::Follower(rx) => match follow(rx, season).await {
                    Err(SyncError::Conflict { .. }) => {
                        debug!(season, "in-flight update abandoned, retrying");
                        continue;
                    }
                    outcome => return outcome,
                },
            }
        }
    }

    async fn fetch_and_store(&self, season: Season, refresh: Refresh) -> Result<CampaignSnapshot> {
        if refresh == Refresh::IfMissing {
            if let Some(snapshot) = self.store.season(season).await? {
                debug!(season, "season already present");
                return Ok(snapshot);
            }
        }

        let fetched = match self.source.fetch_season(Some(season)).await {
            Ok(f) => f,
            Err(RemoteError::Validation(v)) => {
                warn!(season, field = %v.field, error = %v, "upstream season payload rejected");
                return Err(RemoteError::Validation(v).into());
            }
            Err(e) => return Err(e.into()),
        };

        match self.store.upsert(&fetched.value, &fetched.raw).await? {
            UpsertOutcome::Inserted | UpsertOutcome::Updated => Ok(fetched.value),
            UpsertOutcome::Kept => {
                debug!(season, "stored snapshot kept over fetched one");
                self.store
                    .season(season)
                    .await?
                    .ok_or(SyncError::NotFound { season: Some(season) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_support::FakeSource;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn engine(source: FakeSource) -> SyncEngine<FakeSource> {
        SyncEngine::new(source, SnapshotStore::open_memory().expect("store"))
    }

    #[tokio::test]
    async fn test_update_all_orders_status_first() {
        let engine = engine(FakeSource::new(150));
        let (status, snap) = engine.update_all().await.expect("update");
        assert_eq!(status.season, 150);
        assert_eq!(snap.season, 150);
        assert_eq!(engine.store().status().await.expect("read"), Some(status));
        assert!(engine.store().season(150).await.expect("read").is_some());
    }

    #[tokio::test]
    async fn test_update_season_without_status_is_not_found() {
        let engine = engine(FakeSource::new(150));
        let err = engine.update_season(None).await.expect_err("no status");
        assert!(matches!(err, SyncError::NotFound { season: None }));
        assert_eq!(engine.source().season_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_season_is_invalid_argument() {
        let engine = engine(FakeSource::new(150));
        let err = engine.backfill_season(Some(0)).await.expect_err("season 0");
        assert!(matches!(err, SyncError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_backfill_skips_fetch_when_present() {
        let engine = engine(FakeSource::new(150));
        engine.update_season(Some(150)).await.expect("seed");
        engine.backfill_season(Some(150)).await.expect("backfill");
        assert_eq!(engine.source().season_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_backfills_fetch_once() {
        let engine = Arc::new(engine(FakeSource::new(150).with_delay_ms(50)));
        let a = tokio::spawn({
            let e = Arc::clone(&engine);
            async move { e.backfill_season(Some(150)).await }
        });
        let b = tokio::spawn({
            let e = Arc::clone(&engine);
            async move { e.backfill_season(Some(150)).await }
        });
        let a = a.await.expect("join").expect("a");
        let b = b.await.expect("join").expect("b");
        assert_eq!(a, b);
        assert_eq!(engine.source().season_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_leaves_store_untouched() {
        let engine = engine(FakeSource::new(150).with_delay_ms(500))
            .with_sequence_timeout(Duration::from_millis(50));
        let err = engine.update_all().await.expect_err("timeout");
        assert!(matches!(err, SyncError::Remote(RemoteError::Timeout)));
        assert!(engine.store().status().await.expect("read").is_none());
        assert!(engine.store().latest().await.expect("read").is_none());
    }

    #[tokio::test]
    async fn test_validation_error_propagates_from_engine() {
        let engine = engine(FakeSource::new(150).with_null_seasons());
        let err = engine.update_season(Some(999)).await.expect_err("null");
        assert!(err.is_validation());
    }
}
