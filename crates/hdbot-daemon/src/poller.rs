//! Background poller.
//!
//! Runs the update sequence, then sleeps the interval. Runs never overlap;
//! a slow update pushes the next one back. A failed run is logged and the
//! loop carries on. The task exits when the shutdown channel fires, even in
//! the middle of an update: the store is written atomically per record, so
//! abandoning an update leaves the previous state intact.

use std::sync::Arc;
use std::time::Duration;

use hdbot_remote::CampaignSource;
use hdbot_sync::{TriggerError, UpdateTrigger};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub struct Poller<S> {
    trigger: Arc<UpdateTrigger<S>>,
    key: String,
    interval: Duration,
}

impl<S> Poller<S>
where
    S: CampaignSource + 'static,
{
    pub fn new(trigger: Arc<UpdateTrigger<S>>, key: String, interval: Duration) -> Self {
        Self {
            trigger,
            key,
            interval,
        }
    }

    /// Spawn the poll loop as an owned task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(interval_secs = self.interval.as_secs(), "poller started");

        loop {
            tokio::select! {
                outcome = self.trigger.run(Some(&self.key)) => self.log(outcome),
                _ = shutdown.recv() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        info!("poller stopped");
    }

    fn log(&self, outcome: Result<hdbot_sync::UpdateReport, TriggerError>) {
        match outcome {
            Ok(report) => info!(
                season = report.status.season,
                elapsed_ms = report.elapsed_ms,
                "scheduled update complete"
            ),
            Err(TriggerError::Sync(e)) if e.is_validation() => {
                warn!(error = %e, "scheduled update rejected upstream data")
            }
            Err(e) => error!(error = %e, "scheduled update failed"),
        }
    }
}
