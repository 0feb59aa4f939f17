//! Per-season single-flight.
//!
//! The first caller for a season becomes the leader and does the work;
//! anyone arriving while it runs subscribes to its result. Registration and
//! subscription happen under the same lock, so a follower can never miss
//! the leader's send.

use std::collections::HashMap;

use hdbot_types::{CampaignSnapshot, Season};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::{Result, SyncError};

type Outcome = Result<CampaignSnapshot>;

#[derive(Default)]
pub(crate) struct InFlight {
    pending: Mutex<HashMap<Season, broadcast::Sender<Outcome>>>,
}

pub(crate) enum Role<'a> {
    Leader(LeaderGuard<'a>),
    Follower(broadcast::Receiver<Outcome>),
}

impl InFlight {
    /// Join the flight for `season`, leading it if none is running.
    pub fn join(&self, season: Season) -> Role<'_> {
        let mut pending = self.pending.lock();
        if let Some(tx) = pending.get(&season) {
            return Role::Follower(tx.subscribe());
        }
        let (tx, _) = broadcast::channel(1);
        pending.insert(season, tx);
        Role::Leader(LeaderGuard {
            flight: self,
            season,
            done: false,
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.pending.lock().len()
    }
}

/// Wait for a leader's result.
///
/// A leader that is dropped without completing yields [`SyncError::Conflict`].
pub(crate) async fn follow(mut rx: broadcast::Receiver<Outcome>, season: Season) -> Outcome {
    match rx.recv().await {
        Ok(outcome) => outcome,
        Err(_) => Err(SyncError::Conflict { season }),
    }
}

/// Held by the leader. Removes the flight entry on completion or drop.
pub(crate) struct LeaderGuard<'a> {
    flight: &'a InFlight,
    season: Season,
    done: bool,
}

impl LeaderGuard<'_> {
    /// Publish the result to every follower and close the flight.
    pub fn complete(mut self, outcome: &Outcome) {
        self.done = true;
        let tx = self.flight.pending.lock().remove(&self.season);
        if let Some(tx) = tx {
            // No receivers is fine: nobody was waiting.
            let _ = tx.send(outcome.clone());
        }
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            // Dropping the sender wakes followers with `Closed`.
            self.flight.pending.lock().remove(&self.season);
        }
    }
}
