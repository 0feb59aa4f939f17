//! Active events, ordered for the alert strip.

use hdbot_types::{CampaignSnapshot, Event, EventKind, UnixTime};
use serde::Serialize;
use tracing::debug;

use crate::duration::humanize_remaining;
use crate::events::{derive_event_progress, ProgressSummary};
use crate::DerivationError;

/// Projection for an alert, or why there is none.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AlertProgress {
    Derived(ProgressSummary),
    Unavailable(DerivationError),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alert {
    pub kind: EventKind,
    pub event: Event,
    /// "Due in" text.
    pub remaining: String,
    pub progress: AlertProgress,
}

/// Active attack and defend events, latest deadline first.
///
/// An event whose progress cannot be derived is still listed, tagged
/// [`AlertProgress::Unavailable`].
pub fn active_alerts(snapshot: &CampaignSnapshot, now: UnixTime) -> Vec<Alert> {
    let tagged = snapshot
        .attack_events
        .iter()
        .map(|e| (EventKind::Attack, e))
        .chain(snapshot.defend_events.iter().map(|e| (EventKind::Defend, e)));

    let mut alerts: Vec<Alert> = tagged
        .filter(|(_, e)| e.is_active())
        .map(|(kind, event)| {
            let progress = match derive_event_progress(event, now) {
                Ok(summary) => AlertProgress::Derived(summary),
                Err(e) => {
                    debug!(event_id = event.event_id, error = %e, "alert without progress");
                    AlertProgress::Unavailable(e)
                }
            };
            Alert {
                kind,
                event: event.clone(),
                remaining: humanize_remaining(event.end_time.saturating_sub(now)),
                progress,
            }
        })
        .collect();

    alerts.sort_by(|a, b| b.event.end_time.cmp(&a.event.end_time));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdbot_types::EventStatus;

    fn event(id: u64, status: EventStatus, start_time: UnixTime, end_time: UnixTime) -> Event {
        Event {
            event_id: id,
            enemy: 0,
            region: 2,
            status,
            points: 10,
            points_max: 100,
            start_time,
            end_time,
        }
    }

    fn snapshot() -> CampaignSnapshot {
        CampaignSnapshot {
            season: 150,
            fetched_at: 0,
            campaigns: vec![],
            attack_events: vec![event(1, EventStatus::Active, 0, 4000)],
            defend_events: vec![
                event(2, EventStatus::Active, 0, 7200),
                event(3, EventStatus::Success, 0, 9000),
                event(4, EventStatus::Active, 500, 1000),
            ],
            statistics: vec![],
        }
    }

    #[test]
    fn test_active_only_latest_first() {
        let alerts = active_alerts(&snapshot(), 100);
        let ids: Vec<u64> = alerts.iter().map(|a| a.event.event_id).collect();
        assert_eq!(ids, vec![2, 1, 4]);
        assert_eq!(alerts[0].kind, EventKind::Defend);
        assert_eq!(alerts[1].kind, EventKind::Attack);
        assert_eq!(alerts[1].remaining, "1 hour, 5 minutes");
    }

    #[test]
    fn test_far_deadline_does_not_overflow() {
        let mut snap = snapshot();
        snap.defend_events = vec![event(9, EventStatus::Active, i64::MIN / 2 - 10, i64::MAX)];
        snap.attack_events.clear();

        let alerts = active_alerts(&snap, -100);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].remaining.contains("days"));
        match &alerts[0].progress {
            AlertProgress::Unavailable(e) => assert_eq!(e.field(), "end_time"),
            AlertProgress::Derived(_) => panic!("window is out of range"),
        }
    }

    #[test]
    fn test_not_started_is_tagged() {
        let alerts = active_alerts(&snapshot(), 100);
        let pending = alerts.iter().find(|a| a.event.event_id == 4).expect("alert 4");
        match &pending.progress {
            AlertProgress::Unavailable(e) => assert_eq!(e.field(), "start_time"),
            AlertProgress::Derived(_) => panic!("event 4 has not started"),
        }
        assert!(matches!(alerts[0].progress, AlertProgress::Derived(_)));
    }
}
