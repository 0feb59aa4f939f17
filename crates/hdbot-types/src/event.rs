//! Attack and defend events.

use serde::{Deserialize, Serialize};

use crate::{FactionId, RegionId, UnixTime};

/// State of a time-boxed event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Active,
    Success,
    #[serde(alias = "fail")]
    Failure,
}

/// Which event list an event came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Attack,
    Defend,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attack => f.write_str("attack"),
            Self::Defend => f.write_str("defend"),
        }
    }
}

/// An attack or defend event with its own point race.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Event {
    pub event_id: u64,
    pub enemy: FactionId,
    pub region: RegionId,
    pub status: EventStatus,
    pub points: u64,
    pub points_max: u64,
    pub start_time: UnixTime,
    pub end_time: UnixTime,
}

impl Event {
    pub fn is_active(&self) -> bool {
        self.status == EventStatus::Active
    }

    /// Whether the event is reported active and its window has not closed at `now`.
    pub fn is_live(&self, now: UnixTime) -> bool {
        self.is_active() && now < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: EventStatus) -> Event {
        Event {
            event_id: 1,
            enemy: 0,
            region: 4,
            status,
            points: 10,
            points_max: 100,
            start_time: 1000,
            end_time: 2000,
        }
    }

    #[test]
    fn test_fail_alias() {
        let status: EventStatus = serde_json::from_str("\"fail\"").expect("parse");
        assert_eq!(status, EventStatus::Failure);
        let status: EventStatus = serde_json::from_str("\"failure\"").expect("parse");
        assert_eq!(status, EventStatus::Failure);
    }

    #[test]
    fn test_live_requires_open_window() {
        let e = event(EventStatus::Active);
        assert!(e.is_live(1500));
        assert!(!e.is_live(2000));
        assert!(!event(EventStatus::Success).is_live(1500));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EventKind::Attack.to_string(), "attack");
        assert_eq!(EventKind::Defend.to_string(), "defend");
    }
}
