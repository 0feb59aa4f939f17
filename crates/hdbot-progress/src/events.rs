//! Event rate projection.
//!
//! Compares an event's points against a straight-line schedule from
//! `start_time` to `end_time`:
//!
//! ```text
//! expected_points = points_max * elapsed / total_time
//! Ahead     if points > expected_points * 1.1
//! Behind    if points < expected_points
//! On track  otherwise
//! ```

use std::fmt;

use hdbot_types::{Event, UnixTime};
use serde::Serialize;

use crate::{DerivationError, Result};

/// Margin above the schedule before an event counts as ahead.
pub const AHEAD_BUFFER: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Ahead,
    Behind,
    OnTrack,
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ahead => f.write_str("Ahead"),
            Self::Behind => f.write_str("Behind"),
            Self::OnTrack => f.write_str("On track"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ts_rs::TS)]
#[ts(export)]
pub struct ProgressSummary {
    pub event_id: u64,
    pub status: ProgressStatus,
    /// Points per second the schedule requires overall.
    pub expected_rate: f64,
    pub expected_points: f64,
    /// Points per second so far; `None` at the very start.
    pub current_rate: Option<f64>,
    pub remaining_points: f64,
    /// Points per second needed from now on; `None` once the window closed.
    pub required_rate: Option<f64>,
    /// Distance from the schedule, in points.
    pub point_difference: f64,
    pub percent: f64,
    pub remaining_seconds: i64,
    /// Display text, present only while the event is active.
    pub message: Option<String>,
}

/// Project an event's progress at `now`.
pub fn derive_event_progress(event: &Event, now: UnixTime) -> Result<ProgressSummary> {
    let span = |field: &'static str, a: UnixTime, b: UnixTime| {
        a.checked_sub(b).ok_or_else(|| {
            DerivationError::invalid(field, format!("{a} - {b} is out of range"))
        })
    };

    let total_time = span("end_time", event.end_time, event.start_time)?;
    if total_time <= 0 {
        return Err(DerivationError::invalid(
            "end_time",
            format!("window {}..{} is empty", event.start_time, event.end_time),
        ));
    }
    if event.points_max == 0 {
        return Err(DerivationError::invalid("points_max", "must be positive"));
    }
    let elapsed = span("start_time", now, event.start_time)?;
    if elapsed < 0 {
        return Err(DerivationError::invalid(
            "start_time",
            format!("event starts in {}s", elapsed.unsigned_abs()),
        ));
    }
    let remaining_time = span("end_time", event.end_time, now)?;

    let points = event.points as f64;
    let points_max = event.points_max as f64;
    let expected_rate = points_max / total_time as f64;
    // Multiply first so exact schedules stay exact.
    let expected_points = points_max * elapsed as f64 / total_time as f64;
    let current_rate = (elapsed > 0).then(|| points / elapsed as f64);
    let remaining_points = points_max - points;
    let required_rate = (remaining_time > 0).then(|| remaining_points / remaining_time as f64);

    let status = if points > expected_points + expected_points * AHEAD_BUFFER {
        ProgressStatus::Ahead
    } else if points < expected_points {
        ProgressStatus::Behind
    } else {
        ProgressStatus::OnTrack
    };
    let point_difference = (expected_points - points).abs();

    let message = event
        .is_active()
        .then(|| format!("{status} by {:.0} points", point_difference.round()));

    Ok(ProgressSummary {
        event_id: event.event_id,
        status,
        expected_rate,
        expected_points,
        current_rate,
        remaining_points,
        required_rate,
        point_difference,
        percent: points / points_max * 100.0,
        remaining_seconds: remaining_time,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdbot_types::EventStatus;

    fn event(points: u64) -> Event {
        Event {
            event_id: 9,
            enemy: 1,
            region: 3,
            status: EventStatus::Active,
            points,
            points_max: 100,
            start_time: 0,
            end_time: 1000,
        }
    }

    #[test]
    fn test_tie_break_at_midpoint() {
        let ahead = derive_event_progress(&event(56), 500).expect("derive");
        assert_eq!(ahead.expected_points, 50.0);
        assert_eq!(ahead.status, ProgressStatus::Ahead);
        assert_eq!(ahead.message.as_deref(), Some("Ahead by 6 points"));

        let on_track = derive_event_progress(&event(50), 500).expect("derive");
        assert_eq!(on_track.status, ProgressStatus::OnTrack);
        assert_eq!(on_track.message.as_deref(), Some("On track by 0 points"));

        let behind = derive_event_progress(&event(45), 500).expect("derive");
        assert_eq!(behind.status, ProgressStatus::Behind);
        assert_eq!(behind.message.as_deref(), Some("Behind by 5 points"));
    }

    #[test]
    fn test_inside_buffer_is_on_track() {
        // 55 is exactly the buffered threshold, not above it.
        let p = derive_event_progress(&event(55), 500).expect("derive");
        assert_eq!(p.status, ProgressStatus::OnTrack);
    }

    #[test]
    fn test_rates() {
        let p = derive_event_progress(&event(40), 500).expect("derive");
        assert_eq!(p.expected_rate, 0.1);
        assert_eq!(p.current_rate, Some(0.08));
        assert_eq!(p.remaining_points, 60.0);
        assert_eq!(p.required_rate, Some(0.12));
        assert_eq!(p.remaining_seconds, 500);
        assert_eq!(p.percent, 40.0);
    }

    #[test]
    fn test_rates_absent_at_edges() {
        let start = derive_event_progress(&event(0), 0).expect("derive");
        assert_eq!(start.current_rate, None);

        let end = derive_event_progress(&event(90), 1000).expect("derive");
        assert_eq!(end.required_rate, None);
        let after = derive_event_progress(&event(90), 1200).expect("derive");
        assert_eq!(after.required_rate, None);
        assert_eq!(after.remaining_seconds, -200);
    }

    #[test]
    fn test_terminal_event_has_no_message() {
        let mut e = event(100);
        e.status = EventStatus::Success;
        let p = derive_event_progress(&e, 700).expect("derive");
        assert_eq!(p.status, ProgressStatus::Ahead);
        assert!(p.message.is_none());
    }

    #[test]
    fn test_malformed_events_are_errors() {
        let mut e = event(0);
        e.end_time = 0;
        assert_eq!(derive_event_progress(&e, 0).expect_err("empty").field(), "end_time");

        let mut e = event(0);
        e.points_max = 0;
        assert_eq!(derive_event_progress(&e, 10).expect_err("zero").field(), "points_max");

        let mut e = event(0);
        e.start_time = 100;
        e.end_time = 200;
        assert_eq!(derive_event_progress(&e, 50).expect_err("early").field(), "start_time");
    }

    #[test]
    fn test_out_of_range_window_is_error() {
        let mut e = event(0);
        e.start_time = i64::MIN / 2 - 10;
        e.end_time = i64::MAX / 2 + 10;
        let err = derive_event_progress(&e, 0).expect_err("window overflows");
        assert_eq!(err.field(), "end_time");

        let mut e = event(0);
        e.start_time = i64::MIN + 1;
        e.end_time = i64::MIN + 2;
        let err = derive_event_progress(&e, i64::MAX).expect_err("elapsed overflows");
        assert_eq!(err.field(), "start_time");
    }
}
