//! Time formatting.

use serde::Serialize;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Render a remaining time in two units picked by magnitude.
///
/// Under an hour: minutes and seconds. Under a day: hours and minutes.
/// Otherwise: days and hours. The sign is ignored, so an overdue event
/// reads the same as one that is due. The smaller unit is rounded to the
/// nearest whole value and carries into the larger one.
pub fn humanize_remaining(seconds: i64) -> String {
    let secs = seconds.unsigned_abs();
    let (major_size, major_unit, minor_size, minor_unit) = if secs < HOUR {
        (MINUTE, "minute", 1, "second")
    } else if secs < DAY {
        (HOUR, "hour", MINUTE, "minute")
    } else {
        (DAY, "day", HOUR, "hour")
    };

    let minors = (secs + minor_size / 2) / minor_size;
    let per_major = major_size / minor_size;
    let (major, minor) = (minors / per_major, minors % per_major);

    match (major, minor) {
        (0, m) => unit(m, minor_unit),
        (n, 0) => unit(n, major_unit),
        (n, m) => format!("{}, {}", unit(n, major_unit), unit(m, minor_unit)),
    }
}

fn unit(n: u64, name: &str) -> String {
    if n == 1 {
        format!("1 {name}")
    } else {
        format!("{n} {name}s")
    }
}

/// How far into a season its statistics say it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ts_rs::TS)]
#[ts(export)]
pub struct SeasonElapsed {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

pub fn season_elapsed(season_duration: u64) -> SeasonElapsed {
    SeasonElapsed {
        days: season_duration / DAY,
        hours: (season_duration % DAY) / HOUR,
        minutes: (season_duration % HOUR) / MINUTE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets() {
        assert_eq!(humanize_remaining(303), "5 minutes, 3 seconds");
        assert_eq!(humanize_remaining(2 * 3600 + 61), "2 hours, 1 minute");
        assert_eq!(humanize_remaining(3 * 86400 + 5 * 3600 + 59), "3 days, 5 hours");
    }

    #[test]
    fn test_bucket_edges() {
        assert_eq!(humanize_remaining(3599), "59 minutes, 59 seconds");
        assert_eq!(humanize_remaining(3600), "1 hour");
        assert_eq!(humanize_remaining(86400), "1 day");
        assert_eq!(humanize_remaining(0), "0 seconds");
        assert_eq!(humanize_remaining(1), "1 second");
    }

    #[test]
    fn test_smaller_unit_rounds() {
        assert_eq!(humanize_remaining(2 * 3600 + 60 + 59), "2 hours, 2 minutes");
        assert_eq!(humanize_remaining(2 * 3600 + 60 + 29), "2 hours, 1 minute");
        assert_eq!(humanize_remaining(2 * 3600 + 59 * 60 + 30), "3 hours");
        assert_eq!(humanize_remaining(86400 + 23 * 3600 + 1800), "2 days");
        assert!(humanize_remaining(i64::MIN).contains("days"));
    }

    #[test]
    fn test_negative_uses_magnitude() {
        assert_eq!(humanize_remaining(-90), humanize_remaining(90));
    }

    #[test]
    fn test_season_elapsed() {
        let e = season_elapsed(2 * 86400 + 3 * 3600 + 4 * 60 + 5);
        assert_eq!(e, SeasonElapsed { days: 2, hours: 3, minutes: 4 });
    }
}
