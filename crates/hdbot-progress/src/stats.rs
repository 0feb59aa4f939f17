//! Season-wide statistics totals.

use hdbot_types::{BigCount, CampaignSnapshot};
use serde::Serialize;

use crate::duration::{season_elapsed, SeasonElapsed};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ts_rs::TS)]
#[ts(export)]
pub struct StatisticsTotals {
    pub players: u64,
    pub successful_missions: u64,
    #[ts(type = "string")]
    pub deaths: BigCount,
    #[ts(type = "string")]
    pub kills: BigCount,
    /// Taken from the first faction's `season_duration`.
    pub elapsed: Option<SeasonElapsed>,
}

/// Sum statistics across every faction.
///
/// Deaths and kills are summed as [`BigCount`] so large seasons keep every
/// digit.
pub fn statistics_totals(snapshot: &CampaignSnapshot) -> StatisticsTotals {
    let stats = &snapshot.statistics;
    StatisticsTotals {
        players: stats.iter().fold(0u64, |acc, s| acc.saturating_add(s.players)),
        successful_missions: stats
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.successful_missions)),
        deaths: stats.iter().map(|s| s.deaths).sum(),
        kills: stats.iter().map(|s| s.kills).sum(),
        elapsed: stats.first().map(|s| season_elapsed(s.season_duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdbot_types::FactionStats;

    fn stats(faction_id: u8, deaths: u128) -> FactionStats {
        FactionStats {
            faction_id,
            players: 100,
            successful_missions: 7,
            deaths: BigCount(deaths),
            kills: BigCount(1),
            season_duration: 90_000,
        }
    }

    #[test]
    fn test_totals_keep_precision() {
        let snap = CampaignSnapshot {
            season: 150,
            fetched_at: 0,
            campaigns: vec![],
            attack_events: vec![],
            defend_events: vec![],
            statistics: vec![stats(0, 1 << 53), stats(1, 1), stats(2, 1)],
        };
        let totals = statistics_totals(&snap);
        assert_eq!(totals.players, 300);
        assert_eq!(totals.successful_missions, 21);
        assert_eq!(totals.deaths, BigCount((1 << 53) + 2));
        assert_eq!(totals.kills, BigCount(3));
        assert_eq!(
            totals.elapsed,
            Some(SeasonElapsed { days: 1, hours: 1, minutes: 0 })
        );

        let json = serde_json::to_value(&totals).expect("serialize");
        assert_eq!(json["deaths"], "9007199254740994");
    }

    #[test]
    fn test_empty_statistics() {
        let snap = CampaignSnapshot {
            season: 1,
            fetched_at: 0,
            campaigns: vec![],
            attack_events: vec![],
            defend_events: vec![],
            statistics: vec![],
        };
        let totals = statistics_totals(&snap);
        assert_eq!(totals.deaths, BigCount::ZERO);
        assert!(totals.elapsed.is_none());
    }
}
