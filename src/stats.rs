//! Aggregate stats over stored matches.

use std::collections::BTreeMap;

use crate::model::MatchRecord;

/// Results on one champion, or over all champions.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionStats {
    /// Champion name, `None` for the overall row.
    pub champion: Option<String>,
    /// Games played.
    pub games: u32,
    /// First place finishes.
    pub wins: u32,
    /// Top four finishes.
    pub top4: u32,
    /// Mean placement.
    pub average_placement: f64,
}

/// Overall and per-champion stats.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    /// All matches.
    pub overall: ChampionStats,
    /// Per champion, most played first, ties by name.
    pub champions: Vec<ChampionStats>,
}

#[derive(Default)]
struct Tally {
    games: u32,
    wins: u32,
    top4: u32,
    placement_sum: u32,
}
impl Tally {
    fn add(&mut self, record: &MatchRecord) {
        self.games += 1;
        self.wins += record.win as u32;
        self.top4 += record.is_top4() as u32;
        self.placement_sum += record.placement as u32;
    }

    fn finish(self, champion: Option<String>) -> ChampionStats {
        ChampionStats {
            champion,
            games: self.games,
            wins: self.wins,
            top4: self.top4,
            average_placement: if 0 == self.games {
                0.0
            } else {
                self.placement_sum as f64 / self.games as f64
            },
        }
    }
}

/// Aggregate `matches`.
pub fn aggregate(matches: &[MatchRecord]) -> StatsReport {
    let mut overall = Tally::default();
    let mut per_champion = BTreeMap::<&str, Tally>::new();
    for record in matches {
        overall.add(record);
        per_champion.entry(record.champion.as_str()).or_default().add(record);
    }

    let mut champions = per_champion
        .into_iter()
        .map(|(name, tally)| tally.finish(Some(name.to_owned())))
        .collect::<Vec<_>>();
    // Stable sort keeps the BTreeMap's name order for ties.
    champions.sort_by(|a, b| b.games.cmp(&a.games));
    StatsReport {
        overall: overall.finish(None),
        champions,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(champion: &str, placement: u8) -> MatchRecord {
        MatchRecord {
            puuid: "p".to_owned(),
            match_id: format!("{}-{}", champion, placement),
            champion: champion.to_owned(),
            placement,
            win: 1 == placement,
            game_creation: 0,
            game_end: None,
            game_version: "14.23.1".to_owned(),
            patch: "14.23".to_owned(),
            season: 2024,
        }
    }

    #[test]
    fn test_aggregate() {
        let report = aggregate(&[
            record("Ahri", 1),
            record("Ahri", 5),
            record("Garen", 4),
            record("Ahri", 3),
            record("Bard", 8),
        ]);
        assert_eq!(5, report.overall.games);
        assert_eq!(1, report.overall.wins);
        assert_eq!(3, report.overall.top4);
        assert_eq!(21.0 / 5.0, report.overall.average_placement);

        let names = report
            .champions
            .iter()
            .map(|c| c.champion.as_deref().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(vec!["Ahri", "Bard", "Garen"], names);
        assert_eq!(3, report.champions[0].games);
        assert_eq!(2, report.champions[0].top4);
        assert_eq!(3.0, report.champions[0].average_placement);
    }

    #[test]
    fn test_aggregate_empty() {
        let report = aggregate(&[]);
        assert_eq!(0, report.overall.games);
        assert_eq!(0.0, report.overall.average_placement);
        assert!(report.champions.is_empty());
    }
}
