//! Season reports over imported statistics
//!
//! An NFL season runs from September 1 through the end of February, so games
//! in January and February belong to the season that started the previous
//! year.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// First month of a season (September)
const SEASON_START_MONTH: u32 = 9;
/// Last month of a season, in the following calendar year (February)
const SEASON_END_MONTH: u32 = 2;

/// A player's statistics for one game in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerGameLine {
    pub game_id: i64,
    pub matchup: String,
    pub date: String,
    pub week: Option<i64>,
    pub team: String,
    /// Stat name → numeric value (`None` when stored as NULL)
    pub stats: BTreeMap<String, Option<f64>>,
}

/// Aggregates for one player over one season.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonSummary {
    /// Calendar year the season started in
    pub season: i32,
    pub games: usize,
    pub totals: BTreeMap<String, f64>,
    /// Per-game averages over games where the stat was numeric
    pub averages: BTreeMap<String, f64>,
}

/// Season year for an ISO `YYYY-MM-DD` date, `None` outside the season window
/// or when the date never normalized.
pub fn season_of(date: &str) -> Option<i32> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    match date.month() {
        m if m >= SEASON_START_MONTH => Some(date.year()),
        m if m <= SEASON_END_MONTH => Some(date.year() - 1),
        _ => None,
    }
}

/// Group game lines by season and aggregate each season's statistics.
///
/// Lines whose date falls outside any season are left out. Seasons are
/// returned oldest first.
pub fn summarize_seasons(lines: &[PlayerGameLine]) -> Vec<SeasonSummary> {
    let mut by_season: BTreeMap<i32, Vec<&PlayerGameLine>> = BTreeMap::new();
    for line in lines {
        match season_of(&line.date) {
            Some(season) => by_season.entry(season).or_default().push(line),
            None => tracing::debug!("Game {} on {} is outside any season", line.game_id, line.date),
        }
    }

    by_season
        .into_iter()
        .map(|(season, games)| {
            let mut totals: BTreeMap<String, f64> = BTreeMap::new();
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();

            for line in &games {
                for (name, value) in &line.stats {
                    if let Some(value) = value {
                        *totals.entry(name.clone()).or_default() += value;
                        *counts.entry(name.clone()).or_default() += 1;
                    }
                }
            }

            let averages = totals
                .iter()
                .map(|(name, total)| {
                    let n = counts.get(name).copied().unwrap_or(1).max(1);
                    (name.clone(), total / n as f64)
                })
                .collect();

            SeasonSummary {
                season,
                games: games.len(),
                totals,
                averages,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(game_id: i64, date: &str, stats: &[(&str, Option<f64>)]) -> PlayerGameLine {
        PlayerGameLine {
            game_id,
            matchup: "A vs B".to_string(),
            date: date.to_string(),
            week: None,
            team: "A".to_string(),
            stats: stats.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_season_of() {
        assert_eq!(season_of("2025-09-07"), Some(2025));
        assert_eq!(season_of("2025-12-28"), Some(2025));
        assert_eq!(season_of("2026-01-11"), Some(2025));
        assert_eq!(season_of("2026-02-08"), Some(2025));
        assert_eq!(season_of("2025-06-01"), None);
        assert_eq!(season_of("September 7, 2025"), None);
    }

    #[test]
    fn test_summarize_seasons() {
        let lines = vec![
            line(1, "2024-09-08", &[("yards", Some(100.0)), ("att", Some(20.0))]),
            line(2, "2025-01-05", &[("yards", Some(50.0)), ("att", None)]),
            line(3, "2025-09-07", &[("yards", Some(75.0))]),
            line(4, "2025-07-01", &[("yards", Some(999.0))]),
        ];

        let seasons = summarize_seasons(&lines);
        assert_eq!(seasons.len(), 2);

        let first = &seasons[0];
        assert_eq!(first.season, 2024);
        assert_eq!(first.games, 2);
        assert_eq!(first.totals["yards"], 150.0);
        assert_eq!(first.averages["yards"], 75.0);
        // Only one game carried a numeric attempt count
        assert_eq!(first.totals["att"], 20.0);
        assert_eq!(first.averages["att"], 20.0);

        let second = &seasons[1];
        assert_eq!(second.season, 2025);
        assert_eq!(second.games, 1);
        assert_eq!(second.totals["yards"], 75.0);
    }
}
