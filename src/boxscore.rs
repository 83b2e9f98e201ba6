//! Box score model - game info and flattened statistics
//!
//! A box score document carries a `game_info` object plus team data in one of
//! three known layouts, probed in this order:
//! - `game_info.teams.<team>.<category>`
//! - `game_info.final_score.<team>.teams.<team>.<category>`
//! - `teams.<team>.<category>` at the top level
//!
//! Each category holds either a list of per-player dictionaries or a single
//! team-total dictionary. Every field other than `player` becomes one
//! [`StatRecord`].

use crate::{Error, Result};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Player name recorded for team-total dictionaries and entries without a player
pub const TEAM_TOTAL: &str = "Team Total";

/// Key naming the player inside a statistic dictionary
pub const PLAYER_KEY: &str = "player";

/// Date layouts tried in order before the raw string is kept
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%A, %B %d, %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
];

/// Team name paired with its category map, borrowed from the document
pub type TeamCategories<'a> = (String, &'a Map<String, Value>);

/// Game-level information extracted from `game_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    /// `"<team> vs <team>"`, or the document's explicit matchup
    pub matchup: String,
    /// ISO `YYYY-MM-DD` when a known layout parsed, otherwise the raw string
    pub date: String,
    /// Season week, when present and numeric
    pub week: Option<i64>,
    /// Source file name
    pub filename: String,
}

impl GameInfo {
    /// Extract game info from a parsed box score document.
    ///
    /// Fails with [`Error::Schema`] when `game_info` or its date is missing, or
    /// when a two-team matchup cannot be derived without guessing.
    pub fn extract(document: &Value, filename: impl Into<String>) -> Result<Self> {
        let game_info = document
            .get("game_info")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::Schema("missing `game_info` object".to_string()))?;

        let date = match game_info.get("date") {
            Some(Value::String(raw)) if !raw.trim().is_empty() => normalize_date(raw),
            _ => {
                return Err(Error::Schema(
                    "`game_info.date` must be a non-empty string".to_string(),
                ))
            }
        };

        let matchup = derive_matchup(document, game_info)?;
        let week = game_info.get("week").and_then(parse_week);

        Ok(Self {
            matchup,
            date,
            week,
            filename: filename.into(),
        })
    }
}

/// Normalize a date string to `YYYY-MM-DD`, or return it unchanged.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}

fn derive_matchup(document: &Value, game_info: &Map<String, Value>) -> Result<String> {
    if let Some(explicit) = game_info.get("matchup").and_then(Value::as_str) {
        let explicit = explicit.trim();
        if !explicit.is_empty() {
            return Ok(explicit.to_string());
        }
    }

    let scored: Vec<String> = game_info
        .get("final_score")
        .and_then(Value::as_object)
        .map(|final_score| {
            final_score
                .iter()
                .filter(|(_, value)| is_team_like(value))
                .map(|(team, _)| team.clone())
                .collect()
        })
        .unwrap_or_default();

    // A score block without team keys says nothing about the teams
    let (source, teams) = if scored.is_empty() {
        let located: Vec<String> = locate_team_stats(document)
            .into_iter()
            .map(|(team, _)| team)
            .collect();
        ("teams", located)
    } else {
        ("final_score", scored)
    };

    match teams.as_slice() {
        [first, second] => Ok(format!("{} vs {}", first, second)),
        [] | [_] => Err(Error::Schema(format!(
            "cannot derive a two-team matchup from `{}`: found {} team key(s)",
            source,
            teams.len()
        ))),
        _ => Err(Error::Schema(format!(
            "ambiguous matchup: `{}` has {} team-like keys ({})",
            source,
            teams.len(),
            teams.join(", ")
        ))),
    }
}

/// Scores (numbers or numeric strings) and nested team objects count as teams
fn is_team_like(value: &Value) -> bool {
    match value {
        Value::Number(_) | Value::Object(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

fn parse_week(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            let digits = match s.get(..4) {
                Some(prefix) if prefix.eq_ignore_ascii_case("week") => s[4..].trim(),
                _ => s,
            };
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Locate the team → category data in any of the known layouts.
///
/// Returns an empty list when the document carries no team statistics.
pub fn locate_team_stats(document: &Value) -> Vec<TeamCategories<'_>> {
    let game_info = document.get("game_info").and_then(Value::as_object);

    if let Some(teams) = game_info
        .and_then(|info| info.get("teams"))
        .and_then(Value::as_object)
    {
        let entries = team_entries(teams);
        if !entries.is_empty() {
            return entries;
        }
    }

    if let Some(final_score) = game_info
        .and_then(|info| info.get("final_score"))
        .and_then(Value::as_object)
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for nested in final_score
            .values()
            .filter_map(|score| score.get("teams"))
            .filter_map(Value::as_object)
        {
            for (team, categories) in team_entries(nested) {
                if seen.insert(team.clone()) {
                    entries.push((team, categories));
                }
            }
        }
        if !entries.is_empty() {
            return entries;
        }
    }

    document
        .get("teams")
        .and_then(Value::as_object)
        .map(team_entries)
        .unwrap_or_default()
}

fn team_entries(teams: &Map<String, Value>) -> Vec<TeamCategories<'_>> {
    teams
        .iter()
        .filter_map(|(team, categories)| categories.as_object().map(|c| (team.clone(), c)))
        .collect()
}

/// A single statistic value as found in the source document.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    /// A JSON number or a string that parses as one
    Number(f64),
    /// Anything that is not numeric, kept verbatim
    Text(String),
    /// JSON `null`
    Null,
}

impl StatValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(StatValue::Number)
                .unwrap_or_else(|| StatValue::Text(n.to_string())),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => StatValue::Number(f),
                _ => StatValue::Text(s.clone()),
            },
            Value::Null => StatValue::Null,
            other => StatValue::Text(other.to_string()),
        }
    }

    /// The numeric value, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The raw text for values that could not be stored as numbers
    pub fn raw(&self) -> Option<&str> {
        match self {
            StatValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One long-format statistic: (team, category, player, stat name) → value.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub team: String,
    pub category: String,
    pub player: String,
    pub stat_name: String,
    pub value: StatValue,
}

/// Flatten located team data into one record per statistic field.
pub fn flatten_team_stats(teams: &[TeamCategories<'_>]) -> Vec<StatRecord> {
    let mut records = Vec::new();

    for (team, categories) in teams {
        for (category, entries) in categories.iter() {
            match entries {
                Value::Array(players) => {
                    for entry in players {
                        match entry.as_object() {
                            Some(stats) => push_stat_dict(&mut records, team, category, stats),
                            None => tracing::debug!(
                                "Skipping non-object entry in {}/{}: {}",
                                team,
                                category,
                                entry
                            ),
                        }
                    }
                }
                Value::Object(totals) => push_stat_dict(&mut records, team, category, totals),
                other => tracing::debug!(
                    "Skipping scalar category {}/{}: {}",
                    team,
                    category,
                    other
                ),
            }
        }
    }

    records
}

fn push_stat_dict(
    records: &mut Vec<StatRecord>,
    team: &str,
    category: &str,
    stats: &Map<String, Value>,
) {
    let player = match stats.get(PLAYER_KEY) {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
        Some(Value::Number(id)) => id.to_string(),
        _ => TEAM_TOTAL.to_string(),
    };

    for (stat_name, value) in stats.iter().filter(|(key, _)| key.as_str() != PLAYER_KEY) {
        records.push(StatRecord {
            team: team.to_string(),
            category: category.to_string(),
            player: player.clone(),
            stat_name: stat_name.clone(),
            value: StatValue::from_json(value),
        });
    }
}
