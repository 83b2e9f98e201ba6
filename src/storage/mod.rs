//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - games(id, matchup, date, week, filename), unique on (matchup, date)
//! - stats(id, game_id, player, team, category, stat_name, stat_value, raw_value)
//!
//! Statistics are stored in long format, so previously unseen statistic
//! names need no schema change.

pub mod schema;
pub mod sqlite;

pub use sqlite::{StatsStore, UpsertedGame, StoredGame, StoredStat, DbStats};
