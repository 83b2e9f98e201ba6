//! Database schema definitions

/// SQL to create the games table
pub const CREATE_GAMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    matchup TEXT NOT NULL CHECK (length(matchup) > 0),
    date TEXT NOT NULL CHECK (length(date) > 0),
    week INTEGER,
    filename TEXT NOT NULL,
    UNIQUE(matchup, date)
)
"#;

/// SQL to create the long-format statistics table
/// One row per (game, team, player, category, stat_name)
pub const CREATE_STATS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stats (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id INTEGER NOT NULL REFERENCES games(id),
    player TEXT NOT NULL,
    team TEXT NOT NULL CHECK (length(team) > 0),
    category TEXT NOT NULL CHECK (length(category) > 0),
    stat_name TEXT NOT NULL CHECK (length(stat_name) > 0),
    stat_value REAL,
    raw_value TEXT
)
"#;

/// SQL to create the stats indexes
pub const CREATE_STATS_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_stats_game ON stats(game_id)",
    "CREATE INDEX IF NOT EXISTS idx_stats_player ON stats(player, category)",
    "CREATE INDEX IF NOT EXISTS idx_stats_category ON stats(category, stat_name)",
];

/// Connection settings applied on open
pub const PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Statements backing the statistics storage
pub fn stat_storage_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_STATS_TABLE];
    stmts.extend(CREATE_STATS_INDEXES.iter().copied());
    stmts
}
