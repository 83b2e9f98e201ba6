//! SQLite storage implementation

use std::collections::{HashMap, HashSet};
use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use crate::Result;
use crate::boxscore::{StatRecord, StatValue, TEAM_TOTAL};
use crate::report::PlayerGameLine;
use super::schema;

/// SQLite-backed storage for games and long-format statistics
pub struct StatsStore {
    conn: Connection,
    stat_storage_ready: bool,
    /// Statistic names already seen, per category
    known_stats: HashMap<String, HashSet<String>>,
}

/// Result of [`StatsStore::upsert_game`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertedGame {
    pub id: i64,
    /// false when the (matchup, date) pair already existed
    pub created: bool,
}

impl StatsStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        Self::initialize(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(schema::PRAGMAS)?;
        let mut store = Self {
            conn,
            stat_storage_ready: false,
            known_stats: HashMap::new(),
        };
        store.ensure_games_table()?;
        store.ensure_stat_tables()?;
        Ok(store)
    }

    /// Close the connection, surfacing any error from SQLite
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }

    // ========== Game Operations ==========

    /// Create the games table if absent
    pub fn ensure_games_table(&self) -> Result<()> {
        self.conn.execute(schema::CREATE_GAMES_TABLE, [])?;
        Ok(())
    }

    /// Insert a game unless its (matchup, date) pair exists; return its id either way
    pub fn upsert_game(
        &self,
        matchup: &str,
        date: &str,
        week: Option<i64>,
        filename: &str,
    ) -> Result<UpsertedGame> {
        let inserted = self.conn.execute(
            r#"
            INSERT INTO games (matchup, date, week, filename)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(matchup, date) DO NOTHING
            "#,
            params![matchup, date, week, filename],
        )?;

        if inserted == 1 {
            return Ok(UpsertedGame {
                id: self.conn.last_insert_rowid(),
                created: true,
            });
        }

        let id = self.conn.query_row(
            "SELECT id FROM games WHERE matchup = ?1 AND date = ?2",
            params![matchup, date],
            |row| row.get(0),
        )?;
        Ok(UpsertedGame { id, created: false })
    }

    /// Get a game by its natural key
    pub fn find_game(&self, matchup: &str, date: &str) -> Result<Option<StoredGame>> {
        self.conn
            .query_row(
                "SELECT id, matchup, date, week, filename FROM games WHERE matchup = ?1 AND date = ?2",
                params![matchup, date],
                |row| self.row_to_game(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// All games ordered by date
    pub fn list_games(&self) -> Result<Vec<StoredGame>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, matchup, date, week, filename FROM games ORDER BY date, id"
        )?;

        let games = stmt
            .query_map([], |row| self.row_to_game(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(games)
    }

    /// Count all games
    pub fn count_games(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_game(&self, row: &rusqlite::Row) -> rusqlite::Result<StoredGame> {
        Ok(StoredGame {
            id: row.get(0)?,
            matchup: row.get(1)?,
            date: row.get(2)?,
            week: row.get(3)?,
            filename: row.get(4)?,
        })
    }

    // ========== Stat Operations ==========

    fn ensure_stat_tables(&mut self) -> Result<()> {
        if !self.stat_storage_ready {
            for stmt in schema::stat_storage_statements() {
                self.conn.execute(stmt, [])?;
            }
            self.stat_storage_ready = true;
        }
        Ok(())
    }

    /// Make sure statistics for `category` can be stored.
    ///
    /// Storage is a single long-format table, so no DDL runs per category.
    /// Returns the names in `observed_fields` that the category had never
    /// carried before.
    pub fn ensure_stat_storage(
        &mut self,
        category: &str,
        observed_fields: &[&str],
    ) -> Result<Vec<String>> {
        self.ensure_stat_tables()?;

        if !self.known_stats.contains_key(category) {
            let existing: HashSet<String> = self.stat_names(category)?.into_iter().collect();
            self.known_stats.insert(category.to_string(), existing);
        }

        let mut new_fields = Vec::new();
        if let Some(known) = self.known_stats.get_mut(category) {
            for field in observed_fields {
                if known.insert((*field).to_string()) {
                    tracing::info!("New statistic in [{}]: {}", category, field);
                    new_fields.push((*field).to_string());
                }
            }
        }
        Ok(new_fields)
    }

    /// Append one statistic row
    pub fn record_stat(
        &self,
        game_id: i64,
        team: &str,
        category: &str,
        player: &str,
        stat_name: &str,
        value: &StatValue,
    ) -> Result<()> {
        if let Some(raw) = value.raw() {
            tracing::warn!(
                "Non-numeric value for {}/{}/{}.{} stored as NULL: {:?}",
                team, category, player, stat_name, raw
            );
        }

        self.conn.execute(
            r#"
            INSERT INTO stats (game_id, player, team, category, stat_name, stat_value, raw_value)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                game_id,
                player,
                team,
                category,
                stat_name,
                value.as_number(),
                value.raw(),
            ],
        )?;
        Ok(())
    }

    /// Append a flattened record
    pub fn record(&self, game_id: i64, record: &StatRecord) -> Result<()> {
        self.record_stat(
            game_id,
            &record.team,
            &record.category,
            &record.player,
            &record.stat_name,
            &record.value,
        )
    }

    /// Distinct statistic names stored for a category
    pub fn stat_names(&self, category: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT stat_name FROM stats WHERE category = ?1 ORDER BY stat_name"
        )?;

        let names = stmt
            .query_map([category], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(names)
    }

    /// All statistics recorded for a game
    pub fn stats_for_game(&self, game_id: i64) -> Result<Vec<StoredStat>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT game_id, player, team, category, stat_name, stat_value, raw_value
            FROM stats WHERE game_id = ?1 ORDER BY id
            "#
        )?;

        let stats = stmt
            .query_map([game_id], |row| {
                Ok(StoredStat {
                    game_id: row.get(0)?,
                    player: row.get(1)?,
                    team: row.get(2)?,
                    category: row.get(3)?,
                    stat_name: row.get(4)?,
                    stat_value: row.get(5)?,
                    raw_value: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(stats)
    }

    /// Count all stat rows
    pub fn count_stats(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM stats", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Report Queries ==========

    /// Distinct named players in a category, team totals excluded
    pub fn players(&self, category: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT player FROM stats
            WHERE category = ?1 AND player <> '' AND player <> ?2
            ORDER BY player
            "#
        )?;

        let players = stmt
            .query_map(params![category, TEAM_TOTAL], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(players)
    }

    /// One line per game a player recorded statistics in, ordered by date
    pub fn player_games(&self, player: &str, category: &str) -> Result<Vec<PlayerGameLine>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT g.id, g.matchup, g.date, g.week, s.team, s.stat_name, s.stat_value
            FROM stats s
            JOIN games g ON g.id = s.game_id
            WHERE s.player = ?1 AND s.category = ?2
            ORDER BY g.date, g.id, s.id
            "#
        )?;

        let mut rows = stmt.query(params![player, category])?;
        let mut lines: Vec<PlayerGameLine> = Vec::new();

        while let Some(row) = rows.next()? {
            let game_id: i64 = row.get(0)?;
            let stat_name: String = row.get(5)?;
            let stat_value: Option<f64> = row.get(6)?;

            match lines.last_mut() {
                Some(line) if line.game_id == game_id => {
                    line.stats.insert(stat_name, stat_value);
                }
                _ => {
                    let mut line = PlayerGameLine {
                        game_id,
                        matchup: row.get(1)?,
                        date: row.get(2)?,
                        week: row.get(3)?,
                        team: row.get(4)?,
                        stats: Default::default(),
                    };
                    line.stats.insert(stat_name, stat_value);
                    lines.push(line);
                }
            }
        }

        Ok(lines)
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        // Names seen inside the aborted transaction are reseeded from disk
        self.known_stats.clear();
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let players: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT player) FROM stats WHERE player <> ?1",
            [TEAM_TOTAL],
            |row| row.get(0),
        )?;
        let categories: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT category) FROM stats",
            [],
            |row| row.get(0),
        )?;

        Ok(DbStats {
            games: self.count_games()?,
            stat_rows: self.count_stats()?,
            players: players as usize,
            categories: categories as usize,
        })
    }
}

/// Persisted game row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGame {
    pub id: i64,
    pub matchup: String,
    pub date: String,
    pub week: Option<i64>,
    pub filename: String,
}

/// Persisted statistic row
#[derive(Debug, Clone, PartialEq)]
pub struct StoredStat {
    pub game_id: i64,
    pub player: String,
    pub team: String,
    pub category: String,
    pub stat_name: String,
    pub stat_value: Option<f64>,
    pub raw_value: Option<String>,
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub games: usize,
    pub stat_rows: usize,
    pub players: usize,
    pub categories: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Games: {}", self.games)?;
        writeln!(f, "  Stat rows: {}", self.stat_rows)?;
        writeln!(f, "  Players: {}", self.players)?;
        writeln!(f, "  Categories: {}", self.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn sample_game(store: &StatsStore) -> i64 {
        store
            .upsert_game("Denver Broncos vs Seattle Seahawks", "2025-09-07", Some(1), "week1.json")
            .unwrap()
            .id
    }

    #[test]
    fn test_upsert_game_is_idempotent() {
        let store = StatsStore::open_in_memory().unwrap();

        let first = store.upsert_game("A vs B", "2025-09-07", Some(1), "a.json").unwrap();
        let second = store.upsert_game("A vs B", "2025-09-07", Some(1), "b.json").unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.id, second.id);
        assert_eq!(store.count_games().unwrap(), 1);

        let game = store.find_game("A vs B", "2025-09-07").unwrap().unwrap();
        assert_eq!(game.filename, "a.json");
        assert_eq!(game.week, Some(1));
    }

    #[test]
    fn test_same_matchup_other_date_is_new_game() {
        let store = StatsStore::open_in_memory().unwrap();

        store.upsert_game("A vs B", "2025-09-07", Some(1), "a.json").unwrap();
        let rematch = store.upsert_game("A vs B", "2025-12-14", Some(15), "b.json").unwrap();

        assert!(rematch.created);
        assert_eq!(store.list_games().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_matchup_is_persistence_error() {
        let store = StatsStore::open_in_memory().unwrap();
        let err = store.upsert_game("", "2025-09-07", None, "a.json").unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn test_record_stat_values() {
        let store = StatsStore::open_in_memory().unwrap();
        let game_id = sample_game(&store);

        store
            .record_stat(game_id, "Denver Broncos", "passing", "P1", "yards", &StatValue::Number(250.0))
            .unwrap();
        store
            .record_stat(game_id, "Denver Broncos", "passing", "P1", "comp_att", &StatValue::Text("18/27".into()))
            .unwrap();
        store
            .record_stat(game_id, "Denver Broncos", "passing", "P1", "rating", &StatValue::Null)
            .unwrap();

        let stats = store.stats_for_game(game_id).unwrap();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].stat_value, Some(250.0));
        assert_eq!(stats[0].raw_value, None);
        assert_eq!(stats[1].stat_value, None);
        assert_eq!(stats[1].raw_value.as_deref(), Some("18/27"));
        assert_eq!(stats[2].stat_value, None);
        assert_eq!(stats[2].raw_value, None);
    }

    #[test]
    fn test_record_stat_rejects_unknown_game() {
        let store = StatsStore::open_in_memory().unwrap();
        let err = store
            .record_stat(999, "A", "passing", "P1", "yards", &StatValue::Number(1.0))
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn test_record_stat_rejects_empty_name() {
        let store = StatsStore::open_in_memory().unwrap();
        let game_id = sample_game(&store);
        let err = store
            .record_stat(game_id, "A", "passing", "P1", "", &StatValue::Number(1.0))
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn test_ensure_stat_storage_reports_new_fields() {
        let mut store = StatsStore::open_in_memory().unwrap();
        let game_id = sample_game(&store);

        let new = store.ensure_stat_storage("passing", &["yards", "tds"]).unwrap();
        assert_eq!(new, vec!["yards", "tds"]);

        let new = store.ensure_stat_storage("passing", &["yards", "ints"]).unwrap();
        assert_eq!(new, vec!["ints"]);

        // Names already on disk are not reported as new after a reseed
        store
            .record_stat(game_id, "A", "rushing", "RB", "att", &StatValue::Number(10.0))
            .unwrap();
        store.known_stats.clear();
        let new = store.ensure_stat_storage("rushing", &["att", "long"]).unwrap();
        assert_eq!(new, vec!["long"]);
    }

    #[test]
    fn test_rollback_discards_file_writes() {
        let mut store = StatsStore::open_in_memory().unwrap();

        store.begin_transaction().unwrap();
        let game = store.upsert_game("A vs B", "2025-09-07", None, "a.json").unwrap();
        store
            .record_stat(game.id, "A", "passing", "P1", "yards", &StatValue::Number(1.0))
            .unwrap();
        store.rollback().unwrap();

        assert_eq!(store.count_games().unwrap(), 0);
        assert_eq!(store.count_stats().unwrap(), 0);
    }

    #[test]
    fn test_players_and_player_games() {
        let store = StatsStore::open_in_memory().unwrap();
        let week1 = store.upsert_game("A vs B", "2025-09-07", Some(1), "w1.json").unwrap().id;
        let week2 = store.upsert_game("A vs C", "2025-09-14", Some(2), "w2.json").unwrap().id;

        for (game_id, yards) in [(week2, 80.0), (week1, 120.0)] {
            store
                .record_stat(game_id, "A", "rushing", "RB1", "yards", &StatValue::Number(yards))
                .unwrap();
            store
                .record_stat(game_id, "A", "rushing", "RB1", "att", &StatValue::Number(20.0))
                .unwrap();
        }
        store
            .record_stat(week1, "A", "rushing", "Team Total", "yards", &StatValue::Number(150.0))
            .unwrap();
        store
            .record_stat(week1, "B", "rushing", "Another Back", "yards", &StatValue::Number(30.0))
            .unwrap();

        assert_eq!(store.players("rushing").unwrap(), vec!["Another Back", "RB1"]);

        let lines = store.player_games("RB1", "rushing").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].date, "2025-09-07");
        assert_eq!(lines[0].stats.get("yards"), Some(&Some(120.0)));
        assert_eq!(lines[1].week, Some(2));
        assert_eq!(lines[1].stats.len(), 2);

        let stats = store.stats().unwrap();
        assert_eq!(stats.games, 2);
        assert_eq!(stats.stat_rows, 6);
        assert_eq!(stats.players, 2);
        assert_eq!(stats.categories, 1);
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.db");

        {
            let store = StatsStore::open(&path).unwrap();
            sample_game(&store);
            store.close().unwrap();
        }

        let store = StatsStore::open(&path).unwrap();
        assert_eq!(store.count_games().unwrap(), 1);
        let again = store
            .upsert_game("Denver Broncos vs Seattle Seahawks", "2025-09-07", Some(1), "copy.json")
            .unwrap();
        assert!(!again.created);
    }
}
