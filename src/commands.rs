use anyhow::Context;
use boxscore::config::{self, BoxscoreConfig};
use boxscore::importer::{ImportSummary, Importer};
use boxscore::report;
use boxscore::storage::StatsStore;
use boxscore::ui::{
    failures_table, header, section, stats_table, status, success, summary_row, timing, warn,
    Icons, ImportProgress, TableBuilder,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

/// Import `directory` and print the run summary.
///
/// A run stopped by `stop` still returns its summary; only startup failures
/// are errors.
pub fn run_import(
    directory: &Path,
    database: &Path,
    config: &BoxscoreConfig,
    stop: &AtomicBool,
) -> anyhow::Result<ImportSummary> {
    header("Importing box scores");
    status(Icons::FOLDER, "Input", &directory.display().to_string());
    status(Icons::DATABASE, "Database", &database.display().to_string());

    if !directory.is_dir() {
        anyhow::bail!("input directory not found: {}", directory.display());
    }

    config::ensure_db_dir(database)?;
    let mut store = StatsStore::open(database)
        .with_context(|| format!("cannot open database {}", database.display()))?;
    tracing::info!("Connected to database: {}", database.display());

    let progress = ImportProgress::new();
    let started = Instant::now();

    let summary = Importer::new(&mut store)
        .with_skip_patterns(config.skip_patterns())
        .with_stop_flag(stop)
        .with_observer(&progress)
        .run(directory)?;

    let totals = store.stats()?;
    store.close()?;
    tracing::info!("Database connection closed.");

    section("Summary");
    println!(
        "{}",
        stats_table(&[
            ("Files attempted", summary.attempted.to_string()),
            ("Succeeded", summary.succeeded.to_string()),
            ("Skipped (already imported)", summary.skipped.to_string()),
            ("Failed", summary.failed.to_string()),
            ("Stat rows written", summary.stats_written.to_string()),
            ("Games in database", totals.games.to_string()),
            ("Interrupted", if summary.interrupted { "yes" } else { "no" }.to_string()),
        ])
    );

    if !summary.failures.is_empty() {
        section("Failures");
        println!("{}", failures_table(&summary.failures));
    }

    timing(&format!("Finished in {:.2?}", started.elapsed()));

    if summary.interrupted {
        warn("Import interrupted; files already committed were kept");
    }

    success(&format!("Database saved to {}", database.display()));
    Ok(summary)
}

fn open_existing(database: &Path) -> anyhow::Result<StatsStore> {
    if !database.exists() {
        anyhow::bail!(
            "database not found: {} (import a directory first)",
            database.display()
        );
    }
    StatsStore::open(database).with_context(|| format!("cannot open database {}", database.display()))
}

pub fn run_stats(database: &Path) -> anyhow::Result<()> {
    let store = open_existing(database)?;
    let stats = store.stats()?;

    header(&format!("Boxscore Statistics ({})", database.display()));
    println!(
        "{}",
        stats_table(&[
            ("Games", stats.games.to_string()),
            ("Stat rows", stats.stat_rows.to_string()),
            ("Players", stats.players.to_string()),
            ("Categories", stats.categories.to_string()),
        ])
    );

    let games = store.list_games()?;
    if !games.is_empty() {
        section("Games");
        for game in games {
            let week = game.week.map(|w| format!("Week {}", w)).unwrap_or_else(|| "-".to_string());
            summary_row(&game.date, &format!("{:<8} {}  ({})", week, game.matchup, game.filename));
        }
    }
    Ok(())
}

pub fn run_players(database: &Path, category: &str) -> anyhow::Result<()> {
    let store = open_existing(database)?;
    let players = store.players(category)?;

    header(&format!("Players with {} statistics", category));
    if players.is_empty() {
        warn(&format!("No players found in category '{}'", category));
        return Ok(());
    }

    for player in &players {
        println!("  {} {}", Icons::PERSON, player);
    }
    summary_row("Total:", &players.len().to_string());
    Ok(())
}

pub fn run_player(database: &Path, name: &str, category: &str) -> anyhow::Result<()> {
    let store = open_existing(database)?;
    let lines = store.player_games(name, category)?;

    header(&format!("{} - {}", name, category));
    if lines.is_empty() {
        warn(&format!("No {} statistics recorded for {}", category, name));
        return Ok(());
    }

    for season in report::summarize_seasons(&lines) {
        section(&format!("{} season ({} games)", season.season, season.games));
        let mut table = TableBuilder::new();
        for (stat, total) in &season.totals {
            let average = season.averages.get(stat).copied().unwrap_or_default();
            table.add_row(stat, &format!("{} total, {:.1} per game", total, average));
        }
        println!("{}", table.build());
    }

    section("Game log");
    for line in &lines {
        let week = line.week.map(|w| format!("Week {}", w)).unwrap_or_else(|| "-".to_string());
        let stats: Vec<String> = line
            .stats
            .iter()
            .map(|(stat, value)| match value {
                Some(v) => format!("{}={}", stat, v),
                None => format!("{}=-", stat),
            })
            .collect();
        summary_row(
            &line.date,
            &format!("{:<8} {} [{}]  {}", week, line.matchup, line.team, stats.join(" ")),
        );
    }
    Ok(())
}
