//! Boxscore CLI - import NFL box score JSON into SQLite and report on it

mod commands;

use boxscore::config;
use boxscore::interrupt;
use boxscore::logging::LogSession;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "boxscore")]
#[command(version)]
#[command(about = "Import NFL box score JSON files into a long-format SQLite database")]
#[command(long_about = r#"
Boxscore walks a directory of per-game box score JSON files and stores every
player and team statistic as one row, so new statistic names never need a
schema change. Games are keyed by matchup and date; re-imports are skipped.

Example usage:
  boxscore ./NFL_2025_week_1
  boxscore ./NFL_2025_week_1 --db week1_stats.db
  boxscore players --category rushing
  boxscore player "Bo Nix" --category passing
"#)]
struct Cli {
    /// Directory of box score JSON files to import
    directory: Option<PathBuf>,

    /// Path to the database file [default: nfl_season_stats.db]
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to the config file [default: boxscore.toml, when present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file appended to during imports [default: boxscore.log]
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statistics about the imported database
    Stats,

    /// List players with statistics in a category
    Players {
        /// Statistic category
        #[arg(short, long, default_value = "rushing")]
        category: String,
    },

    /// Season totals and game log for one player
    Player {
        /// Player name as it appears in the box scores
        name: String,

        /// Statistic category
        #[arg(short, long, default_value = "rushing")]
        category: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(path) = cli.config.as_deref() {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
    }
    let config = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let database = config.database_path(cli.db.as_deref());

    match (cli.command, cli.directory) {
        (Some(command), _) => {
            let _log = LogSession::init(cli.verbose, None)?;
            match command {
                Commands::Stats => commands::run_stats(&database)?,
                Commands::Players { category } => commands::run_players(&database, &category)?,
                Commands::Player { name, category } => {
                    commands::run_player(&database, &name, &category)?
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        (None, Some(directory)) => {
            let log_file = config.log_file_path(cli.log_file.as_deref());
            let _log = LogSession::init(cli.verbose, Some(&log_file))?;
            let stop = interrupt::install();
            commands::run_import(&directory, &database, &config, stop)?;
            Ok(ExitCode::SUCCESS)
        }
        (None, None) => {
            Cli::command().print_help()?;
            Ok(ExitCode::from(2))
        }
    }
}
