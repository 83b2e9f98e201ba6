//! # Boxscore - NFL box score importer
//!
//! Ingests directories of per-game JSON box scores into a single SQLite file.
//!
//! Boxscore provides:
//! - Extraction of game info and per-team/per-category/per-player statistics
//!   from the known box score layouts
//! - A long-format statistics store that accepts new statistic names without DDL
//! - Per-file transactional import with failure isolation
//! - Season and per-player reports over the imported data

pub mod boxscore;
pub mod storage;
pub mod discover;
pub mod importer;
pub mod report;
pub mod config;
pub mod interrupt;
pub mod logging;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use boxscore::{GameInfo, StatRecord, StatValue};
pub use importer::{FileOutcome, FileStage, ImportObserver, ImportSummary, Importer};
pub use storage::StatsStore;

/// Result type alias for Boxscore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Boxscore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Short label used in import summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Parse(_) => "parse",
            Error::Schema(_) => "schema",
            Error::Persistence(_) => "persistence",
            Error::Io(_) => "io",
            Error::InvalidInput(_) => "input",
        }
    }
}
