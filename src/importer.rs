//! Batch importer - discovers box score files and persists them one by one
//!
//! Every file moves through
//! `Discovered → Parsed → GameResolved → StatsFlattened → Committed`, or ends
//! in `Failed` at whichever stage raised. A file's writes are one transaction,
//! so a failure anywhere leaves nothing of that file behind. Failures never
//! stop the batch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use crate::boxscore::{self, GameInfo, StatRecord};
use crate::discover::JsonDiscovery;
use crate::storage::StatsStore;
use crate::{Error, Result};

/// Stage a file reached during import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    Discovered,
    Parsed,
    GameResolved,
    StatsFlattened,
    Committed,
}

impl FileStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStage::Discovered => "discovered",
            FileStage::Parsed => "parsed",
            FileStage::GameResolved => "game-resolved",
            FileStage::StatsFlattened => "stats-flattened",
            FileStage::Committed => "committed",
        }
    }
}

impl std::fmt::Display for FileStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal result for one file
#[derive(Debug)]
pub enum FileOutcome {
    Committed { game_id: i64, stats: usize },
    /// The game's (matchup, date) was already imported
    Skipped { game_id: i64 },
    Failed { stage: FileStage, error: Error },
}

/// Receives per-file progress from an [`Importer`] run
pub trait ImportObserver {
    fn started(&self, _total: usize) {}
    fn file_finished(&self, _path: &Path, _outcome: &FileOutcome) {}
    fn finished(&self, _summary: &ImportSummary) {}
}

/// A file that failed to import
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub stage: FileStage,
    pub kind: &'static str,
    pub message: String,
}

/// Totals for one import run
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub stats_written: usize,
    pub failures: Vec<FileFailure>,
    /// The run stopped early on request; remaining files were not attempted
    pub interrupted: bool,
}

impl ImportSummary {
    fn record(&mut self, path: &Path, outcome: &FileOutcome) {
        self.attempted += 1;
        match outcome {
            FileOutcome::Committed { stats, .. } => {
                self.succeeded += 1;
                self.stats_written += stats;
            }
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { stage, error } => {
                self.failed += 1;
                self.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    stage: *stage,
                    kind: error.kind(),
                    message: error.to_string(),
                });
            }
        }
    }
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Import Summary:")?;
        writeln!(f, "  Attempted: {}", self.attempted)?;
        writeln!(f, "  Succeeded: {}", self.succeeded)?;
        writeln!(f, "  Skipped: {}", self.skipped)?;
        writeln!(f, "  Failed: {}", self.failed)?;
        write!(f, "  Stat rows: {}", self.stats_written)?;
        if self.interrupted {
            write!(f, "\n  Interrupted before all files were attempted")?;
        }
        Ok(())
    }
}

/// Imports a directory of box score files into a [`StatsStore`]
pub struct Importer<'a> {
    store: &'a mut StatsStore,
    skip_patterns: Vec<String>,
    stop: Option<&'a AtomicBool>,
    observer: Option<&'a dyn ImportObserver>,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a mut StatsStore) -> Self {
        Self {
            store,
            skip_patterns: Vec::new(),
            stop: None,
            observer: None,
        }
    }

    /// Skip files whose names contain any of these fragments, in addition to `schema_template`
    pub fn with_skip_patterns(mut self, patterns: Vec<String>) -> Self {
        self.skip_patterns = patterns;
        self
    }

    /// Stop between files once `flag` is set
    pub fn with_stop_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn ImportObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Import every discovered file under `root`.
    ///
    /// Only discovery problems are returned as errors; per-file failures are
    /// reported in the summary.
    pub fn run(&mut self, root: &Path) -> Result<ImportSummary> {
        let files = JsonDiscovery::new(root, Some(self.skip_patterns.as_slice())).files()?;
        tracing::info!("Starting import of {} files from {}", files.len(), root.display());

        if let Some(observer) = self.observer {
            observer.started(files.len());
        }

        let mut summary = ImportSummary::default();
        for path in &files {
            if self.stop.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                tracing::warn!("Import interrupted; {} file(s) not attempted", files.len() - summary.attempted);
                summary.interrupted = true;
                break;
            }

            let outcome = self.import_file(path);
            summary.record(path, &outcome);
            if let Some(observer) = self.observer {
                observer.file_finished(path, &outcome);
            }
        }

        tracing::info!(
            "Import finished: {} attempted, {} succeeded, {} skipped, {} failed",
            summary.attempted, summary.succeeded, summary.skipped, summary.failed
        );
        if let Some(observer) = self.observer {
            observer.finished(&summary);
        }
        Ok(summary)
    }

    /// Import a single file, isolating any failure to it
    pub fn import_file(&mut self, path: &Path) -> FileOutcome {
        let mut stage = FileStage::Discovered;
        match self.try_import(path, &mut stage) {
            Ok(outcome) => {
                match &outcome {
                    FileOutcome::Committed { game_id, stats } => {
                        tracing::info!("Imported {} (game {}, {} stats)", path.display(), game_id, stats)
                    }
                    FileOutcome::Skipped { game_id } => {
                        tracing::info!("Skipping {}: game {} already imported", path.display(), game_id)
                    }
                    FileOutcome::Failed { .. } => {}
                }
                outcome
            }
            Err(error) => {
                tracing::error!("Failed to import {} at {}: {}", path.display(), stage, error);
                FileOutcome::Failed { stage, error }
            }
        }
    }

    fn try_import(&mut self, path: &Path, stage: &mut FileStage) -> Result<FileOutcome> {
        let content = std::fs::read_to_string(path)?;
        let document: serde_json::Value = serde_json::from_str(&content)?;
        *stage = FileStage::Parsed;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let game = GameInfo::extract(&document, filename)?;

        self.store.begin_transaction()?;
        match self.write_file(path, &document, &game, stage) {
            Ok(FileOutcome::Skipped { game_id }) => {
                self.store.rollback()?;
                Ok(FileOutcome::Skipped { game_id })
            }
            Ok(outcome) => match self.store.commit() {
                Ok(()) => {
                    *stage = FileStage::Committed;
                    Ok(outcome)
                }
                Err(e) => {
                    self.abort(path);
                    Err(e)
                }
            },
            Err(e) => {
                self.abort(path);
                Err(e)
            }
        }
    }

    fn abort(&mut self, path: &Path) {
        if let Err(e) = self.store.rollback() {
            tracing::error!("Rollback failed for {}: {}", path.display(), e);
        }
    }

    fn write_file(
        &mut self,
        path: &Path,
        document: &serde_json::Value,
        game: &GameInfo,
        stage: &mut FileStage,
    ) -> Result<FileOutcome> {
        let upserted = self
            .store
            .upsert_game(&game.matchup, &game.date, game.week, &game.filename)?;
        *stage = FileStage::GameResolved;

        if !upserted.created {
            return Ok(FileOutcome::Skipped { game_id: upserted.id });
        }

        let teams = boxscore::locate_team_stats(document);
        if teams.is_empty() {
            tracing::warn!("No team statistics found in {}", path.display());
        }
        let records = boxscore::flatten_team_stats(&teams);
        *stage = FileStage::StatsFlattened;

        for (category, fields) in fields_by_category(&records) {
            self.store.ensure_stat_storage(category, &fields)?;
        }
        for record in &records {
            self.store.record(upserted.id, record)?;
        }

        Ok(FileOutcome::Committed {
            game_id: upserted.id,
            stats: records.len(),
        })
    }
}

fn fields_by_category(records: &[StatRecord]) -> BTreeMap<&str, Vec<&str>> {
    let mut fields: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for record in records {
        let names = fields.entry(record.category.as_str()).or_default();
        if !names.contains(&record.stat_name.as_str()) {
            names.push(record.stat_name.as_str());
        }
    }
    fields
}
