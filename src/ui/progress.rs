use crate::importer::{FileOutcome, ImportObserver, ImportSummary};
use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::Path;

const BAR_TEMPLATE: &str = "{spinner} [{bar:30}] {pos}/{len} {msg}";

/// Progress bar over the files of one import run
pub struct ImportProgress {
    bar: ProgressBar,
}

impl ImportProgress {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    fn visible() -> bool {
        console::Term::stdout().is_term() && !is_quiet()
    }
}

impl Default for ImportProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportObserver for ImportProgress {
    fn started(&self, total: usize) {
        self.bar.set_length(total as u64);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            self.bar.set_style(style.progress_chars("=> "));
        }
        if Self::visible() {
            self.bar.set_draw_target(ProgressDrawTarget::stdout());
        }
    }

    fn file_finished(&self, path: &Path, outcome: &FileOutcome) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match outcome {
            FileOutcome::Committed { .. } => self.bar.set_message(name),
            FileOutcome::Skipped { .. } => {
                self.bar.println(format!(
                    "{} {} (already imported)",
                    Icons::SKIP.style(theme().outcome(outcome)),
                    name
                ));
            }
            FileOutcome::Failed { error, .. } => {
                self.bar.println(format!(
                    "{} {}: {}",
                    Icons::CROSS,
                    name,
                    error.to_string().style(theme().outcome(outcome))
                ));
            }
        }
        self.bar.inc(1);
    }

    fn finished(&self, _summary: &ImportSummary) {
        self.bar.finish_and_clear();
    }
}
