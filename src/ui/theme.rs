use crate::importer::FileOutcome;
use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles, named for what the import output shows
#[derive(Debug, Clone)]
pub struct Theme {
    /// Banners and section titles
    pub title: Style,
    /// Field labels and secondary text
    pub label: Style,
    pub committed: Style,
    pub skipped: Style,
    pub failed: Style,
    /// Warnings that do not fail the run
    pub notice: Style,
}

impl Theme {
    /// Colored when the terminal supports it and `NO_COLOR` is unset
    pub fn detect() -> Self {
        let enabled = console::colors_enabled() && std::env::var_os("NO_COLOR").is_none();
        if enabled { Self::colored() } else { Self::plain() }
    }

    pub fn colored() -> Self {
        Self {
            title: Style::new().bright_blue().bold(),
            label: Style::new().dimmed(),
            committed: Style::new().green(),
            skipped: Style::new().dimmed().italic(),
            failed: Style::new().red().bold(),
            notice: Style::new().yellow(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            title: none,
            label: none,
            committed: none,
            skipped: none,
            failed: none,
            notice: none,
        }
    }

    /// Style for one file's import outcome
    pub fn outcome(&self, outcome: &FileOutcome) -> Style {
        match outcome {
            FileOutcome::Committed { .. } => self.committed,
            FileOutcome::Skipped { .. } => self.skipped,
            FileOutcome::Failed { .. } => self.failed,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::FileStage;
    use crate::Error;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_leaves_text_unstyled() {
        let theme = Theme::plain();
        let failed = FileOutcome::Failed {
            stage: FileStage::Parsed,
            error: Error::Schema("missing `game_info` object".to_string()),
        };
        let styled = "week1.json".style(theme.outcome(&failed)).to_string();
        assert_eq!(styled, "week1.json");
    }

    #[test]
    fn test_outcome_styles_differ_when_colored() {
        let theme = Theme::colored();
        let committed = "x"
            .style(theme.outcome(&FileOutcome::Committed { game_id: 1, stats: 3 }))
            .to_string();
        let skipped = "x"
            .style(theme.outcome(&FileOutcome::Skipped { game_id: 1 }))
            .to_string();
        assert_ne!(committed, skipped);
        assert_ne!(committed, "x");
    }
}
