use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Database written when neither the CLI nor the config file names one
pub const DEFAULT_DATABASE: &str = "nfl_season_stats.db";

/// Log file appended to when neither the CLI nor the config file names one
pub const DEFAULT_LOG_FILE: &str = "boxscore.log";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BoxscoreConfig {
    pub database: Option<String>,
    pub log_file: Option<String>,
    /// File-name fragments to skip in addition to `schema_template`
    pub skip_patterns: Option<Vec<String>>,
}

impl BoxscoreConfig {
    /// CLI value, then config value, then the built-in default
    pub fn database_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    pub fn log_file_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.log_file.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
    }

    pub fn skip_patterns(&self) -> Vec<String> {
        self.skip_patterns.clone().unwrap_or_default()
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("boxscore.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<BoxscoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: BoxscoreConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
