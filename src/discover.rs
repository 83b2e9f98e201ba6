use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use crate::{Error, Result};

/// File-name fragments that are never imported
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &["schema_template"];

/// Recursive discovery of box score JSON files under a root directory.
pub struct JsonDiscovery {
    root: PathBuf,
    skip_patterns: Vec<String>,
}

impl JsonDiscovery {
    pub fn new(root: &Path, extra_skips: Option<&[String]>) -> Self {
        let mut skip_patterns: Vec<String> = DEFAULT_SKIP_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();

        if let Some(extra) = extra_skips {
            skip_patterns.extend(extra.iter().filter(|p| !p.is_empty()).cloned());
        }

        Self {
            root: root.to_path_buf(),
            skip_patterns,
        }
    }

    pub fn is_skipped(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.skip_patterns.iter().any(|p| name.contains(p.as_str()))
    }

    /// All `*.json` files under the root, sorted by path
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "not a directory: {}",
                self.root.display()
            )));
        }

        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) || !is_json(path) {
                continue;
            }
            if self.is_skipped(path) {
                tracing::debug!("Skipping template file {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        Ok(files)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
