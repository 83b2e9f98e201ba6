//! Per-run logging session
//!
//! Logs go to stderr and, when a path is given, are appended to a log file
//! without ANSI colors. The subscriber is scoped to the session value rather
//! than installed globally; dropping the session flushes the file.

use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub struct LogSession {
    file: Option<Arc<File>>,
    _guard: DefaultGuard,
}

impl LogSession {
    /// Start logging for this run. `RUST_LOG` overrides the default level.
    pub fn init(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<Self> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if verbose {
                EnvFilter::new("debug")
            } else {
                EnvFilter::new("info")
            }
        });

        let file = match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("cannot open log file {}", path.display()))?;
                Some(Arc::new(file))
            }
            None => None,
        };

        let file_layer = file
            .clone()
            .map(|file| fmt::layer().with_ansi(false).with_writer(file));

        let guard = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(file_layer)
            .set_default();

        Ok(Self {
            file,
            _guard: guard,
        })
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = (&**file).flush();
            let _ = file.sync_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_writes_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");

        {
            let _session = LogSession::init(false, Some(&path)).unwrap();
            tracing::error!("Failed to import week1.json: boom");
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Failed to import week1.json: boom"));
        assert!(contents.contains("ERROR"));
    }
}
