//! File logging.
//!
//! The terminal is owned by the UI, so log lines go to `lumen.log` in the
//! platform data directory instead of stdout.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{WrapErr, eyre};
use lumen_config::Config;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured log filter.
const LOG_ENV: &str = "LUMEN_LOG";

/// Install a global subscriber writing to the log file.
pub fn init(config: &Config) -> color_eyre::Result<()> {
    let path = Config::log_path()?;
    let file = open_log(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("failed to install log subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}

/// Open `path` for appending, creating it and its parent directory.
fn open_log(path: &Path) -> color_eyre::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("failed to open {}", path.display()))
}

/// Filter from `LUMEN_LOG`, else the config, else `info`.
fn filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("lumen-logging-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_open_log_creates_parent_and_appends() {
        let dir = scratch_dir("append");
        let path = dir.join("nested").join("lumen.log");
        open_log(&path).unwrap();
        assert!(path.exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_open_log_reports_unusable_path() {
        let dir = scratch_dir("blocked");
        fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = open_log(&blocker.join("lumen.log")).unwrap_err();
        assert!(err.to_string().contains("failed to"), "{err}");
        fs::remove_dir_all(&dir).unwrap();
    }
}
