//! Configuration for the lumen terminal host.
//!
//! Settings live in `config.toml` under the platform configuration
//! directory (for example `~/.config/lumen/config.toml` on Linux). A missing
//! file is not an error; every field falls back to its default.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Name of the configuration file inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Name of the log file inside the data directory.
const LOG_FILE: &str = "lumen.log";

/// Allowed frame rate range (frames per second).
const FRAME_RATE_RANGE: (u32, u32) = (1, 120);

/// Allowed surface pixels per terminal cell column.
const CELL_PIXELS_RANGE: (u32, u32) = (1, 32);

/// Errors that can occur while loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No home directory could be determined for this platform.
    NoProjectDirs,
    /// Reading or writing the file failed.
    Io(PathBuf, io::Error),
    /// The file is not valid TOML for [`Config`].
    Parse(PathBuf, toml::de::Error),
    /// The configuration could not be serialized.
    Serialize(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoProjectDirs => write!(f, "could not determine a home directory"),
            ConfigError::Io(path, e) => write!(f, "{}: {e}", path.display()),
            ConfigError::Parse(path, e) => write!(f, "invalid config {}: {e}", path.display()),
            ConfigError::Serialize(e) => write!(f, "could not serialize config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NoProjectDirs => None,
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
        }
    }
}

/// User-facing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target frames per second.
    pub frame_rate: u32,
    /// Surface pixels per terminal column; a row covers twice as many.
    pub cell_pixels: u32,
    /// Fixed random seed. When absent the star field differs on every run.
    pub seed: Option<u64>,
    /// Headline drawn over the background.
    pub title: String,
    /// Line drawn under the headline.
    pub tagline: String,
    /// Show the key help line at the bottom.
    pub show_help: bool,
    /// `tracing` filter directive used when `LUMEN_LOG` is not set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            cell_pixels: 8,
            seed: None,
            title: "Hello, I'm a developer".to_string(),
            tagline: "Building things for the web".to_string(),
            show_help: true,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Platform directories for lumen.
    fn project_dirs() -> Result<ProjectDirs, ConfigError> {
        ProjectDirs::from("", "", "lumen").ok_or(ConfigError::NoProjectDirs)
    }

    /// Default path of the configuration file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::project_dirs()?.config_dir().join(CONFIG_FILE))
    }

    /// Default path of the log file.
    pub fn log_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::project_dirs()?.data_dir().join(LOG_FILE))
    }

    /// Load from the default location, falling back to defaults if the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from an explicit path, falling back to defaults if the file
    /// does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
        };
        Self::from_toml(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Parse TOML text and clamp out-of-range values.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(contents)?;
        Ok(config.sanitized())
    }

    /// Write to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    /// Clamp numeric settings into their supported ranges.
    pub fn sanitized(mut self) -> Self {
        self.frame_rate = self
            .frame_rate
            .clamp(FRAME_RATE_RANGE.0, FRAME_RATE_RANGE.1);
        self.cell_pixels = self
            .cell_pixels
            .clamp(CELL_PIXELS_RANGE.0, CELL_PIXELS_RANGE.1);
        self
    }

    /// Time budget for one frame.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml("seed = 42\ntitle = \"Hi\"").unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.title, "Hi");
        assert_eq!(config.frame_rate, 30);
        assert!(config.show_help);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = Config::from_toml("frame_rate = 0\ncell_pixels = 500").unwrap();
        assert_eq!(config.frame_rate, 1);
        assert_eq!(config.cell_pixels, 32);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml("frame_rate = \"fast\"").is_err());
    }

    #[test]
    fn test_frame_interval() {
        let config = Config {
            frame_rate: 50,
            ..Default::default()
        };
        assert_eq!(config.frame_interval(), std::time::Duration::from_millis(20));
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = std::env::temp_dir().join(format!("lumen-config-test-{}", std::process::id()));
        let path = dir.join("nested").join(CONFIG_FILE);
        let config = Config {
            seed: Some(7),
            show_help: false,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("lumen-config-does-not-exist.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
