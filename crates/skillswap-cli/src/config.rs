//! CLI configuration.
//!
//! Reads the `[store]` and `[log]` sections from `config/default.toml` and
//! layers the `SKILLSWAP_DATA_PATH` environment variable and the `--data`
//! flag on top.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Environment variable naming the data file.
pub const DATA_PATH_ENV: &str = "SKILLSWAP_DATA_PATH";

const DEFAULT_DATA_PATH: &str = "data.json";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolved settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// JSON file the store is bound to.
    pub data_path: PathBuf,
    /// Default tracing level when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl CliConfig {
    /// Resolve the configuration.
    ///
    /// Precedence, highest first: `flag`, `env_path`, the config file, the
    /// built-in defaults. A missing or unreadable file is not an error.
    pub fn resolve(config_file: &Path, flag: Option<PathBuf>, env_path: Option<String>) -> Self {
        let mut config = Self::from_file(config_file);
        if let Some(path) = env_path.filter(|p| !p.is_empty()) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(path) = flag {
            config.data_path = path;
        }
        config
    }

    /// Load settings from a TOML file, falling back to defaults per key.
    pub fn from_file(path: &Path) -> Self {
        let defaults = Self::default();

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return defaults,
        };
        Self::from_toml(&content).unwrap_or_else(|| {
            debug!(path = %path.display(), "config file is not valid TOML, using defaults");
            defaults
        })
    }

    fn from_toml(content: &str) -> Option<Self> {
        let table: toml::Table = content.parse().ok()?;
        let defaults = Self::default();

        let data_path = table
            .get("store")
            .and_then(|s| s.get("data_path"))
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let log_level = table
            .get("log")
            .and_then(|s| s.get("level"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or(defaults.log_level);

        Some(Self {
            data_path,
            log_level,
        })
    }
}
