//! Configuration file for the dirwatch CLI
//!
//! Lives at `<config dir>/dirwatch/config.toml` unless `--config` points
//! elsewhere. A missing file means defaults; command-line flags override
//! whatever the file says.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

/// Poll interval the reference host loop uses
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

const MIN_POLL_INTERVAL_MS: u64 = 50;
const MAX_POLL_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Directory to watch when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// How often `process` is driven (default: 2000)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// One of error, warn, info, debug, trace (default: info)
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            path: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Check every value is within its accepted range
    pub fn validate(&self) -> Result<()> {
        let interval = self.watch.poll_interval_ms;
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&interval) {
            anyhow::bail!(
                "watch.poll_interval_ms must be between {} and {}, got {}",
                MIN_POLL_INTERVAL_MS,
                MAX_POLL_INTERVAL_MS,
                interval
            );
        }

        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<Level> {
        Level::from_str(&self.log.level).map_err(|_| {
            anyhow::anyhow!(
                "log.level must be one of error, warn, info, debug, trace, got '{}'",
                self.log.level
            )
        })
    }
}

/// Set a single value by dotted key
pub fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "watch.path" => {
            config.watch.path = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        "watch.poll_interval_ms" => {
            config.watch.poll_interval_ms = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "log.level" => {
            config.log.level = value.to_string();
        }
        _ => anyhow::bail!(
            "Unknown config key: {}. Valid keys: watch.path, watch.poll_interval_ms, log.level",
            key
        ),
    }

    config.validate().context("Invalid configuration value")
}

/// Default location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dirwatch").join("config.toml"))
}

/// Parse and validate config text
pub fn parse(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text).context("Failed to parse config")?;
    config.validate()?;
    Ok(config)
}

/// Load the config from `path`, falling back to defaults if it doesn't exist
pub fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Write `config` to `path`, creating parent directories
pub fn save(config: &Config, path: &Path) -> Result<()> {
    config.validate().context("Refusing to save invalid config")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write config file {}", path.display()))
}

/// Create the file from the example template. Returns false if it already existed.
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, example_config())
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(true)
}

pub fn example_config() -> &'static str {
    r#"# dirwatch configuration

[watch]
# Directory to watch when none is given on the command line
# path = "/path/to/assets"

# How often to check for changes, in milliseconds (50-60000)
poll_interval_ms = 2000

[log]
# error, warn, info, debug or trace
level = "info"
"#
}
