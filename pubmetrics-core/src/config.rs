//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/pubmetrics/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/pubmetrics/` (~/.config/pubmetrics/)
//! - Data: `$XDG_DATA_HOME/pubmetrics/` (~/.local/share/pubmetrics/)
//! - State/Logs: `$XDG_STATE_HOME/pubmetrics/` (~/.local/state/pubmetrics/)

use crate::error::{Error, Result};
use crate::types::Granularity;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Report defaults
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Report defaults applied when a query does not specify them
#[derive(Debug, Deserialize)]
pub struct ReportsConfig {
    /// Number of ranked entities shown before pagination
    #[serde(default = "default_item_limit")]
    pub item_limit: usize,

    /// Chart bucket width for the usage report
    #[serde(default = "default_usage_granularity")]
    pub usage_granularity: Granularity,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            item_limit: default_item_limit(),
            usage_granularity: default_usage_granularity(),
        }
    }
}

fn default_item_limit() -> usize {
    20
}

fn default_usage_granularity() -> Granularity {
    Granularity::Day
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/pubmetrics/config.toml` (~/.config/pubmetrics/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("pubmetrics").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite metric store)
    ///
    /// `$XDG_DATA_HOME/pubmetrics/` (~/.local/share/pubmetrics/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("pubmetrics")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/pubmetrics/` (~/.local/state/pubmetrics/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("pubmetrics")
    }

    /// Returns the metric database file path
    ///
    /// `$XDG_DATA_HOME/pubmetrics/stats.db` (~/.local/share/pubmetrics/stats.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("stats.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/pubmetrics/pubmetrics.log` (~/.local/state/pubmetrics/pubmetrics.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("pubmetrics.log")
    }
}
