//! User configuration for `pw`
//!
//! Stored at `~/.config/pathwatch/config.toml` (Linux/macOS) or
//! `%APPDATA%\pathwatch\config.toml` (Windows). Every field is optional;
//! command-line flags take precedence over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    pub watch: WatchConfig,
    pub log: LogConfig,
}

/// `[watch]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    /// Keep running while the watch is open (default: true)
    pub persistent: bool,

    /// Stop after this many seconds (default: none)
    pub timeout_secs: Option<u64>,

    /// Close the watch after this many events, at least 1 (default: none)
    pub max_events: Option<NonZeroUsize>,

    /// Print events as JSON (default: false)
    pub json: bool,

    /// Poll interval for polling backends, in milliseconds (default: 100)
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            persistent: true,
            timeout_secs: None,
            max_events: None,
            json: false,
            poll_interval_ms: 100,
        }
    }
}

/// `[log]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// tracing filter directive (default: "info")
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Directory holding the pathwatch config
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("pathwatch"))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

pub fn parse(text: &str) -> Result<CliConfig> {
    toml::from_str(text).context("Invalid config file")
}

/// Load the config.
///
/// An explicit path must exist. A missing default file yields the defaults.
pub fn load(explicit: Option<&Path>) -> Result<CliConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(CliConfig::default()),
        },
    };

    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("Failed to load {}", path.display()))
}
