//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for the filter directive:
//! 1. `--log-level` flag
//! 2. `PATHWATCH_LOG` environment variable (any `EnvFilter` directive)
//! 3. `[log] level` from the config file
//!
//! Logs go to stderr so stdout carries only events.

use crate::args::LogLevel;
use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PATHWATCH_LOG";

/// Pick the filter directive from the flag, the environment and the config
pub fn resolve_directive(
    cli_level: Option<LogLevel>,
    env_value: Option<&str>,
    config_level: &str,
) -> String {
    if let Some(level) = cli_level {
        return level.as_str().to_string();
    }

    match env_value.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ => config_level.to_string(),
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, config_level: &str) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = resolve_directive(cli_level, env_value.as_deref(), config_level);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
