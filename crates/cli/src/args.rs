//! Command-line arguments for `pw`

use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// pw - watch one path and print each change
#[derive(Parser, Debug)]
#[command(name = "pw")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// File or directory to watch
    pub path: PathBuf,

    /// Keep running while the watch is open (default from config: true)
    #[arg(long, overrides_with = "no_persistent")]
    pub persistent: bool,

    /// Do not let the watch alone keep pw running
    #[arg(long = "no-persistent", overrides_with = "persistent")]
    pub no_persistent: bool,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Close the watch after this many events (at least 1)
    #[arg(short = 'n', long, value_name = "N")]
    pub count: Option<NonZeroUsize>,

    /// Print one JSON object per event
    #[arg(long)]
    pub json: bool,

    /// Config file (default: <config dir>/pathwatch/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (overrides PATHWATCH_LOG and the config file)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

impl Args {
    /// Persistence requested on the command line, if any
    pub fn persistent_override(&self) -> Option<bool> {
        if self.no_persistent {
            Some(false)
        } else if self.persistent {
            Some(true)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
