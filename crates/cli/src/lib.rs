//! pathwatch CLI library
//!
//! Everything behind the `pw` binary except process setup, so the
//! argument, config and output handling can be tested directly.

pub mod args;
pub mod config;
pub mod logging;
pub mod output;
pub mod session;

pub use args::{Args, LogLevel};
pub use config::CliConfig;
pub use session::{WatchOptions, WatchSession, WatchSummary};
