//! pathwatch CLI - pw command

use anyhow::{Context, Result};
use clap::Parser;
use pathwatch_cli::{config, logging, Args, WatchOptions, WatchSession};
use std::io::IsTerminal;
use tracing::{debug, info};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;

    logging::init_logging(args.log_level, &config.log.level)?;
    debug!(?config, "loaded configuration");

    let options = WatchOptions::resolve(&args, &config)
        .with_color(!args.json && std::io::stdout().is_terminal());
    let session = WatchSession::start(options)?;

    let waker = session.waker();
    ctrlc::set_handler(move || waker.stop()).context("Failed to install Ctrl-C handler")?;

    let summary = session.run()?;
    info!(events = summary.events, "watch finished");
    Ok(())
}
