//! One watch session: a loop, a handle on the requested path, and the
//! printing callback.

use crate::args::Args;
use crate::config::CliConfig;
use crate::output::format_event;
use anyhow::{Context, Result};
use pathwatch_watcher::{
    EventLoop, LoopWaker, NotifySource, NotifySourceConfig, WatchHandle,
};
use std::cell::Cell;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

/// Resolved settings for a session (flags over config over defaults)
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub path: PathBuf,
    pub persistent: bool,
    pub timeout: Option<Duration>,
    pub max_events: Option<NonZeroUsize>,
    pub json: bool,
    pub color: bool,
    pub source: NotifySourceConfig,
}

impl WatchOptions {
    pub fn resolve(args: &Args, config: &CliConfig) -> Self {
        let watch = &config.watch;

        Self {
            path: args.path.clone(),
            persistent: args.persistent_override().unwrap_or(watch.persistent),
            timeout: args
                .timeout
                .or(watch.timeout_secs)
                .map(Duration::from_secs),
            max_events: args.count.or(watch.max_events),
            json: args.json || watch.json,
            color: false,
            source: NotifySourceConfig {
                poll_interval: Duration::from_millis(watch.poll_interval_ms),
                ..NotifySourceConfig::default()
            },
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    /// Events printed
    pub events: usize,
}

/// A started watch, ready to run
pub struct WatchSession {
    event_loop: EventLoop,
    handle: WatchHandle,
    events: Rc<Cell<usize>>,
    options: WatchOptions,
}

impl WatchSession {
    /// Start watching `options.path`, printing events to stdout
    pub fn start(options: WatchOptions) -> Result<Self> {
        let event_loop = EventLoop::new(NotifySource::new(options.source.clone()));
        let handle = WatchHandle::new(&event_loop);
        let events = Rc::new(Cell::new(0usize));

        let counter = Rc::clone(&events);
        let waker = event_loop.waker();
        let (json, color, max_events) = (options.json, options.color, options.max_events);
        handle.on_change(move |handle, event| {
            match format_event(event, json, color) {
                Ok(line) => {
                    let mut stdout = std::io::stdout().lock();
                    if let Err(e) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
                        warn!("Failed to write event: {}", e);
                    }
                }
                Err(e) => warn!("Failed to format event: {}", e),
            }

            counter.set(counter.get() + 1);
            if max_events.is_some_and(|max| counter.get() >= max.get()) {
                info!(events = counter.get(), "event limit reached, closing watch");
                handle.close();
                waker.stop();
            }
        });

        handle
            .start(&options.path, options.persistent)
            .with_context(|| format!("Cannot watch {}", options.path.display()))?;

        info!(
            path = %options.path.display(),
            persistent = options.persistent,
            "watching"
        );

        Ok(Self {
            event_loop,
            handle,
            events,
            options,
        })
    }

    /// Waker for stopping `run` from a signal handler
    pub fn waker(&self) -> LoopWaker {
        self.event_loop.waker()
    }

    /// Dispatch events until the timeout, the event limit, a stop request,
    /// or (without a timeout) until nothing keeps the loop alive.
    pub fn run(self) -> Result<WatchSummary> {
        match self.options.timeout {
            Some(timeout) => {
                self.event_loop.run_for(timeout)?;
            }
            None => {
                if !self.options.persistent {
                    warn!("watch is not persistent and no timeout was given; nothing keeps pw running");
                }
                self.event_loop.run()?;
            }
        }

        self.handle.close();
        Ok(WatchSummary {
            events: self.events.get(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = CliConfig::default();
        config.watch.persistent = true;
        config.watch.timeout_secs = Some(60);
        config.watch.max_events = NonZeroUsize::new(9);

        let options = WatchOptions::resolve(
            &args(&["pw", "--no-persistent", "--timeout", "5", "-n", "2", "x"]),
            &config,
        );

        assert!(!options.persistent);
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.max_events, NonZeroUsize::new(2));
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let mut config = CliConfig::default();
        config.watch.persistent = false;
        config.watch.json = true;
        config.watch.poll_interval_ms = 250;

        let options = WatchOptions::resolve(&args(&["pw", "x"]), &config);

        assert!(!options.persistent);
        assert!(options.json);
        assert_eq!(options.timeout, None);
        assert_eq!(options.source.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_start_fails_for_missing_path() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let options = WatchOptions::resolve(
            &args(&["pw", missing.to_str().unwrap()]),
            &CliConfig::default(),
        );

        let err = WatchSession::start(options).err().unwrap();
        assert!(format!("{:#}", err).contains("ENOENT"));
    }

    #[test]
    fn test_non_persistent_run_returns_immediately() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let options = WatchOptions::resolve(
            &args(&["pw", "--no-persistent", temp_dir.path().to_str().unwrap()]),
            &CliConfig::default(),
        );

        let summary = WatchSession::start(options).unwrap().run().unwrap();
        assert_eq!(summary.events, 0);
    }
}
