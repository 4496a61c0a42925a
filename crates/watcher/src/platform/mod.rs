//! OS-backed notification source
//!
//! Uses the platform's recommended backend through the notify crate
//! (inotify on Linux, FSEvents on macOS, ReadDirectoryChangesW on Windows).
//! Watches are never recursive.

mod native;

pub use native::{raw_events_for, status_for_notify_error, NotifySource, NotifySourceConfig};
