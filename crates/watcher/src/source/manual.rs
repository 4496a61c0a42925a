//! In-process notification source
//!
//! `ManualSource` acquires nothing from the OS. Notifications are injected
//! with [`ManualSource::emit`], which makes the handle and loop logic
//! testable without a real filesystem.

use super::{NotificationSink, NotificationSource, WatchResource};
use parking_lot::Mutex;
use pathwatch_core::{RawEvents, Status};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
struct ManualState {
    /// Live watches: (key, path, sink)
    watches: Vec<(u64, PathBuf, NotificationSink)>,
    next_key: u64,
    /// Statuses to fail upcoming acquisitions with, in order
    failures: VecDeque<Status>,
    acquired: Vec<PathBuf>,
    released: usize,
}

/// Notification source driven by the caller. Clones share state.
#[derive(Clone, Default)]
pub struct ManualSource {
    state: Arc<Mutex<ManualState>>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next acquisition fail with `status`
    pub fn fail_next(&self, status: Status) {
        self.state.lock().failures.push_back(status);
    }

    /// Report a notification to every live watch on `path`.
    ///
    /// Returns how many watches were notified.
    pub fn emit(
        &self,
        path: impl AsRef<Path>,
        raw: RawEvents,
        filename: Option<&str>,
        status: i32,
    ) -> usize {
        let path = path.as_ref();
        let state = self.state.lock();

        let mut notified = 0;
        for (_, watched, sink) in &state.watches {
            if watched.as_path() == path && sink.notify(raw, filename.map(str::to_owned), status) {
                notified += 1;
            }
        }
        notified
    }

    /// Every path successfully acquired so far, in order
    pub fn acquired_paths(&self) -> Vec<PathBuf> {
        self.state.lock().acquired.clone()
    }

    pub fn release_count(&self) -> usize {
        self.state.lock().released
    }

    pub fn active_watches(&self) -> usize {
        self.state.lock().watches.len()
    }
}

impl NotificationSource for ManualSource {
    fn acquire(
        &self,
        path: &Path,
        sink: NotificationSink,
    ) -> Result<Box<dyn WatchResource>, Status> {
        let mut state = self.state.lock();

        if let Some(status) = state.failures.pop_front() {
            return Err(status);
        }

        let key = state.next_key;
        state.next_key += 1;
        state.watches.push((key, path.to_path_buf(), sink));
        state.acquired.push(path.to_path_buf());

        Ok(Box::new(ManualResource {
            key,
            state: Arc::clone(&self.state),
        }))
    }
}

struct ManualResource {
    key: u64,
    state: Arc<Mutex<ManualState>>,
}

impl WatchResource for ManualResource {}

impl Drop for ManualResource {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.watches.retain(|(key, _, _)| *key != self.key);
        state.released += 1;
    }
}
