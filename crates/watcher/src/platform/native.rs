//! notify-backed watch resources

use crate::source::{NotificationSink, NotificationSource, WatchResource};
use notify::event::ModifyKind;
use notify::{
    Config, Event, EventKind as NotifyEventKind, RecommendedWatcher, RecursiveMode,
    Watcher as NotifyWatcher,
};
use pathwatch_core::{RawEvents, Status};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Settings for the notify backend
#[derive(Debug, Clone)]
pub struct NotifySourceConfig {
    /// Poll interval when notify falls back to polling (default: 100ms)
    pub poll_interval: Duration,

    /// Compare file contents when polling (default: false)
    pub compare_contents: bool,
}

impl Default for NotifySourceConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            compare_contents: false,
        }
    }
}

/// Notification source backed by the platform's native watcher
#[derive(Debug, Clone, Default)]
pub struct NotifySource {
    config: NotifySourceConfig,
}

impl NotifySource {
    pub fn new(config: NotifySourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NotifySourceConfig {
        &self.config
    }
}

impl NotificationSource for NotifySource {
    fn acquire(
        &self,
        path: &Path,
        sink: NotificationSink,
    ) -> Result<Box<dyn WatchResource>, Status> {
        // Missing paths fail up front with ENOENT on every backend
        std::fs::metadata(path).map_err(|e| Status::from_io_error(&e))?;

        let released = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&released);

        let notify_config = Config::default()
            .with_poll_interval(self.config.poll_interval)
            .with_compare_contents(self.config.compare_contents);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if gate.load(Ordering::Acquire) {
                    return;
                }
                match res {
                    Ok(event) => {
                        let Some(raw) = raw_events_for(&event.kind) else {
                            return;
                        };
                        let filename = event
                            .paths
                            .first()
                            .and_then(|p| p.file_name())
                            .map(|name| name.to_string_lossy().into_owned());
                        sink.notify(raw, filename, 0);
                    }
                    Err(err) => {
                        let status = status_for_notify_error(&err);
                        sink.notify(RawEvents::empty(), None, status.code());
                    }
                }
            },
            notify_config,
        )
        .map_err(|e| status_for_notify_error(&e))?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| status_for_notify_error(&e))?;

        debug!(path = %path.display(), "native watch acquired");

        Ok(Box::new(NativeWatch {
            path: path.to_path_buf(),
            watcher: Some(watcher),
            released,
        }))
    }
}

struct NativeWatch {
    path: PathBuf,
    watcher: Option<RecommendedWatcher>,
    released: Arc<AtomicBool>,
}

impl WatchResource for NativeWatch {}

impl Drop for NativeWatch {
    fn drop(&mut self) {
        // Close the gate first; the backend thread may still be mid-callback
        self.released.store(true, Ordering::Release);

        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch(&self.path) {
                debug!(path = %self.path.display(), "unwatch failed: {}", e);
            }
        }
    }
}

/// Map a notify event kind onto the raw notification bits.
///
/// Entry creation, removal and renames report `RENAME`; content and
/// metadata modifications report `CHANGE`. Access and backend-internal
/// events carry no change and map to `None`.
pub fn raw_events_for(kind: &NotifyEventKind) -> Option<RawEvents> {
    match kind {
        NotifyEventKind::Create(_) | NotifyEventKind::Remove(_) => Some(RawEvents::RENAME),
        NotifyEventKind::Modify(ModifyKind::Name(_)) => Some(RawEvents::RENAME),
        NotifyEventKind::Modify(_) => Some(RawEvents::CHANGE),
        NotifyEventKind::Any => Some(RawEvents::CHANGE),
        NotifyEventKind::Access(_) | NotifyEventKind::Other => None,
    }
}

/// Map a notify error onto a negative-errno status
pub fn status_for_notify_error(err: &notify::Error) -> Status {
    match &err.kind {
        notify::ErrorKind::Io(io) => Status::from_io_error(io),
        notify::ErrorKind::PathNotFound => Status::ENOENT,
        notify::ErrorKind::WatchNotFound => Status::EINVAL,
        notify::ErrorKind::InvalidConfig(_) => Status::EINVAL,
        notify::ErrorKind::MaxFilesWatch => Status::ENOSPC,
        notify::ErrorKind::Generic(_) => Status::UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    #[test]
    fn test_entry_lifecycle_maps_to_rename() {
        assert_eq!(
            raw_events_for(&NotifyEventKind::Create(CreateKind::File)),
            Some(RawEvents::RENAME)
        );
        assert_eq!(
            raw_events_for(&NotifyEventKind::Remove(RemoveKind::Any)),
            Some(RawEvents::RENAME)
        );
        assert_eq!(
            raw_events_for(&NotifyEventKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(RawEvents::RENAME)
        );
    }

    #[test]
    fn test_modifications_map_to_change() {
        assert_eq!(
            raw_events_for(&NotifyEventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(RawEvents::CHANGE)
        );
        assert_eq!(
            raw_events_for(&NotifyEventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))),
            Some(RawEvents::CHANGE)
        );
    }

    #[test]
    fn test_access_is_ignored() {
        assert_eq!(raw_events_for(&NotifyEventKind::Access(AccessKind::Any)), None);
        assert_eq!(raw_events_for(&NotifyEventKind::Other), None);
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(status_for_notify_error(&notify::Error::path_not_found()), Status::ENOENT);
        assert_eq!(status_for_notify_error(&notify::Error::generic("boom")), Status::UNKNOWN);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(status_for_notify_error(&notify::Error::io(io)), Status::EACCES);
    }

    #[test]
    fn test_missing_path_fails_with_enoent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let event_loop = crate::EventLoop::with_notify();
        let handle = crate::WatchHandle::new(&event_loop);

        let err = handle.start(temp_dir.path().join("missing"), false).unwrap_err();

        assert_eq!(err.status(), Some(Status::ENOENT));
        assert!(!handle.is_active());
    }
}
