//! Notification source capability
//!
//! A source turns a path into an OS watch resource and reports raw
//! notifications for it through a [`NotificationSink`]. Sources may call
//! the sink from any thread; the event loop serializes delivery.

pub mod manual;

use crate::event_loop::{LoopMessage, Notification};
use crate::handle::HandleId;
use crossbeam_channel::Sender;
use pathwatch_core::{RawEvents, Status};
use std::path::Path;

/// Provider of OS-level watch resources
pub trait NotificationSource {
    /// Start watching `path`, reporting notifications through `sink`.
    ///
    /// On failure the returned status is nonzero and `sink` must be
    /// dropped unused.
    fn acquire(
        &self,
        path: &Path,
        sink: NotificationSink,
    ) -> Result<Box<dyn WatchResource>, Status>;
}

/// An acquired OS watch
///
/// Releasing (or dropping) the resource stops the source from using its
/// sink. Notifications already queued are discarded by the event loop.
pub trait WatchResource {
    fn release(self: Box<Self>) {}
}

/// Sending side of a handle's notification stream
#[derive(Debug, Clone)]
pub struct NotificationSink {
    id: HandleId,
    tx: Sender<LoopMessage>,
}

impl NotificationSink {
    pub(crate) fn new(id: HandleId, tx: Sender<LoopMessage>) -> Self {
        Self { id, tx }
    }

    pub fn handle_id(&self) -> HandleId {
        self.id
    }

    /// Queue one raw notification. Returns false once the loop is gone.
    pub fn notify(&self, raw: RawEvents, filename: Option<String>, status: i32) -> bool {
        self.tx
            .send(LoopMessage::Notification(Notification {
                id: self.id,
                raw,
                filename,
                status,
            }))
            .is_ok()
    }
}
