//! Errors surfaced by watch handles and the event loop

use crate::handle::HandleId;
use pathwatch_core::{CoreError, Status};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    /// Bad caller input, rejected before any OS resource is touched
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The OS refused to create the watch
    #[error("failed to watch {}: {status}", path.display())]
    Os { path: PathBuf, status: Status },

    #[error("handle {id} is already watching {}", path.display())]
    AlreadyStarted { id: HandleId, path: PathBuf },

    /// Closed handles never watch again
    #[error("handle {0} is closed")]
    Closed(HandleId),

    /// A notification source broke its contract. Not recoverable.
    #[error("invalid notification for handle {id}: {source}")]
    InvalidNotification {
        id: HandleId,
        #[source]
        source: CoreError,
    },
}

impl WatchError {
    /// OS status behind the error, when there is one
    pub fn status(&self) -> Option<Status> {
        match self {
            WatchError::Os { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the caller must stop driving the loop
    pub fn is_fatal(&self) -> bool {
        matches!(self, WatchError::InvalidNotification { .. })
    }
}
