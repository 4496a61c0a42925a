//! Single-path watch handles
//!
//! This crate binds one filesystem path to an OS change-notification
//! resource and delivers one discrete event per native notification:
//! - `WatchHandle` lifecycle: uninitialized → active → closed
//! - `EventLoop` serializes notifications onto the owner thread
//! - Close suppresses every later callback, queued ones included
//! - Persistent handles keep the loop running, others do not
//!
//! ```no_run
//! use pathwatch_watcher::{EventLoop, WatchHandle};
//!
//! # fn main() -> Result<(), pathwatch_watcher::WatchError> {
//! let event_loop = EventLoop::with_notify();
//! let handle = WatchHandle::new(&event_loop);
//! handle.on_change(|handle, event| {
//!     println!("{:?}", event.callback_args());
//!     handle.close();
//! });
//! handle.start("/tmp/watched", true)?;
//! event_loop.run()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod event_loop;
pub mod handle;
pub mod platform;
pub mod source;

pub use error::WatchError;
pub use event_loop::{EventLoop, KeepAlive, LoopWaker};
pub use handle::{HandleId, HandleState, WatchHandle};
pub use platform::{NotifySource, NotifySourceConfig};
pub use source::manual::ManualSource;
pub use source::{NotificationSink, NotificationSource, WatchResource};

pub use pathwatch_core::{ChangeEvent, EventKind, RawEvents, Status};

pub type Result<T> = std::result::Result<T, WatchError>;
