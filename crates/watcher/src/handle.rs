//! Watch handle lifecycle
//!
//! A handle starts `Uninitialized`, becomes `Active` on a successful
//! `start`, and becomes `Closed` on `close` or when its last clone is
//! dropped. `Closed` is terminal: watching again needs a new handle.
//!
//! The OS resource exists exactly while the handle is `Active`. Closing
//! unregisters the handle from its loop first, so notifications already
//! queued for it are dropped instead of dispatched.

use crate::event_loop::{EventLoop, KeepAlive, LoopShared};
use crate::source::WatchResource;
use crate::{Result, WatchError};
use pathwatch_core::{translate, ChangeEvent, RawEvents, Status};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, error, trace, warn};

/// Identifier of a handle within its event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a watch handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Constructed, no OS resource
    Uninitialized,

    /// Watching; owns the OS resource
    Active,

    /// Released; terminal
    Closed,
}

type ChangeCallback = Box<dyn FnMut(&WatchHandle, &ChangeEvent)>;

pub(crate) struct HandleInner {
    id: HandleId,
    shared: Rc<LoopShared>,
    state: Cell<HandleState>,
    path: RefCell<Option<PathBuf>>,
    persistent: Cell<bool>,
    resource: RefCell<Option<Box<dyn WatchResource>>>,
    keepalive: RefCell<Option<KeepAlive>>,
    callback: RefCell<Option<ChangeCallback>>,
}

/// A watch on one filesystem path.
///
/// Clones share the same underlying watch. The handle belongs to the
/// thread driving its [`EventLoop`].
#[derive(Clone)]
pub struct WatchHandle {
    inner: Rc<HandleInner>,
}

impl WatchHandle {
    /// Create an uninitialized handle on `event_loop`. No OS resource is allocated.
    pub fn new(event_loop: &EventLoop) -> Self {
        let shared = event_loop.shared();
        let id = shared.next_handle_id();

        Self {
            inner: Rc::new(HandleInner {
                id,
                shared,
                state: Cell::new(HandleState::Uninitialized),
                path: RefCell::new(None),
                persistent: Cell::new(false),
                resource: RefCell::new(None),
                keepalive: RefCell::new(None),
                callback: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<HandleInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> std::rc::Weak<HandleInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn id(&self) -> HandleId {
        self.inner.id
    }

    pub fn state(&self) -> HandleState {
        self.inner.state.get()
    }

    pub fn is_active(&self) -> bool {
        self.state() == HandleState::Active
    }

    /// Path given to a successful `start`
    pub fn path(&self) -> Option<PathBuf> {
        self.inner.path.borrow().clone()
    }

    /// Whether this handle keeps its loop alive while active
    pub fn is_persistent(&self) -> bool {
        self.is_active() && self.inner.persistent.get()
    }

    /// Register the change callback, replacing any previous one.
    ///
    /// The callback receives the handle itself so it can `close()` it
    /// without holding a clone.
    pub fn on_change<F>(&self, callback: F)
    where
        F: FnMut(&WatchHandle, &ChangeEvent) + 'static,
    {
        *self.inner.callback.borrow_mut() = Some(Box::new(callback));
    }

    /// Bind the OS watch resource to `path`.
    ///
    /// On failure the handle stays `Uninitialized` and nothing is retained;
    /// [`WatchError::status`] carries the OS status. A persistent handle
    /// keeps its loop alive until closed.
    pub fn start(&self, path: impl AsRef<Path>, persistent: bool) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(WatchError::InvalidArgument("path must not be empty"));
        }

        match self.state() {
            HandleState::Uninitialized => {}
            HandleState::Active => {
                return Err(WatchError::AlreadyStarted {
                    id: self.id(),
                    path: self.path().unwrap_or_default(),
                });
            }
            HandleState::Closed => return Err(WatchError::Closed(self.id())),
        }

        let shared = &self.inner.shared;
        let resource = shared
            .source()
            .acquire(path, shared.sink(self.id()))
            .map_err(|status| {
                debug!(id = %self.id(), path = %path.display(), %status, "watch acquisition failed");
                WatchError::Os {
                    path: path.to_path_buf(),
                    status,
                }
            })?;

        *self.inner.resource.borrow_mut() = Some(resource);
        *self.inner.path.borrow_mut() = Some(path.to_path_buf());
        self.inner.persistent.set(persistent);
        if persistent {
            *self.inner.keepalive.borrow_mut() = Some(shared.keep_alive());
        }
        shared.register(self.id(), self.downgrade());
        self.inner.state.set(HandleState::Active);

        debug!(id = %self.id(), path = %path.display(), persistent, "watch started");
        Ok(())
    }

    /// Like [`start`](Self::start), returning the raw status: 0 on success,
    /// the negative OS code otherwise.
    ///
    /// Argument and state errors are still returned as `Err`.
    pub fn start_status(&self, path: impl AsRef<Path>, persistent: bool) -> Result<i32> {
        match self.start(path, persistent) {
            Ok(()) => Ok(Status::OK.code()),
            Err(WatchError::Os { status, .. }) => Ok(status.code()),
            Err(err) => Err(err),
        }
    }

    /// Release the watch. No-op unless active; safe from inside a callback.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Translate one notification and hand it to the callback.
    ///
    /// Returns whether the callback ran.
    pub(crate) fn on_notification(
        &self,
        raw: RawEvents,
        filename: Option<&str>,
        status: i32,
    ) -> Result<bool> {
        if !self.is_active() {
            trace!(id = %self.id(), "dropping notification for inactive handle");
            return Ok(false);
        }

        let event = translate(raw, filename, status).map_err(|source| {
            error!(id = %self.id(), raw = raw.bits(), "notification carries no event bits");
            WatchError::InvalidNotification {
                id: self.id(),
                source,
            }
        })?;

        if event.is_error() {
            warn!(id = %self.id(), status = %Status::from_code(event.error_code), "watch reported an error");
        } else {
            trace!(id = %self.id(), kind = %event.kind, filename = ?event.filename, "dispatching change");
        }

        let taken = self.inner.callback.borrow_mut().take();
        let Some(mut callback) = taken else {
            trace!(id = %self.id(), "no change callback registered");
            return Ok(false);
        };

        callback(self, &event);

        // Put it back unless the callback closed the handle or installed a replacement
        if self.is_active() {
            let mut slot = self.inner.callback.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }

        Ok(true)
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("path", &self.inner.path.borrow())
            .field("persistent", &self.inner.persistent.get())
            .finish()
    }
}

impl HandleInner {
    fn close(&self) {
        if self.state.get() != HandleState::Active {
            return;
        }

        // Unregister before releasing so queued notifications are dropped
        self.state.set(HandleState::Closed);
        self.shared.unregister(self.id);

        if let Some(resource) = self.resource.borrow_mut().take() {
            resource.release();
        }
        self.keepalive.borrow_mut().take();
        self.callback.borrow_mut().take();

        debug!(id = %self.id, "watch closed");
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        // The resource exists iff the handle is active
        let state = self.state.get();
        if !std::thread::panicking() {
            assert_eq!(
                self.resource.get_mut().is_some(),
                state == HandleState::Active,
                "watch handle {} destroyed {:?} with mismatched resource bookkeeping",
                self.id,
                state
            );
        }

        if state == HandleState::Active {
            debug!(id = %self.id, "closing active watch on drop");
            self.close();
        }
    }
}
