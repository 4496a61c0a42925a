//! Event loop driving watch handles
//!
//! Notification sources run on their own threads and push raw
//! notifications into one channel. The loop drains that channel on the
//! thread that calls `run*`, looks each notification up in its handle
//! registry, and dispatches it. Notifications for handles that are no
//! longer registered are dropped.
//!
//! Liveness: `run()` keeps going while at least one [`KeepAlive`] token
//! exists. Persistent handles hold one while active.

use crate::handle::{HandleId, HandleInner, WatchHandle};
use crate::platform::NotifySource;
use crate::source::{NotificationSink, NotificationSource};
use crate::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use pathwatch_core::RawEvents;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// One raw notification addressed to a handle
#[derive(Debug)]
pub(crate) struct Notification {
    pub id: HandleId,
    pub raw: RawEvents,
    pub filename: Option<String>,
    pub status: i32,
}

#[derive(Debug)]
pub(crate) enum LoopMessage {
    Notification(Notification),
    /// Interrupts a blocking wait
    Wake,
}

pub(crate) struct LoopShared {
    source: Box<dyn NotificationSource>,
    tx: Sender<LoopMessage>,
    rx: Receiver<LoopMessage>,
    registry: RefCell<HashMap<HandleId, Weak<HandleInner>>>,
    refs: Rc<Cell<usize>>,
    next_id: Cell<u64>,
    stop: Arc<AtomicBool>,
}

impl LoopShared {
    pub(crate) fn source(&self) -> &dyn NotificationSource {
        self.source.as_ref()
    }

    pub(crate) fn sink(&self, id: HandleId) -> NotificationSink {
        NotificationSink::new(id, self.tx.clone())
    }

    pub(crate) fn next_handle_id(&self) -> HandleId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        HandleId::new(id)
    }

    pub(crate) fn register(&self, id: HandleId, handle: Weak<HandleInner>) {
        self.registry.borrow_mut().insert(id, handle);
    }

    pub(crate) fn unregister(&self, id: HandleId) {
        self.registry.borrow_mut().remove(&id);
    }

    pub(crate) fn keep_alive(&self) -> KeepAlive {
        KeepAlive::new(Rc::clone(&self.refs))
    }

    fn lookup(&self, id: HandleId) -> Option<WatchHandle> {
        self.registry
            .borrow()
            .get(&id)
            .and_then(Weak::upgrade)
            .map(WatchHandle::from_inner)
    }
}

/// Token keeping an [`EventLoop`] alive; released on drop
#[derive(Debug)]
pub struct KeepAlive {
    refs: Rc<Cell<usize>>,
}

impl KeepAlive {
    fn new(refs: Rc<Cell<usize>>) -> Self {
        refs.set(refs.get() + 1);
        Self { refs }
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        self.refs.set(self.refs.get().saturating_sub(1));
    }
}

/// Thread-safe handle for stopping a running loop
#[derive(Debug, Clone)]
pub struct LoopWaker {
    tx: Sender<LoopMessage>,
    stop: Arc<AtomicBool>,
}

impl LoopWaker {
    /// Make the loop's current (or next) `run` / `run_for` return
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
        let _ = self.tx.send(LoopMessage::Wake);
    }
}

/// Owner-thread event loop for watch handles
pub struct EventLoop {
    shared: Rc<LoopShared>,
}

impl EventLoop {
    /// Create a loop whose handles acquire resources from `source`
    pub fn new(source: impl NotificationSource + 'static) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();

        Self {
            shared: Rc::new(LoopShared {
                source: Box::new(source),
                tx,
                rx,
                registry: RefCell::new(HashMap::new()),
                refs: Rc::new(Cell::new(0)),
                next_id: Cell::new(1),
                stop: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    /// Create a loop backed by the platform's native watcher
    pub fn with_notify() -> Self {
        Self::new(NotifySource::default())
    }

    pub(crate) fn shared(&self) -> Rc<LoopShared> {
        Rc::clone(&self.shared)
    }

    pub fn waker(&self) -> LoopWaker {
        LoopWaker {
            tx: self.shared.tx.clone(),
            stop: Arc::clone(&self.shared.stop),
        }
    }

    /// Keep the loop alive independently of any handle
    pub fn keep_alive(&self) -> KeepAlive {
        self.shared.keep_alive()
    }

    /// Whether `run()` would keep waiting for notifications
    pub fn is_alive(&self) -> bool {
        self.shared.refs.get() > 0
    }

    /// Number of active handles on this loop
    pub fn active_handles(&self) -> usize {
        self.shared.registry.borrow().len()
    }

    /// Number of notifications waiting to be dispatched
    pub fn pending(&self) -> usize {
        self.shared.rx.len()
    }

    /// Dispatch notifications until nothing keeps the loop alive or a stop
    /// is requested through a [`LoopWaker`].
    pub fn run(&self) -> Result<()> {
        debug!(refs = self.shared.refs.get(), "event loop running");

        loop {
            if self.take_stop_request() {
                debug!("event loop stopped");
                return Ok(());
            }
            if !self.is_alive() {
                debug!("event loop has no persistent work left");
                return Ok(());
            }
            self.run_once(None)?;
        }
    }

    /// Wait up to `timeout` (forever if `None`) for a notification, then
    /// dispatch it and everything already queued behind it.
    ///
    /// Returns how many callbacks ran.
    pub fn run_once(&self, timeout: Option<Duration>) -> Result<usize> {
        let first = match timeout {
            Some(timeout) => match self.shared.rx.recv_timeout(timeout) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return Ok(0)
                }
            },
            None => match self.shared.rx.recv() {
                Ok(message) => message,
                Err(_) => return Ok(0),
            },
        };

        // Only what is queued now; later arrivals wait for the next turn
        let queued = self.shared.rx.len();
        let mut dispatched = usize::from(self.dispatch(first)?);
        for _ in 0..queued {
            match self.shared.rx.try_recv() {
                Ok(message) => dispatched += usize::from(self.dispatch(message)?),
                Err(_) => break,
            }
        }

        Ok(dispatched)
    }

    /// Dispatch notifications for `duration`, regardless of liveness.
    ///
    /// Returns early on a stop request. Returns how many callbacks ran.
    pub fn run_for(&self, duration: Duration) -> Result<usize> {
        let deadline = Instant::now() + duration;
        let mut dispatched = 0;

        loop {
            if self.take_stop_request() {
                break;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            dispatched += self.run_once(Some(remaining))?;
        }

        Ok(dispatched)
    }

    fn take_stop_request(&self) -> bool {
        self.shared.stop.swap(false, Ordering::AcqRel)
    }

    fn dispatch(&self, message: LoopMessage) -> Result<bool> {
        let notification = match message {
            LoopMessage::Notification(notification) => notification,
            LoopMessage::Wake => return Ok(false),
        };

        let Some(handle) = self.shared.lookup(notification.id) else {
            trace!(id = %notification.id, "dropping notification for unregistered handle");
            return Ok(false);
        };

        handle.on_notification(
            notification.raw,
            notification.filename.as_deref(),
            notification.status,
        )
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("active_handles", &self.active_handles())
            .field("refs", &self.shared.refs.get())
            .field("pending", &self.pending())
            .finish()
    }
}
