//! Raw notification bits and the discrete events built from them

use serde::Serialize;
use std::fmt;

bitflags::bitflags! {
    /// Bits reported by a watch resource for one notification.
    ///
    /// A single notification may carry both bits at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RawEvents: u32 {
        /// Entry was created, removed or renamed
        const RENAME = 1;
        /// Entry content or attributes changed
        const CHANGE = 2;
    }
}

/// Kind of a dispatched change event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Entry was renamed (also used for create and remove)
    Renamed,

    /// Entry content or attributes changed
    Changed,

    /// The notification reported an error status instead of a change
    Unknown,
}

impl EventKind {
    /// Name handed to callbacks: `"rename"`, `"change"`, or `""` for errors
    pub fn event_name(self) -> &'static str {
        match self {
            EventKind::Renamed => "rename",
            EventKind::Changed => "change",
            EventKind::Unknown => "",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Unknown => f.write_str("error"),
            kind => f.write_str(kind.event_name()),
        }
    }
}

/// One discrete event produced from one native notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    /// What happened
    #[serde(rename = "event", serialize_with = "serialize_event_name")]
    pub kind: EventKind,

    /// Name of the affected entry, when the OS supplied one
    pub filename: Option<String>,

    /// Zero on success, the OS error code for error notifications
    #[serde(rename = "status")]
    pub error_code: i32,
}

impl ChangeEvent {
    pub fn renamed(filename: Option<String>) -> Self {
        Self {
            kind: EventKind::Renamed,
            filename,
            error_code: 0,
        }
    }

    pub fn changed(filename: Option<String>) -> Self {
        Self {
            kind: EventKind::Changed,
            filename,
            error_code: 0,
        }
    }

    /// Error event. Never carries a filename.
    pub fn error(status: i32) -> Self {
        Self {
            kind: EventKind::Unknown,
            filename: None,
            error_code: status,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_code != 0
    }

    /// The positional values handed to the change callback:
    /// `(status, event_name, filename)`.
    ///
    /// `event_name` is empty iff `status` is nonzero.
    pub fn callback_args(&self) -> (i32, &str, Option<&str>) {
        (
            self.error_code,
            self.kind.event_name(),
            self.filename.as_deref(),
        )
    }
}

fn serialize_event_name<S: serde::Serializer>(kind: &EventKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.event_name())
}
