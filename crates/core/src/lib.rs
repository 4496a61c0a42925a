//! Event model for single-path watches
//!
//! This crate holds the pieces of a watch that do not depend on any OS
//! notification mechanism:
//! - The raw notification bitmask reported by a watch resource
//! - The discrete `ChangeEvent` delivered to callbacks
//! - The translation policy from one raw notification to one event
//! - Negative-errno status codes and their names

pub mod event;
pub mod status;
pub mod translate;

pub use event::{ChangeEvent, EventKind, RawEvents};
pub use status::Status;
pub use translate::translate;

use thiserror::Error;

/// Errors raised by the event model
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A successful notification carried neither the rename nor the change bit.
    ///
    /// No event can be built from it. The notification source broke its
    /// contract, so callers must not continue dispatching.
    #[error("notification carries no rename or change bit (raw mask {raw:#x})")]
    EmptyEventMask { raw: u32 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
