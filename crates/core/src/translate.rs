//! Translation of one raw notification into one change event
//!
//! Only one event can be dispatched per native notification. When both
//! bits are set the change bit is dropped and the notification becomes a
//! rename: a rename is assumed to imply an attribute change. This loses the
//! separate change signal and is kept as the documented behavior.

use crate::event::{ChangeEvent, RawEvents};
use crate::{CoreError, Result};

/// Translate `(raw, filename, status)` into the event handed to callbacks.
///
/// - nonzero `status`: error event, filename dropped
/// - rename bit set: `Renamed`, even when the change bit is also set
/// - change bit set: `Changed`
/// - neither: [`CoreError::EmptyEventMask`]
pub fn translate(raw: RawEvents, filename: Option<&str>, status: i32) -> Result<ChangeEvent> {
    if status != 0 {
        return Ok(ChangeEvent::error(status));
    }

    let filename = filename.map(str::to_owned);

    if raw.contains(RawEvents::RENAME) {
        Ok(ChangeEvent::renamed(filename))
    } else if raw.contains(RawEvents::CHANGE) {
        Ok(ChangeEvent::changed(filename))
    } else {
        Err(CoreError::EmptyEventMask { raw: raw.bits() })
    }
}
