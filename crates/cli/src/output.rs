//! Event rendering for stdout

use anyhow::Result;
use owo_colors::OwoColorize;
use pathwatch_core::{ChangeEvent, EventKind, Status};

/// Render one event as a single output line (without newline).
///
/// Human form is `<event> <filename>`, or `error <ERRNAME>` for error
/// events. JSON form is `{"event":..,"filename":..,"status":..}`.
pub fn format_event(event: &ChangeEvent, json: bool, color: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(event)?);
    }

    let label = event.kind.to_string();
    let label = match (color, event.kind) {
        (false, _) => label,
        (true, EventKind::Renamed) => label.yellow().to_string(),
        (true, EventKind::Changed) => label.green().to_string(),
        (true, EventKind::Unknown) => label.red().bold().to_string(),
    };

    let detail = if event.is_error() {
        Some(Status::from_code(event.error_code).name())
    } else {
        event.filename.clone()
    };

    Ok(match detail {
        Some(detail) => format!("{} {}", label, detail),
        None => label,
    })
}
