//! Frame parsing
//!
//! A frame is one or more lines. Only `data:` lines carry payload; each is
//! stripped of its marker, trimmed, and joined with `\n` before the JSON is
//! read. `event:`, `id:`, `retry:` and `:` comment lines are ignored: the
//! event tag comes from the `event` key inside the JSON, not from the
//! transport-level event name.

use serde_json::Value;

use crate::error::FrameError;
use crate::sse::events::AgentEvent;
use crate::sse::partial_json;

/// Field marker of payload lines.
pub const DATA_FIELD: &str = "data:";

/// Collect the payload of a frame, or `None` if it has no data lines.
pub fn frame_data(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw
        .lines()
        .filter_map(|line| line.strip_prefix(DATA_FIELD))
        .map(str::trim)
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Parse a frame, reporting why it could not be turned into an event.
///
/// Returns `Ok(None)` for frames without data lines (comments, keep-alives).
pub fn try_parse_frame(raw: &str) -> Result<Option<AgentEvent>, FrameError> {
    let Some(data) = frame_data(raw) else {
        return Ok(None);
    };

    let value = match serde_json::from_str::<Value>(&data) {
        Ok(value) => value,
        Err(_) => {
            let parsed = partial_json::parse_document(&data)?;
            if parsed.truncated {
                tracing::debug!(bytes = data.len(), "Recovered event from truncated frame");
            }
            parsed.value
        }
    };

    let Value::Object(mut object) = value else {
        return Err(FrameError::NotAnObject);
    };

    let tag = match object.remove("event") {
        Some(Value::String(tag)) => tag,
        _ => return Err(FrameError::MissingEventTag),
    };
    let data = match object.remove("data") {
        Some(Value::Null) | None => Value::Object(Default::default()),
        Some(data) => data,
    };

    AgentEvent::from_parts(&tag, data).map(Some)
}

/// Parse a frame into an event.
///
/// A frame that cannot be parsed, even tolerantly, is dropped with a warning;
/// one bad frame must not end an otherwise healthy stream.
pub fn parse_frame(raw: &str) -> Option<AgentEvent> {
    match try_parse_frame(raw) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(
                code = err.error_code(),
                error = %err,
                frame = %truncate_for_log(raw),
                "Dropping unparseable frame"
            );
            None
        }
    }
}

fn truncate_for_log(raw: &str) -> &str {
    const MAX: usize = 200;
    if raw.len() <= MAX {
        return raw;
    }
    let mut end = MAX;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}
