//! Replay of stored history files.
//!
//! A history file holds one event per line, either in wire form
//! (`{"event": ..., "data": {...}}`) or as a captured SSE `data:` line. Blank
//! lines and `:` comments are skipped.

use std::path::Path;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;

use crate::sse::{try_parse_frame, AgentEvent, DATA_FIELD};
use crate::store::{batch_reduce, Store};

use super::transcript::render_conversation;

/// Parse the contents of a history file.
pub fn parse_history(text: &str) -> Result<Vec<AgentEvent>> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let event = if line.starts_with(DATA_FIELD) {
            try_parse_frame(line).wrap_err_with(|| format!("line {}", index + 1))?
        } else {
            Some(
                serde_json::from_str::<AgentEvent>(line)
                    .wrap_err_with(|| format!("line {}", index + 1))?,
            )
        };
        events.extend(event);
    }
    Ok(events)
}

/// Read and parse a history file.
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<AgentEvent>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read history file {}", path.display()))?;
    parse_history(&text)
}

/// Rebuild one conversation from `events`. Without an explicit id the first
/// event that names a conversation decides.
pub fn replay(events: &[AgentEvent], conversation: Option<&str>) -> Result<(String, Store)> {
    let conversation_id = conversation
        .or_else(|| events.iter().find_map(AgentEvent::conversation_id))
        .ok_or_else(|| eyre!("History contains no conversation id"))?
        .to_string();
    let store = batch_reduce(&Store::new(), &conversation_id, events, true);
    Ok((conversation_id, store))
}

/// Handle the --replay command.
pub fn handle_replay_command(path: &str, conversation: Option<&str>) -> Result<()> {
    let events = load_history(path)?;
    let (conversation_id, store) = replay(&events, conversation)?;
    if let Some(conversation) = store.conversation(&conversation_id) {
        print!("{}", render_conversation(conversation));
    }
    Ok(())
}
