//! Server-sent event ingestion
//!
//! Turns the bytes of a streaming response into typed [`AgentEvent`]s.
//!
//! # Module structure
//! - `frame` - Incremental UTF-8 decoding and `\n\n` frame splitting
//! - `parser` - Frame to event parsing (`parse_frame`)
//! - `partial_json` - Tolerant JSON scanner for frames cut mid-document
//! - `events` - Event type definitions (`AgentEvent` and payloads)

mod events;
mod frame;
mod parser;
pub mod partial_json;

pub use events::{
    AgentEvent, ComponentData, ContentData, ContentPayload, ConversationStartedData, DoneData,
    ItemRef, PathData, ToolCallData, ToolCallPayload,
};
pub use frame::{FrameBuffer, FrameDecoder};
pub use parser::{frame_data, parse_frame, try_parse_frame, DATA_FIELD};
pub use partial_json::PartialJsonError;
