//! Common test utilities for integration tests.
//!
//! Event builders, SSE body helpers and a recording transport handler.
//!
//! # Example
//!
//! ```ignore
//! mod common;
//! use common::{chunk, sse_body};
//!
//! let body = sse_body(&[chunk("i1", "Hi"), chunk("i1", " there")]);
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::time::Duration;

use agentstream::config::TransportConfig;
use agentstream::sse::{AgentEvent, ContentData, DoneData, ItemRef};
use agentstream::transport::ConnectionState;
use tokio::sync::watch;

/// Target in conversation c1, thread t1, task k1.
pub fn item_ref(item_id: &str) -> ItemRef {
    ItemRef::new("c1", "t1", "k1", item_id)
}

pub fn thread_started(item_id: &str) -> AgentEvent {
    AgentEvent::ThreadStarted(ContentData::new(item_ref(item_id), ""))
}

pub fn chunk(item_id: &str, content: &str) -> AgentEvent {
    AgentEvent::MessageChunk(ContentData::new(item_ref(item_id), content))
}

pub fn done(conversation_id: &str, thread_id: &str) -> AgentEvent {
    AgentEvent::Done(DoneData {
        conversation_id: conversation_id.to_string(),
        thread_id: thread_id.to_string(),
    })
}

/// One SSE frame carrying `event` in wire form.
pub fn sse_frame(event: &AgentEvent) -> String {
    format!("data: {}\n\n", serde_json::to_string(event).unwrap())
}

pub fn sse_body(events: &[AgentEvent]) -> String {
    events.iter().map(sse_frame).collect()
}

/// Config pointing at `url` with a short handshake timeout.
pub fn test_config(url: &str) -> TransportConfig {
    TransportConfig::new()
        .with_url(url)
        .with_handshake_timeout(Duration::from_millis(300))
        .with_agent_id("test-agent")
}

/// Wait until `rx` reports `state`, failing the test after two seconds.
pub async fn wait_for_state(rx: &mut watch::Receiver<ConnectionState>, state: ConnectionState) {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == state))
        .await
        .expect("timed out waiting for connection state")
        .expect("state channel closed");
}
