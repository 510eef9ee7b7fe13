//! Recording implementations of the crate's callback traits.

use std::ops::ControlFlow;
use std::sync::Mutex;

use agentstream::error::TransportError;
use agentstream::sse::AgentEvent;
use agentstream::transport::{ConnectionState, TransportHandler};

/// One callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    State(ConnectionState),
    Open,
    Event(String),
    Close,
    Error(TransportError),
}

/// Transport handler that records every callback.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<Callback>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, callback: Callback) {
        self.calls.lock().unwrap().push(callback);
    }

    pub fn calls(&self) -> Vec<Callback> {
        self.calls.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Callback::Close))
            .count()
    }

    pub fn errors(&self) -> Vec<TransportError> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Callback::Error(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    pub fn event_tags(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Callback::Event(tag) => Some(tag),
                _ => None,
            })
            .collect()
    }
}

impl TransportHandler for RecordingHandler {
    fn on_open(&self) {
        self.push(Callback::Open);
    }

    fn on_event(&self, event: AgentEvent) -> ControlFlow<()> {
        self.push(Callback::Event(event.tag().to_string()));
        ControlFlow::Continue(())
    }

    fn on_close(&self) {
        self.push(Callback::Close);
    }

    fn on_error(&self, error: &TransportError) {
        self.push(Callback::Error(error.clone()));
    }

    fn on_state_change(&self, state: ConnectionState) {
        self.push(Callback::State(state));
    }
}
