use std::ops::ControlFlow;

use super::ConnectionState;
use crate::error::TransportError;
use crate::sse::AgentEvent;

/// Callbacks for one transport.
///
/// For a single connect attempt the transport guarantees:
///
/// - `on_close` fires at most once, and only after `on_open`
/// - `on_error` and `on_close` never both fire
/// - nothing but `on_state_change` fires when the attempt is stopped before
///   it reached OPEN
///
/// Callbacks run on the task driving `connect` and must not block.
pub trait TransportHandler: Send + Sync {
    /// The response was accepted and the body is about to be read.
    fn on_open(&self) {}

    /// A frame parsed into an event. Returning `Break` closes the stream
    /// cleanly, as if `close()` had been called after this event.
    fn on_event(&self, event: AgentEvent) -> ControlFlow<()>;

    /// An OPEN connection ended without an error.
    fn on_close(&self) {}

    /// The attempt failed. The transport is CLOSED when this fires.
    fn on_error(&self, _error: &TransportError) {}

    fn on_state_change(&self, _state: ConnectionState) {}
}
