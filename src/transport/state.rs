use std::fmt;

/// Transport connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// Request sent, waiting for the response head
    Connecting,
    /// Response accepted, body is being read
    Open,
    /// No connection
    #[default]
    Closed,
}

impl ConnectionState {
    /// CONNECTING or OPEN. At most one connection is ever in this state.
    pub fn is_active(self) -> bool {
        !matches!(self, ConnectionState::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a connection was stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// `close()` was called
    Manual,
    /// A newer connect replaced this one
    Superseded,
    /// The handler asked to stop after an event
    Handler,
}
