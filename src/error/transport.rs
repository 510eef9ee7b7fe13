//! Connection-level errors.
//!
//! These are the only errors a consumer of the controller ever sees. They are
//! reported once through `TransportHandler::on_error` and leave the transport
//! CLOSED.

use thiserror::Error;

use super::{ErrorCategory, HttpError};

/// Stream transport error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The handshake did not reach OPEN within the configured timeout.
    #[error("Handshake timed out after {timeout_ms}ms")]
    HandshakeTimeout { timeout_ms: u64 },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// The response had no streamable body.
    #[error("Response has no body to stream")]
    MissingBody,

    /// The request could not be sent or the response never arrived.
    #[error("Network error: {0}")]
    Network(#[from] HttpError),

    /// Reading the body failed after the stream was open.
    #[error("Stream read failed: {0}")]
    Read(HttpError),

    /// The request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Encode(String),
}

impl TransportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TransportError::HandshakeTimeout { .. } => ErrorCategory::Network,
            TransportError::HttpStatus { .. } => ErrorCategory::Server,
            TransportError::MissingBody => ErrorCategory::Protocol,
            TransportError::Network(err) | TransportError::Read(err) => err.category(),
            TransportError::Encode(_) => ErrorCategory::Configuration,
        }
    }

    /// Check if this error is likely transient. The transport never retries by
    /// itself; this is advice for the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            TransportError::MissingBody | TransportError::Encode(_) => false,
            _ => self.category().is_retryable(),
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::HandshakeTimeout { .. } => "E_STREAM_TIMEOUT",
            TransportError::HttpStatus { .. } => "E_STREAM_STATUS",
            TransportError::MissingBody => "E_STREAM_NO_BODY",
            TransportError::Network(_) => "E_STREAM_CONN",
            TransportError::Read(_) => "E_STREAM_READ",
            TransportError::Encode(_) => "E_STREAM_ENCODE",
        }
    }

    /// Message suitable for an inline error next to the input box.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::HandshakeTimeout { timeout_ms } if *timeout_ms < 1000 => format!(
                "The agent did not respond within {} ms. Please try again.",
                timeout_ms
            ),
            TransportError::HandshakeTimeout { timeout_ms } => format!(
                "The agent did not respond within {} seconds. Please try again.",
                timeout_ms / 1000
            ),
            TransportError::HttpStatus { status, reason } => {
                format!("The agent backend returned an error ({} {}).", status, reason)
            }
            TransportError::MissingBody => {
                "The agent backend returned an empty response.".to_string()
            }
            TransportError::Network(_) => {
                "Could not reach the agent backend. Check your connection.".to_string()
            }
            TransportError::Read(_) => {
                "Connection to the agent was lost while streaming.".to_string()
            }
            TransportError::Encode(_) => "The request could not be sent.".to_string(),
        }
    }

    /// [`user_message`](Self::user_message) followed by the category's
    /// recovery hint.
    pub fn user_message_with_hint(&self) -> String {
        format!("{} {}.", self.user_message(), self.category().recovery_hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status_and_reason() {
        let err = TransportError::HttpStatus {
            status: 502,
            reason: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_retryable_statuses() {
        let server = TransportError::HttpStatus {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        let client = TransportError::HttpStatus {
            status: 400,
            reason: "Bad Request".to_string(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(TransportError::HandshakeTimeout { timeout_ms: 10 }.is_retryable());
        assert!(!TransportError::MissingBody.is_retryable());
    }

    #[test]
    fn test_handshake_timeout_user_message_in_seconds() {
        let err = TransportError::HandshakeTimeout { timeout_ms: 15_000 };
        assert!(err.user_message().contains("15 seconds"));
        assert_eq!(err.error_code(), "E_STREAM_TIMEOUT");
    }

    #[test]
    fn test_sub_second_timeout_user_message_in_millis() {
        let err = TransportError::HandshakeTimeout { timeout_ms: 300 };
        assert!(err.user_message().contains("within 300 ms"));
    }

    #[test]
    fn test_user_message_with_hint() {
        let err = TransportError::Network(HttpError::ConnectionFailed("refused".to_string()));
        assert_eq!(
            err.user_message_with_hint(),
            "Could not reach the agent backend. Check your connection. \
             Check that the agent backend is reachable and try again."
        );
    }

    #[test]
    fn test_read_error_keeps_source_category() {
        let err = TransportError::Read(HttpError::Io("reset".to_string()));
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.error_code(), "E_STREAM_READ");
    }
}
