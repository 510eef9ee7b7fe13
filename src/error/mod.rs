//! Error handling for the streaming client.
//!
//! Errors are split by the layer that produces them:
//!
//! | Error | Produced by | Escalates to consumer |
//! |-------|-------------|-----------------------|
//! | [`TransportError`] | connection lifecycle | Yes, via `on_error` |
//! | [`HttpError`] | [`HttpClient`](crate::traits::HttpClient) implementations | Wrapped in `TransportError` |
//! | [`FrameError`] | frame parsing | No, logged and dropped |
//! | [`ConfigError`] | configuration loading | Yes, at startup |
//!
//! Every error exposes a short `error_code()` for logging and an
//! [`ErrorCategory`] for handling decisions. Nothing in this crate retries on
//! its own; `is_retryable()` is advice for callers that layer a retry policy on
//! top.

mod category;
mod config;
mod frame;
mod http;
mod transport;

pub use category::ErrorCategory;
pub use config::ConfigError;
pub use frame::FrameError;
pub use http::HttpError;
pub use transport::TransportError;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::sse::PartialJsonError;

    #[test]
    fn test_every_layer_has_a_category_and_code() {
        let transport = TransportError::HandshakeTimeout { timeout_ms: 500 };
        let http = HttpError::ConnectionFailed("refused".to_string());
        let frame: FrameError = PartialJsonError::Empty.into();
        let config = ConfigError::InvalidValue {
            key: "AGENTSTREAM_URL".to_string(),
            message: "empty".to_string(),
        };

        assert_eq!(transport.category(), ErrorCategory::Network);
        assert_eq!(http.category(), ErrorCategory::Network);
        assert_eq!(frame.category(), ErrorCategory::Protocol);
        assert_eq!(config.category(), ErrorCategory::Configuration);

        for code in [
            transport.error_code(),
            http.error_code(),
            frame.error_code(),
            config.error_code(),
        ] {
            assert!(code.starts_with("E_"));
        }
    }

    #[test]
    fn test_http_error_wraps_into_transport_error() {
        let err: TransportError = HttpError::Timeout("read".to_string()).into();
        assert!(matches!(err, TransportError::Network(_)));
        assert!(err.is_retryable());
    }
}
