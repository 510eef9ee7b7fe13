//! Errors reported by [`HttpClient`](crate::traits::HttpClient) implementations.

use thiserror::Error;

use super::ErrorCategory;

/// HTTP client errors.
///
/// Kept as plain strings so the error stays `Clone` and independent of the
/// client library that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// Connection could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// The client gave up waiting
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// The response body could not be read
    #[error("IO error: {0}")]
    Io(String),
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Other error
    #[error("HTTP error: {0}")]
    Other(String),
}

impl HttpError {
    /// Classify a reqwest error the way the rest of the crate expects.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else if err.is_body() || err.is_decode() {
            HttpError::Io(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            HttpError::InvalidUrl(_) => ErrorCategory::Configuration,
            _ => ErrorCategory::Network,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::ConnectionFailed(_) => "E_HTTP_CONN",
            HttpError::Timeout(_) => "E_HTTP_TIMEOUT",
            HttpError::Io(_) => "E_HTTP_IO",
            HttpError::InvalidUrl(_) => "E_HTTP_URL",
            HttpError::Other(_) => "E_HTTP_OTHER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            HttpError::ConnectionFailed("refused".to_string()).to_string(),
            "Connection failed: refused"
        );
        assert_eq!(
            HttpError::InvalidUrl("nope".to_string()).to_string(),
            "Invalid URL: nope"
        );
    }

    #[test]
    fn test_invalid_url_is_configuration() {
        assert_eq!(
            HttpError::InvalidUrl("x".to_string()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            HttpError::Io("reset".to_string()).category(),
            ErrorCategory::Network
        );
    }
}
