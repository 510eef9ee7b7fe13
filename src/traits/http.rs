//! HTTP client trait abstraction.
//!
//! The transport only needs one operation: POST a body and receive the
//! response status plus a byte stream. Putting it behind a trait lets tests
//! drive the transport with in-memory responses whose timing they control.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::error::HttpError;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Response body delivered incrementally.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Status line and body of a streaming response.
pub struct StreamingResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase for the status
    pub reason: String,
    /// Response body, `None` if the response carries nothing to stream
    pub body: Option<ByteStream>,
}

impl StreamingResponse {
    /// A response with a body.
    pub fn new(status: u16, body: ByteStream) -> Self {
        Self {
            status,
            reason: reason_phrase(status).to_string(),
            body: Some(body),
        }
    }

    /// A response with nothing to stream.
    pub fn without_body(status: u16) -> Self {
        Self {
            status,
            reason: reason_phrase(status).to_string(),
            body: None,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown Status")
}

/// Trait for the HTTP operation the stream transport performs.
///
/// # Example
///
/// ```ignore
/// use agentstream::traits::{HttpClient, Headers};
///
/// async fn status<C: HttpClient>(client: &C) -> u16 {
///     match client.post_stream("http://localhost:8000/v1/stream", "{}".into(), &Headers::new()).await {
///         Ok(response) => response.status,
///         Err(_) => 0,
///     }
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST `body` to `url` and return as soon as the response head arrives.
    ///
    /// # Arguments
    /// * `url` - The URL to request
    /// * `body` - Request body
    /// * `headers` - Request headers, already merged by the caller
    async fn post_stream(
        &self,
        url: &str,
        body: String,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn test_response_is_success() {
        assert!(StreamingResponse::without_body(200).is_success());
        assert!(StreamingResponse::without_body(204).is_success());
        assert!(StreamingResponse::without_body(299).is_success());
        assert!(!StreamingResponse::without_body(300).is_success());
        assert!(!StreamingResponse::without_body(404).is_success());
        assert!(!StreamingResponse::without_body(500).is_success());
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(StreamingResponse::without_body(404).reason, "Not Found");
        assert_eq!(StreamingResponse::without_body(599).reason, "Unknown Status");
    }

    #[test]
    fn test_debug_hides_body_stream() {
        let body: ByteStream = Box::pin(stream::empty());
        let response = StreamingResponse::new(200, body);
        let debug = format!("{:?}", response);
        assert!(debug.contains("has_body: true"));
    }
}
