//! Mock HTTP client for testing.
//!
//! Responses are scripted in order: every `post_stream` call takes the next
//! queued [`MockResponse`], or the default one when the queue is empty.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use tokio::sync::mpsc;

use crate::error::HttpError;
use crate::traits::{ByteStream, Headers, HttpClient, StreamingResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: String,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Request body decoded as JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Configuration for a mock response.
#[derive(Debug)]
pub enum MockResponse {
    /// Respond with `status` and a body made of `chunks`, then end the body
    Chunks { status: u16, chunks: Vec<Bytes> },
    /// Respond 200 with a body fed by a [`MockBody`]
    Channel(mpsc::UnboundedReceiver<Result<Bytes, HttpError>>),
    /// Respond with `status` and no body
    Empty(u16),
    /// Fail before any response head arrives
    Error(HttpError),
    /// Never produce a response head
    Hang,
    /// Wait before producing the inner response
    Delayed(Duration, Box<MockResponse>),
}

impl MockResponse {
    /// A 200 response carrying the given SSE frames, one chunk per frame.
    pub fn frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chunks = frames
            .into_iter()
            .map(|frame| Bytes::from(format!("data: {}\n\n", frame.as_ref())))
            .collect();
        MockResponse::Chunks {
            status: 200,
            chunks,
        }
    }

    /// Delay this response by `delay`.
    pub fn delayed(self, delay: Duration) -> Self {
        MockResponse::Delayed(delay, Box::new(self))
    }
}

/// Sending half of a [`MockResponse::Channel`] body.
///
/// Dropping it ends the body.
#[derive(Debug, Clone)]
pub struct MockBody {
    tx: mpsc::UnboundedSender<Result<Bytes, HttpError>>,
}

impl MockBody {
    /// Create a body and the response that streams it.
    pub fn channel() -> (Self, MockResponse) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, MockResponse::Channel(rx))
    }

    /// Send raw bytes. Returns false once the reader has gone away.
    pub fn send_bytes(&self, bytes: impl Into<Bytes>) -> bool {
        self.tx.send(Ok(bytes.into())).is_ok()
    }

    /// Send one complete `data:` frame.
    pub fn send_frame(&self, json: &str) -> bool {
        self.send_bytes(format!("data: {}\n\n", json))
    }

    /// Fail the body read with `err`.
    pub fn fail(&self, err: HttpError) -> bool {
        self.tx.send(Err(err)).is_ok()
    }

    /// Whether the transport dropped its end of the body.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Mock HTTP client for testing.
///
/// # Example
///
/// ```ignore
/// use agentstream::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.push_response(MockResponse::frames([
///     r#"{"event":"done","data":{"conversation_id":"c1","thread_id":"t1"}}"#,
/// ]));
///
/// // ... drive a StreamTransport with `client` ...
///
/// assert_eq!(client.requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Scripted responses, consumed in order
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the response for the next request.
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Queue a channel-backed response and return its sending half.
    pub fn push_channel(&self) -> MockBody {
        let (body, response) = MockBody::channel();
        self.push_response(response);
        body
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests made so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_response(&self) -> Option<MockResponse> {
        lock(&self.responses).pop_front()
    }
}

fn channel_stream(rx: mpsc::UnboundedReceiver<Result<Bytes, HttpError>>) -> ByteStream {
    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    }))
}

async fn respond(response: MockResponse) -> Result<StreamingResponse, HttpError> {
    let mut response = response;
    loop {
        match response {
            MockResponse::Chunks { status, chunks } => {
                let body: ByteStream = Box::pin(stream::iter(chunks.into_iter().map(Ok)));
                return Ok(StreamingResponse::new(status, body));
            }
            MockResponse::Channel(rx) => {
                return Ok(StreamingResponse::new(200, channel_stream(rx)));
            }
            MockResponse::Empty(status) => return Ok(StreamingResponse::without_body(status)),
            MockResponse::Error(err) => return Err(err),
            MockResponse::Hang => std::future::pending::<()>().await,
            MockResponse::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                response = *inner;
            }
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: String,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError> {
        lock(&self.requests).push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });

        match self.next_response() {
            Some(response) => respond(response).await,
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
