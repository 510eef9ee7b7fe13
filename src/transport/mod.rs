//! Streaming transport for agent responses.
//!
//! A [`StreamTransport`] owns at most one connection at a time. `connect`
//! POSTs the request, races the response head against the handshake timeout,
//! then reads the body through a [`FrameBuffer`] and hands every parsed event
//! to its [`TransportHandler`].
//!
//! ```text
//! CLOSED --connect--> CONNECTING --response head--> OPEN --body ends--> CLOSED
//!                         |                           |
//!                         +--timeout / error----------+--error--------> CLOSED
//!                         +--close / reconnect--------+--close--------> CLOSED
//! ```
//!
//! Nothing here retries. Every failure is reported once through
//! `on_error` and leaves the transport CLOSED.

mod handler;
mod state;

pub use handler::TransportHandler;
pub use state::{CloseReason, ConnectionState};

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::models::StreamRequest;
use crate::sse::{parse_frame, FrameBuffer};
use crate::traits::{ByteStream, HttpClient, StreamingResponse};

/// How a call to [`StreamTransport::connect`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Another connection was already CONNECTING or OPEN
    Ignored,
    /// The server ended the body
    Completed,
    /// Stopped without an error
    Closed(CloseReason),
    /// Failed; the error was already passed to `on_error`
    Failed(TransportError),
}

/// Abort handle for one connect attempt.
#[derive(Debug, Clone, Default)]
struct Attempt {
    cancel: CancellationToken,
    reason: Arc<OnceLock<CloseReason>>,
}

impl Attempt {
    fn abort(&self, reason: CloseReason) {
        let _ = self.reason.set(reason);
        self.cancel.cancel();
    }

    fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct Slot {
    state: ConnectionState,
    /// Bumped by every connect. A read loop whose generation no longer
    /// matches has been replaced and must not touch the state.
    generation: u64,
    attempt: Option<Attempt>,
}

struct Inner<C> {
    client: C,
    config: TransportConfig,
    handler: Arc<dyn TransportHandler>,
    slot: Mutex<Slot>,
    state_tx: watch::Sender<ConnectionState>,
}

/// Handle to a stream transport. Clones share the same connection.
pub struct StreamTransport<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for StreamTransport<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn accept(response: StreamingResponse) -> Result<ByteStream, TransportError> {
    if !response.is_success() {
        return Err(TransportError::HttpStatus {
            status: response.status,
            reason: response.reason,
        });
    }
    response.body.ok_or(TransportError::MissingBody)
}

impl<C: HttpClient + 'static> StreamTransport<C> {
    pub fn new(client: C, config: TransportConfig, handler: Arc<dyn TransportHandler>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Closed);
        Self {
            inner: Arc::new(Inner {
                client,
                config,
                handler,
                slot: Mutex::new(Slot::default()),
                state_tx,
            }),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.inner.config
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        lock(&self.inner.slot).state
    }

    /// Subscribe to connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Open a stream for `request` and drive it until it ends.
    ///
    /// Returns [`ConnectOutcome::Ignored`] without sending anything if a
    /// connection is already CONNECTING or OPEN.
    pub async fn connect(&self, request: &StreamRequest) -> ConnectOutcome {
        let body = match serde_json::to_string(request) {
            Ok(body) => body,
            Err(e) => {
                if self.state().is_active() {
                    return ConnectOutcome::Ignored;
                }
                let err = TransportError::Encode(e.to_string());
                warn!("Stream request not sent [{}]: {}", err.error_code(), err);
                self.inner.handler.on_error(&err);
                return ConnectOutcome::Failed(err);
            }
        };

        let Some((generation, attempt)) = self.begin() else {
            debug!("Connect ignored, a stream is already active");
            return ConnectOutcome::Ignored;
        };
        self.inner.handler.on_state_change(ConnectionState::Connecting);
        info!("Connecting to {}", self.inner.config.url);

        self.run(generation, &attempt, body).await
    }

    /// Stop the active connection, if any.
    ///
    /// Before OPEN the attempt is dropped silently. After OPEN `on_close`
    /// fires once. Calling it again, or on a transport that never connected,
    /// does nothing.
    pub fn close(&self) {
        self.shutdown(CloseReason::Manual);
    }

    /// Replace the active connection with a new one for `request`.
    pub async fn reconnect(&self, request: &StreamRequest) -> ConnectOutcome {
        self.shutdown(CloseReason::Superseded);
        self.connect(request).await
    }

    fn begin(&self) -> Option<(u64, Attempt)> {
        let mut slot = lock(&self.inner.slot);
        if slot.state.is_active() {
            return None;
        }
        let attempt = Attempt::default();
        slot.generation += 1;
        slot.attempt = Some(attempt.clone());
        slot.state = ConnectionState::Connecting;
        self.inner.state_tx.send_replace(ConnectionState::Connecting);
        Some((slot.generation, attempt))
    }

    fn shutdown(&self, reason: CloseReason) -> bool {
        let previous = {
            let mut slot = lock(&self.inner.slot);
            if !slot.state.is_active() {
                return false;
            }
            let previous = slot.state;
            slot.state = ConnectionState::Closed;
            if let Some(attempt) = slot.attempt.take() {
                attempt.abort(reason);
            }
            self.inner.state_tx.send_replace(ConnectionState::Closed);
            previous
        };

        info!("Closing stream ({:?}) while {}", reason, previous);
        self.inner.handler.on_state_change(ConnectionState::Closed);
        if previous == ConnectionState::Open {
            self.inner.handler.on_close();
        }
        true
    }

    /// Move `generation` from CONNECTING to OPEN. False if it was closed or
    /// replaced in the meantime.
    fn open(&self, generation: u64) -> bool {
        {
            let mut slot = lock(&self.inner.slot);
            if slot.generation != generation || slot.state != ConnectionState::Connecting {
                return false;
            }
            slot.state = ConnectionState::Open;
            self.inner.state_tx.send_replace(ConnectionState::Open);
        }
        self.inner.handler.on_state_change(ConnectionState::Open);
        self.inner.handler.on_open();
        true
    }

    /// Close `generation` from the read side. Returns the state it was in,
    /// or `None` if somebody else already closed it.
    fn finish(&self, generation: u64) -> Option<ConnectionState> {
        let mut slot = lock(&self.inner.slot);
        if slot.generation != generation || !slot.state.is_active() {
            return None;
        }
        let previous = slot.state;
        slot.state = ConnectionState::Closed;
        slot.attempt = None;
        self.inner.state_tx.send_replace(ConnectionState::Closed);
        Some(previous)
    }

    async fn run(&self, generation: u64, attempt: &Attempt, body: String) -> ConnectOutcome {
        let config = &self.inner.config;
        let headers = config.request_headers();
        let timeout = config.handshake_timeout;

        let handshake = tokio::select! {
            biased;
            _ = attempt.cancel.cancelled() => None,
            _ = tokio::time::sleep(timeout) => Some(Err(TransportError::HandshakeTimeout {
                timeout_ms: timeout.as_millis() as u64,
            })),
            response = self.inner.client.post_stream(&config.url, body, &headers) => {
                Some(response.map_err(TransportError::from).and_then(accept))
            }
        };

        let body = match handshake {
            None => return self.stopped(attempt),
            Some(Ok(body)) => body,
            Some(Err(err)) => return self.fail(generation, attempt, err),
        };

        if !self.open(generation) {
            return self.stopped(attempt);
        }
        info!("Stream open");

        self.read(generation, attempt, body).await
    }

    async fn read(&self, generation: u64, attempt: &Attempt, mut body: ByteStream) -> ConnectOutcome {
        let mut frames = FrameBuffer::new();

        loop {
            let chunk = tokio::select! {
                biased;
                _ = attempt.cancel.cancelled() => return self.stopped(attempt),
                chunk = body.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => {
                    if self.dispatch(attempt, frames.push(&bytes)).is_break() {
                        return self.handler_closed(generation, attempt);
                    }
                }
                Some(Err(err)) => {
                    return self.fail(generation, attempt, TransportError::Read(err));
                }
                None => {
                    let (rest, unterminated) = frames.finish();
                    if self.dispatch(attempt, rest).is_break() {
                        return self.handler_closed(generation, attempt);
                    }
                    if let Some(partial) = unterminated {
                        warn!(
                            "Discarding unterminated frame at end of stream ({} bytes)",
                            partial.len()
                        );
                    }
                    return self.complete(generation, attempt);
                }
            }
        }
    }

    /// Hand complete frames to the handler in order. Stops between frames
    /// once the attempt is aborted.
    fn dispatch(&self, attempt: &Attempt, frames: Vec<String>) -> ControlFlow<()> {
        for raw in frames {
            if attempt.is_aborted() {
                break;
            }
            if let Some(event) = parse_frame(&raw) {
                debug!("Dispatching {} event", event.tag());
                if self.inner.handler.on_event(event).is_break() {
                    return ControlFlow::Break(());
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn complete(&self, generation: u64, attempt: &Attempt) -> ConnectOutcome {
        if self.finish(generation).is_none() {
            return self.stopped(attempt);
        }
        info!("Stream ended");
        self.inner.handler.on_state_change(ConnectionState::Closed);
        self.inner.handler.on_close();
        ConnectOutcome::Completed
    }

    fn handler_closed(&self, generation: u64, attempt: &Attempt) -> ConnectOutcome {
        attempt.abort(CloseReason::Handler);
        if self.finish(generation).is_none() {
            return self.stopped(attempt);
        }
        info!("Stream closed by handler");
        self.inner.handler.on_state_change(ConnectionState::Closed);
        self.inner.handler.on_close();
        ConnectOutcome::Closed(CloseReason::Handler)
    }

    fn fail(&self, generation: u64, attempt: &Attempt, err: TransportError) -> ConnectOutcome {
        attempt.cancel.cancel();
        if self.finish(generation).is_none() {
            return self.stopped(attempt);
        }
        warn!("Stream failed [{}]: {}", err.error_code(), err);
        self.inner.handler.on_state_change(ConnectionState::Closed);
        self.inner.handler.on_error(&err);
        ConnectOutcome::Failed(err)
    }

    /// The attempt was stopped by `close`, `reconnect` or the handler;
    /// whoever stopped it already emitted the callbacks.
    fn stopped(&self, attempt: &Attempt) -> ConnectOutcome {
        let reason = attempt
            .reason
            .get()
            .copied()
            .unwrap_or(CloseReason::Manual);
        debug!("Stream attempt stopped ({:?})", reason);
        ConnectOutcome::Closed(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::error::HttpError;
    use crate::sse::AgentEvent;
    use bytes::Bytes;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        State(ConnectionState),
        Open,
        Event(AgentEvent),
        Close,
        Error(TransportError),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Call>>,
        break_on_done: bool,
    }

    impl Recorder {
        fn push(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls().iter().filter(|call| pred(call)).count()
        }

        fn closes(&self) -> usize {
            self.count(|call| matches!(call, Call::Close))
        }

        fn errors(&self) -> usize {
            self.count(|call| matches!(call, Call::Error(_)))
        }

        fn events(&self) -> Vec<AgentEvent> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Event(event) => Some(event),
                    _ => None,
                })
                .collect()
        }
    }

    impl TransportHandler for Recorder {
        fn on_open(&self) {
            self.push(Call::Open);
        }

        fn on_event(&self, event: AgentEvent) -> ControlFlow<()> {
            let done = event.is_terminal();
            self.push(Call::Event(event));
            if done && self.break_on_done {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }

        fn on_close(&self) {
            self.push(Call::Close);
        }

        fn on_error(&self, error: &TransportError) {
            self.push(Call::Error(error.clone()));
        }

        fn on_state_change(&self, state: ConnectionState) {
            self.push(Call::State(state));
        }
    }

    fn chunk_frame(content: &str) -> String {
        format!(
            r#"{{"event":"message_chunk","data":{{"conversation_id":"c1","thread_id":"t1","task_id":"k1","item_id":"i1","payload":{{"content":"{}"}}}}}}"#,
            content
        )
    }

    const DONE_FRAME: &str =
        r#"{"event":"done","data":{"conversation_id":"c1","thread_id":"t1"}}"#;

    fn setup(
        client: &MockHttpClient,
        recorder: Recorder,
    ) -> (StreamTransport<MockHttpClient>, Arc<Recorder>) {
        let recorder = Arc::new(recorder);
        let config = TransportConfig::new()
            .with_url("http://agent.test/v1/stream")
            .with_handshake_timeout(Duration::from_millis(50));
        let transport = StreamTransport::new(client.clone(), config, recorder.clone());
        (transport, recorder)
    }

    fn request() -> StreamRequest {
        StreamRequest::new("hello", "agent-1")
    }

    fn spawn_connect(
        transport: &StreamTransport<MockHttpClient>,
    ) -> tokio::task::JoinHandle<ConnectOutcome> {
        let transport = transport.clone();
        tokio::spawn(async move { transport.connect(&request()).await })
    }

    async fn wait_for_state(transport: &StreamTransport<MockHttpClient>, state: ConnectionState) {
        let mut rx = transport.subscribe_state();
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == state))
            .await
            .expect("timed out waiting for state")
            .expect("state channel closed");
    }

    #[tokio::test]
    async fn test_stream_to_completion() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::frames([chunk_frame("Hel"), chunk_frame("lo")]));
        let (transport, recorder) = setup(&client, Recorder::default());

        let outcome = transport.connect(&request()).await;

        assert_eq!(outcome, ConnectOutcome::Completed);
        assert_eq!(transport.state(), ConnectionState::Closed);
        let calls = recorder.calls();
        assert_eq!(calls[0], Call::State(ConnectionState::Connecting));
        assert_eq!(calls[1], Call::State(ConnectionState::Open));
        assert_eq!(calls[2], Call::Open);
        assert_eq!(recorder.events().len(), 2);
        assert_eq!(calls[calls.len() - 2], Call::State(ConnectionState::Closed));
        assert_eq!(calls[calls.len() - 1], Call::Close);
        assert_eq!(recorder.errors(), 0);
    }

    #[tokio::test]
    async fn test_connect_sends_fixed_headers_and_body() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::frames(Vec::<String>::new()));
        let config = TransportConfig::new()
            .with_url("http://agent.test/v1/stream")
            .with_header("Accept", "application/json")
            .with_header("Authorization", "Bearer t");
        let transport = StreamTransport::new(client.clone(), config, Arc::new(Recorder::default()));

        transport
            .connect(&StreamRequest::new("hello", "agent-1").with_conversation("c9"))
            .await;

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://agent.test/v1/stream");
        assert_eq!(requests[0].header("accept"), Some("text/event-stream"));
        assert_eq!(requests[0].header("cache-control"), Some("no-cache"));
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(requests[0].header("authorization"), Some("Bearer t"));
        let body = requests[0].json().unwrap();
        assert_eq!(body["query"], "hello");
        assert_eq!(body["agent_id"], "agent-1");
        assert_eq!(body["conversation_id"], "c9");
    }

    #[tokio::test]
    async fn test_handshake_timeout_reports_error_without_close() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Hang);
        let (transport, recorder) = setup(&client, Recorder::default());

        let outcome = transport.connect(&request()).await;

        assert_eq!(
            outcome,
            ConnectOutcome::Failed(TransportError::HandshakeTimeout { timeout_ms: 50 })
        );
        assert_eq!(transport.state(), ConnectionState::Closed);
        assert_eq!(recorder.errors(), 1);
        assert_eq!(recorder.closes(), 0);
        assert_eq!(recorder.count(|call| matches!(call, Call::Open)), 0);
    }

    #[tokio::test]
    async fn test_close_while_connecting_is_silent() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Hang);
        let (transport, recorder) = setup(&client, Recorder::default());

        let handle = spawn_connect(&transport);
        wait_for_state(&transport, ConnectionState::Connecting).await;
        transport.close();

        assert_eq!(handle.await.unwrap(), ConnectOutcome::Closed(CloseReason::Manual));
        assert_eq!(
            recorder.calls(),
            vec![
                Call::State(ConnectionState::Connecting),
                Call::State(ConnectionState::Closed),
            ]
        );
    }

    #[tokio::test]
    async fn test_close_after_open_fires_single_close() {
        let client = MockHttpClient::new();
        let body = client.push_channel();
        let (transport, recorder) = setup(&client, Recorder::default());

        let handle = spawn_connect(&transport);
        wait_for_state(&transport, ConnectionState::Open).await;
        transport.close();
        transport.close();

        assert_eq!(handle.await.unwrap(), ConnectOutcome::Closed(CloseReason::Manual));
        assert_eq!(recorder.closes(), 1);
        assert_eq!(recorder.errors(), 0);
        assert!(body.is_closed());
    }

    #[tokio::test]
    async fn test_close_never_connected_emits_nothing() {
        let client = MockHttpClient::new();
        let (transport, recorder) = setup(&client, Recorder::default());

        transport.close();

        assert!(recorder.calls().is_empty());
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_while_active_is_ignored() {
        let client = MockHttpClient::new();
        let _body = client.push_channel();
        let (transport, _recorder) = setup(&client, Recorder::default());

        let handle = spawn_connect(&transport);
        wait_for_state(&transport, ConnectionState::Open).await;

        assert_eq!(transport.connect(&request()).await, ConnectOutcome::Ignored);
        assert_eq!(client.request_count(), 1);

        transport.close();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Empty(503));
        let (transport, recorder) = setup(&client, Recorder::default());

        let outcome = transport.connect(&request()).await;

        assert_eq!(
            outcome,
            ConnectOutcome::Failed(TransportError::HttpStatus {
                status: 503,
                reason: "Service Unavailable".to_string(),
            })
        );
        assert_eq!(recorder.closes(), 0);
    }

    #[tokio::test]
    async fn test_missing_body_is_an_error() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Empty(200));
        let (transport, _recorder) = setup(&client, Recorder::default());

        assert_eq!(
            transport.connect(&request()).await,
            ConnectOutcome::Failed(TransportError::MissingBody)
        );
    }

    #[tokio::test]
    async fn test_network_error_is_not_retried() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Error(HttpError::ConnectionFailed(
            "refused".to_string(),
        )));
        let (transport, recorder) = setup(&client, Recorder::default());

        let outcome = transport.connect(&request()).await;

        assert!(matches!(
            outcome,
            ConnectOutcome::Failed(TransportError::Network(HttpError::ConnectionFailed(_)))
        ));
        assert_eq!(client.request_count(), 1);
        assert_eq!(recorder.errors(), 1);
    }

    #[tokio::test]
    async fn test_read_error_after_open() {
        let client = MockHttpClient::new();
        let body = client.push_channel();
        body.send_frame(&chunk_frame("partial"));
        body.fail(HttpError::Io("connection reset".to_string()));
        let (transport, recorder) = setup(&client, Recorder::default());

        let outcome = transport.connect(&request()).await;

        assert_eq!(
            outcome,
            ConnectOutcome::Failed(TransportError::Read(HttpError::Io(
                "connection reset".to_string()
            )))
        );
        assert_eq!(recorder.events().len(), 1);
        assert_eq!(recorder.errors(), 1);
        assert_eq!(recorder.closes(), 0);
    }

    #[tokio::test]
    async fn test_handler_break_closes_cleanly() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::frames([
            chunk_frame("a"),
            DONE_FRAME.to_string(),
            chunk_frame("never"),
        ]));
        let recorder = Recorder {
            break_on_done: true,
            ..Recorder::default()
        };
        let (transport, recorder) = setup(&client, recorder);

        let outcome = transport.connect(&request()).await;

        assert_eq!(outcome, ConnectOutcome::Closed(CloseReason::Handler));
        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert!(events[1].is_terminal());
        assert_eq!(recorder.closes(), 1);
        assert_eq!(transport.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_close_stream() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::frames([
            "{not json at all".to_string(),
            chunk_frame("ok"),
        ]));
        let (transport, recorder) = setup(&client, Recorder::default());

        assert_eq!(transport.connect(&request()).await, ConnectOutcome::Completed);
        assert_eq!(recorder.events().len(), 1);
        assert_eq!(recorder.errors(), 0);
    }

    #[tokio::test]
    async fn test_frame_split_across_chunks() {
        let client = MockHttpClient::new();
        let frame = format!("data: {}\n\n", chunk_frame("caf\u{e9}"));
        let bytes = frame.as_bytes();
        let split = frame.find('\u{e9}').unwrap() + 1;
        client.push_response(MockResponse::Chunks {
            status: 200,
            chunks: vec![
                Bytes::copy_from_slice(&bytes[..split]),
                Bytes::copy_from_slice(&bytes[split..]),
            ],
        });
        let (transport, recorder) = setup(&client, Recorder::default());

        transport.connect(&request()).await;

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            AgentEvent::MessageChunk(data) => assert_eq!(data.payload.content, "caf\u{e9}"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unterminated_frame_is_discarded() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Chunks {
            status: 200,
            chunks: vec![Bytes::from(format!("data: {}", chunk_frame("tail")))],
        });
        let (transport, recorder) = setup(&client, Recorder::default());

        assert_eq!(transport.connect(&request()).await, ConnectOutcome::Completed);
        assert!(recorder.events().is_empty());
        assert_eq!(recorder.closes(), 1);
    }

    #[tokio::test]
    async fn test_reconnect_supersedes_active_stream() {
        let client = MockHttpClient::new();
        let first_body = client.push_channel();
        client.push_response(MockResponse::frames([chunk_frame("second")]));
        let (transport, recorder) = setup(&client, Recorder::default());

        let first = spawn_connect(&transport);
        wait_for_state(&transport, ConnectionState::Open).await;

        let second = transport.reconnect(&request()).await;

        assert_eq!(second, ConnectOutcome::Completed);
        assert_eq!(first.await.unwrap(), ConnectOutcome::Closed(CloseReason::Superseded));
        assert!(first_body.is_closed());
        assert_eq!(client.request_count(), 2);
        assert_eq!(recorder.closes(), 2);
        assert_eq!(recorder.errors(), 0);
    }
}
