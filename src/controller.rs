//! Connection controller.
//!
//! Wires a [`StreamTransport`] to the reducer and publishes every new
//! [`Store`] snapshot through a `watch` channel. This is the surface a UI
//! holds on to: connect/close, the connection state, the last error and the
//! store.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::models::StreamRequest;
use crate::sse::AgentEvent;
use crate::store::{batch_reduce, reduce, Store};
use crate::traits::HttpClient;
use crate::transport::{ConnectOutcome, ConnectionState, StreamTransport, TransportHandler};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the controller and its transport callbacks.
struct Shared {
    store_tx: watch::Sender<Arc<Store>>,
    last_error: Mutex<Option<TransportError>>,
}

impl Shared {
    fn publish(&self, update: impl FnOnce(&Store) -> Store) {
        self.store_tx.send_modify(|current| {
            *current = Arc::new(update(current));
        });
    }
}

impl TransportHandler for Shared {
    fn on_open(&self) {
        lock(&self.last_error).take();
    }

    fn on_event(&self, event: AgentEvent) -> ControlFlow<()> {
        if let AgentEvent::Unknown { event, .. } = &event {
            debug!("Ignoring unknown event type: {}", event);
            return ControlFlow::Continue(());
        }

        self.publish(|store| reduce(store, &event));

        if event.is_terminal() {
            info!(
                "Thread finished in conversation {}, closing stream",
                event.conversation_id().unwrap_or_default()
            );
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    fn on_error(&self, error: &TransportError) {
        *lock(&self.last_error) = Some(error.clone());
    }
}

/// Owns one transport and the store it feeds.
///
/// # Example
///
/// ```ignore
/// use agentstream::adapters::ReqwestHttpClient;
/// use agentstream::config::TransportConfig;
/// use agentstream::controller::ConnectionController;
///
/// let controller = ConnectionController::new(TransportConfig::from_env()?, ReqwestHttpClient::new());
/// let mut snapshots = controller.subscribe();
/// controller.connect(&controller.request("summarise my inbox")).await;
/// let store = controller.snapshot();
/// ```
pub struct ConnectionController<C> {
    transport: StreamTransport<C>,
    shared: Arc<Shared>,
}

impl<C: HttpClient + 'static> ConnectionController<C> {
    pub fn new(config: TransportConfig, client: C) -> Self {
        Self::with_store(config, client, Store::new())
    }

    /// Start from an existing store, e.g. one restored from history.
    pub fn with_store(config: TransportConfig, client: C, store: Store) -> Self {
        let (store_tx, _) = watch::channel(Arc::new(store));
        let shared = Arc::new(Shared {
            store_tx,
            last_error: Mutex::new(None),
        });
        let transport = StreamTransport::new(client, config, shared.clone());
        Self { transport, shared }
    }

    /// Build a request for `query` using the configured agent.
    pub fn request(&self, query: impl Into<String>) -> StreamRequest {
        StreamRequest::new(query, self.transport.config().agent_id.clone())
    }

    /// Open a stream and reduce its events until it ends.
    ///
    /// A no-op while another stream is CONNECTING or OPEN.
    pub async fn connect(&self, request: &StreamRequest) -> ConnectOutcome {
        self.transport.connect(request).await
    }

    /// Replace the active stream, if any, with a new one.
    pub async fn reconnect(&self, request: &StreamRequest) -> ConnectOutcome {
        self.transport.reconnect(request).await
    }

    pub fn close(&self) {
        self.transport.close();
    }

    pub fn state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// True while the transport is CONNECTING or OPEN.
    pub fn is_streaming(&self) -> bool {
        self.state().is_active()
    }

    /// The error that ended the most recent attempt. Cleared when a new
    /// stream opens.
    pub fn last_error(&self) -> Option<TransportError> {
        lock(&self.shared.last_error).clone()
    }

    /// The current store.
    pub fn snapshot(&self) -> Arc<Store> {
        self.shared.store_tx.borrow().clone()
    }

    /// Receive every new store snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Store>> {
        self.shared.store_tx.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.transport.subscribe_state()
    }

    /// Replay stored events for one conversation as a single update.
    pub fn load_history(&self, conversation_id: &str, events: &[AgentEvent], clear_history: bool) {
        info!(
            "Loading {} history events for conversation {}",
            events.len(),
            conversation_id
        );
        self.shared
            .publish(|store| batch_reduce(store, conversation_id, events, clear_history));
    }
}
