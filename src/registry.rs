//! Registry of connection controllers keyed by flow id.
//!
//! A UI with several independent flows (chat, background tasks, a feed) keeps
//! one controller per flow here instead of in process-wide state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::controller::ConnectionController;
use crate::traits::HttpClient;
use crate::transport::ConnectionState;

pub struct ConnectionRegistry<C> {
    controllers: RwLock<HashMap<String, Arc<ConnectionController<C>>>>,
}

impl<C> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self {
            controllers: RwLock::new(HashMap::new()),
        }
    }
}

impl<C: HttpClient + 'static> ConnectionRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<ConnectionController<C>>>> {
        self.controllers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<ConnectionController<C>>>> {
        self.controllers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `controller` under `flow_id`. A controller already registered
    /// under that id is closed and returned.
    pub fn register(
        &self,
        flow_id: impl Into<String>,
        controller: Arc<ConnectionController<C>>,
    ) -> Option<Arc<ConnectionController<C>>> {
        let flow_id = flow_id.into();
        debug!("Registering connection for flow {}", flow_id);
        let previous = self.write().insert(flow_id, controller);
        if let Some(previous) = &previous {
            previous.close();
        }
        previous
    }

    /// Remove and close the controller for `flow_id`.
    pub fn unregister(&self, flow_id: &str) -> Option<Arc<ConnectionController<C>>> {
        let removed = self.write().remove(flow_id);
        if let Some(controller) = &removed {
            debug!("Unregistering connection for flow {}", flow_id);
            controller.close();
        }
        removed
    }

    pub fn get(&self, flow_id: &str) -> Option<Arc<ConnectionController<C>>> {
        self.read().get(flow_id).cloned()
    }

    /// Connection state of a flow. Unknown flows are CLOSED.
    pub fn state_of(&self, flow_id: &str) -> ConnectionState {
        self.get(flow_id)
            .map(|controller| controller.state())
            .unwrap_or_default()
    }

    pub fn is_streaming(&self, flow_id: &str) -> bool {
        self.state_of(flow_id).is_active()
    }

    /// Registered flow ids, sorted.
    pub fn flow_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Close every registered controller. They stay registered.
    pub fn close_all(&self) {
        let controllers: Vec<_> = self.read().values().cloned().collect();
        for controller in controllers {
            controller.close();
        }
    }
}
