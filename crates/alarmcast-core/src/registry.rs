//! Listener registry.
//!
//! A single fair reader-writer lock guards the listener list. Both delivery
//! paths hold the read side for the whole fan-out, so they can overlap with
//! each other. `add`/`remove` take the write side: they wait for in-flight
//! deliveries, and deliveries that start after a writer queued wait for it.
//! The lock is never acquired while already held.

use crate::listener::{same_listener, AlarmListener};
use crate::metrics;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::debug;

/// Shared handle to a registered listener.
pub type ListenerHandle = Arc<dyn AlarmListener>;

/// Ordered, identity-deduplicated set of listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<ListenerHandle>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    ///
    /// Returns `false` if the same listener is already registered.
    pub async fn add(&self, listener: ListenerHandle) -> bool {
        let mut listeners = self.listeners.write().await;
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            debug!(listener = %listener.name(), "Listener already registered");
            return false;
        }

        debug!(listener = %listener.name(), "Listener registered");
        listeners.push(listener);
        metrics::adjust_listeners(1);
        true
    }

    /// Unregister a listener.
    ///
    /// Returns `false` if the listener was not registered.
    pub async fn remove(&self, listener: &ListenerHandle) -> bool {
        let mut listeners = self.listeners.write().await;
        let Some(pos) = listeners.iter().position(|l| same_listener(l, listener)) else {
            return false;
        };

        listeners.remove(pos);
        debug!(listener = %listener.name(), "Listener unregistered");
        metrics::adjust_listeners(-1);
        true
    }

    /// Acquire the shared side for a fan-out.
    ///
    /// Hold the guard for as long as listeners are being invoked.
    pub async fn read(&self) -> RwLockReadGuard<'_, Vec<ListenerHandle>> {
        self.listeners.read().await
    }

    /// Number of registered listeners.
    pub async fn len(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Check whether no listener is registered.
    pub async fn is_empty(&self) -> bool {
        self.listeners.read().await.is_empty()
    }

    /// Copy of the current listeners, in registration order.
    pub async fn listeners(&self) -> Vec<ListenerHandle> {
        self.listeners.read().await.clone()
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        let remaining = self.listeners.get_mut().len();
        if remaining > 0 {
            metrics::adjust_listeners(-(remaining as isize));
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.listeners.try_read().map(|l| l.len()).ok();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &count)
            .finish()
    }
}
