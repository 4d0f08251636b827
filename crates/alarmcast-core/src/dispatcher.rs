//! Fan-out of notifications to registered listeners.
//!
//! Every delivery (incremental event or snapshot) goes through
//! [`EventDispatcher::deliver`]: it holds the registry's read side for the
//! whole walk, calls each listener in registration order and isolates errors
//! and panics per listener.

use crate::alarm::{Alarm, AlarmId};
use crate::error::{ListenerError, ListenerResult};
use crate::event::AlarmEvent;
use crate::listener::AlarmListener;
use crate::metrics;
use crate::registry::ListenerRegistry;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, trace};

/// A single notification as seen by listeners.
#[derive(Debug, Clone, Copy)]
pub enum Delivery<'a> {
    /// Full baseline refresh.
    Snapshot(&'a [Alarm]),
    /// New or updated alarm.
    Upsert(&'a Alarm),
    /// Deleted alarm keys.
    Delete { id: AlarmId, reduction_key: &'a str },
}

impl<'a> Delivery<'a> {
    /// Map a lifecycle event onto the listener operation it triggers.
    #[must_use]
    pub fn from_event(event: &AlarmEvent<'a>) -> Self {
        match event.alarm() {
            Some(alarm) => Self::Upsert(alarm),
            None => Self::Delete {
                id: event.alarm_id(),
                reduction_key: event.reduction_key(),
            },
        }
    }

    /// Delivery path label for logs and metrics.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Upsert(_) => "upsert",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Outcome of one fan-out. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners invoked.
    pub attempted: usize,
    /// Listeners that returned an error or panicked.
    pub failed: usize,
}

impl DispatchReport {
    /// Listeners that accepted the notification.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.attempted - self.failed
    }
}

/// Delivers notifications to every registered listener.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    registry: Arc<ListenerRegistry>,
}

impl EventDispatcher {
    /// Create a dispatcher over a registry.
    #[must_use]
    pub fn new(registry: Arc<ListenerRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver a lifecycle event to all listeners.
    ///
    /// Never fails: listener errors are logged and counted in the report.
    pub async fn dispatch(&self, event: &AlarmEvent<'_>) -> DispatchReport {
        metrics::record_event(event.kind());
        trace!(event = event.kind(), id = %event.alarm_id(), "Dispatching alarm event");
        self.deliver(Delivery::from_event(event), event.kind()).await
    }

    /// Deliver a notification to all listeners under the shared lock.
    ///
    /// `cause` names what triggered the delivery and is only used for logging.
    pub async fn deliver(&self, delivery: Delivery<'_>, cause: &'static str) -> DispatchReport {
        let started = Instant::now();
        let listeners = self.registry.read().await;
        let mut report = DispatchReport::default();

        for listener in listeners.iter() {
            report.attempted += 1;
            if let Err(e) = invoke(listener.as_ref(), delivery).await {
                report.failed += 1;
                metrics::record_listener_failure(delivery.path());
                error!(
                    listener = %listener.name(),
                    event = cause,
                    error = %e,
                    "Error occurred while invoking listener. Skipping."
                );
            }
        }
        drop(listeners);

        metrics::record_dispatch_latency(delivery.path(), started.elapsed().as_secs_f64());
        report
    }
}

/// Call the listener operation for a delivery, converting panics into errors.
async fn invoke(listener: &dyn AlarmListener, delivery: Delivery<'_>) -> ListenerResult {
    let call = async move {
        match delivery {
            Delivery::Snapshot(alarms) => listener.on_snapshot(alarms).await,
            Delivery::Upsert(alarm) => listener.on_upsert(alarm).await,
            Delivery::Delete { id, reduction_key } => listener.on_delete(id, reduction_key).await,
        }
    };

    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(ListenerError::Panicked(panic_message(payload.as_ref()))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
