//! Alarm listener capability.
//!
//! Listeners are registered as `Arc<dyn AlarmListener>` and compared by
//! pointer identity, so two listeners with identical state are still distinct
//! subscribers.

use crate::alarm::{Alarm, AlarmId};
use crate::error::ListenerResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace};

/// A subscriber to alarm lifecycle notifications.
///
/// Operations are invoked in-line by the hub. A returned error or a panic is
/// logged and isolated to this listener; the hub never retries and never
/// unregisters a failing listener. Notifications may reference alarms that
/// have since disappeared from the source, which listeners must tolerate.
#[async_trait]
pub trait AlarmListener: Send + Sync {
    /// Name used when logging failures.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Receive the full set of current alarms.
    async fn on_snapshot(&self, alarms: &[Alarm]) -> ListenerResult;

    /// Receive a new or updated alarm.
    async fn on_upsert(&self, alarm: &Alarm) -> ListenerResult;

    /// Receive a deletion.
    async fn on_delete(&self, id: AlarmId, reduction_key: &str) -> ListenerResult;
}

/// Check whether two handles refer to the same listener.
///
/// Only the data pointers are compared; vtable pointers for the same type may
/// differ between codegen units.
#[must_use]
pub fn same_listener(a: &Arc<dyn AlarmListener>, b: &Arc<dyn AlarmListener>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

/// A listener that writes every notification to the tracing log.
#[derive(Debug, Clone)]
pub struct TracingListener {
    name: String,
}

impl TracingListener {
    /// Create a new tracing listener.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TracingListener {
    fn default() -> Self {
        Self::new("tracing")
    }
}

#[async_trait]
impl AlarmListener for TracingListener {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_snapshot(&self, alarms: &[Alarm]) -> ListenerResult {
        debug!(listener = %self.name, alarms = alarms.len(), "Alarm snapshot");
        for alarm in alarms {
            trace!(
                listener = %self.name,
                id = %alarm.id,
                reduction_key = %alarm.reduction_key,
                severity = %alarm.severity,
                "Snapshot entry"
            );
        }
        Ok(())
    }

    async fn on_upsert(&self, alarm: &Alarm) -> ListenerResult {
        debug!(
            listener = %self.name,
            id = %alarm.id,
            reduction_key = %alarm.reduction_key,
            severity = %alarm.severity,
            acknowledged = alarm.is_acknowledged(),
            counter = alarm.counter,
            "Alarm upserted"
        );
        Ok(())
    }

    async fn on_delete(&self, id: AlarmId, reduction_key: &str) -> ListenerResult {
        debug!(listener = %self.name, id = %id, reduction_key = %reduction_key, "Alarm deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Severity;

    #[test]
    fn test_same_listener_identity() {
        let a: Arc<dyn AlarmListener> = Arc::new(TracingListener::new("a"));
        let a2 = Arc::clone(&a);
        let b: Arc<dyn AlarmListener> = Arc::new(TracingListener::new("a"));

        assert!(same_listener(&a, &a2));
        assert!(!same_listener(&a, &b));
    }

    #[test]
    fn test_listener_name() {
        let listener = TracingListener::new("audit");
        assert_eq!(AlarmListener::name(&listener), "audit");
    }

    #[tokio::test]
    async fn test_tracing_listener_accepts_everything() {
        let listener = TracingListener::default();
        let alarm = Alarm::new(1, "uei/test", "uei/test:1", Severity::Normal);

        assert!(listener.on_snapshot(std::slice::from_ref(&alarm)).await.is_ok());
        assert!(listener.on_upsert(&alarm).await.is_ok());
        assert!(listener.on_delete(alarm.id, &alarm.reduction_key).await.is_ok());
    }
}
