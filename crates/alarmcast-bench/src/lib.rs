//! Shared fixtures for the alarmcast benchmarks.

use alarmcast_core::{Alarm, AlarmId, AlarmListener, ListenerResult, Severity};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// A listener that only counts what it receives.
#[derive(Debug, Default)]
pub struct CountingListener {
    received: AtomicU64,
}

impl CountingListener {
    /// Notifications received so far.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AlarmListener for CountingListener {
    async fn on_snapshot(&self, alarms: &[Alarm]) -> ListenerResult {
        self.received.fetch_add(alarms.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    async fn on_upsert(&self, _alarm: &Alarm) -> ListenerResult {
        self.received.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn on_delete(&self, _id: AlarmId, _reduction_key: &str) -> ListenerResult {
        self.received.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Build `n` distinct alarms.
#[must_use]
pub fn alarms(n: u32) -> Vec<Alarm> {
    (1..=n)
        .map(|i| {
            Alarm::new(
                i,
                "uei.opennms.org/nodes/nodeDown",
                format!("uei.opennms.org/nodes/nodeDown::{i}"),
                Severity::Major,
            )
        })
        .collect()
}
