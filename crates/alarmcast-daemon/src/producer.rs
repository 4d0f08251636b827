//! Simulated alarm producer.
//!
//! Cycles a fixed pool of alarms through their lifecycle, writing each change
//! to the store first and then notifying the hub, the same order a real alarm
//! service follows.

use alarmcast_core::{Alarm, AlarmHub, AlarmId, MemoryAlarmSource, Memo, Severity};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const UEI: &str = "uei.opennms.org/generic/traps/SNMP_Link_Down";
const PRODUCER_USER: &str = "alarmcast";

/// Drives alarm mutations against a store and the hub.
pub struct Producer {
    hub: Arc<AlarmHub>,
    store: Arc<MemoryAlarmSource>,
    max_alarms: u32,
    step: u64,
}

impl Producer {
    /// Create a producer cycling through `max_alarms` alarms.
    #[must_use]
    pub fn new(hub: Arc<AlarmHub>, store: Arc<MemoryAlarmSource>, max_alarms: u32) -> Self {
        Self {
            hub,
            store,
            max_alarms: max_alarms.max(1),
            step: 0,
        }
    }

    /// Apply one mutation.
    pub async fn step(&mut self) {
        let id = AlarmId((self.step % u64::from(self.max_alarms)) as u32 + 1);
        let round = self.step / u64::from(self.max_alarms);
        self.step += 1;

        let Some(mut alarm) = self.store.get(id).await else {
            let alarm = Alarm::new(id, UEI, format!("{UEI}:{id}"), Severity::Warning)
                .with_description(format!("Link down on interface {id}"));
            self.store.upsert(alarm.clone()).await;
            self.hub.alarm_created(&alarm).await;
            return;
        };

        match round % 7 {
            0 | 1 => {
                alarm.reduce();
                self.store.upsert(alarm.clone()).await;
                self.hub.alarm_updated(&alarm).await;
            }
            2 => {
                alarm.set_severity(Severity::Major);
                self.store.upsert(alarm.clone()).await;
                self.hub.alarm_severity_changed(&alarm).await;
            }
            3 => {
                alarm.acknowledge(PRODUCER_USER);
                alarm.set_sticky_memo(Memo::new("Investigating link flap", PRODUCER_USER));
                self.store.upsert(alarm.clone()).await;
                self.hub.alarm_acknowledged(&alarm).await;
                self.hub.sticky_memo_updated(&alarm).await;
            }
            4 => {
                alarm.unacknowledge();
                alarm.clear_sticky_memo();
                self.store.upsert(alarm.clone()).await;
                self.hub.alarm_unacknowledged(&alarm).await;
                self.hub.sticky_memo_deleted(&alarm).await;
            }
            5 => {
                alarm.clear();
                alarm.set_reduction_key_memo(Memo::new("Known flapping uplink", PRODUCER_USER));
                self.store.upsert(alarm.clone()).await;
                self.hub.alarm_severity_changed(&alarm).await;
                self.hub.reduction_key_memo_updated(&alarm).await;
            }
            _ => {
                alarm.clear_reduction_key_memo();
                self.store.upsert(alarm.clone()).await;
                self.hub.reduction_key_memo_deleted(&alarm).await;
                self.store.remove(id).await;
                self.hub.alarm_deleted(&alarm).await;
            }
        }
        debug!(id = %id, round, "Producer step applied");
    }

    /// Apply mutations every `interval` until `shutdown` is cancelled.
    pub async fn run(mut self, interval: Duration, shutdown: CancellationToken) {
        info!(
            interval_ms = interval.as_millis() as u64,
            alarms = self.max_alarms,
            "Simulated producer started"
        );
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => self.step().await,
            }
        }

        info!("Simulated producer stopped");
    }
}
