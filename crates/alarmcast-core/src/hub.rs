//! The alarm hub: subscription API, producer ingress and scheduler lifecycle.
//!
//! Ingress calls deliver in-line on the caller's task; there is no queue. A
//! slow listener therefore adds latency to the producer, and delays pending
//! `subscribe`/`unsubscribe` calls, but never blocks a concurrent dispatch.

use crate::alarm::Alarm;
use crate::dispatcher::{DispatchReport, EventDispatcher};
use crate::error::HubError;
use crate::event::AlarmEvent;
use crate::registry::{ListenerHandle, ListenerRegistry};
use crate::scheduler::{SnapshotScheduler, TickOutcome, DEFAULT_SNAPSHOT_INTERVAL};
use crate::source::AlarmSource;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Hub configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Interval between snapshot reconciliations.
    pub snapshot_interval: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
        }
    }
}

impl HubConfig {
    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot interval is zero.
    pub fn validate(&self) -> Result<(), HubError> {
        if self.snapshot_interval.is_zero() {
            return Err(HubError::InvalidConfig("snapshot interval must be non-zero"));
        }
        Ok(())
    }
}

/// A running scheduler loop.
struct SchedulerTask {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Scheduler lifecycle state.
///
/// `exited` is cancelled once the most recently spawned loop has returned,
/// including a loop that `stop` has already taken out of `task`.
#[derive(Default)]
struct Lifecycle {
    task: Option<SchedulerTask>,
    exited: Option<CancellationToken>,
}

/// Distributes alarm lifecycle events and periodic snapshots to listeners.
pub struct AlarmHub {
    registry: Arc<ListenerRegistry>,
    dispatcher: EventDispatcher,
    scheduler: Arc<SnapshotScheduler>,
    lifecycle: Mutex<Lifecycle>,
}

impl AlarmHub {
    /// Create a hub with the default configuration.
    #[must_use]
    pub fn new(source: Arc<dyn AlarmSource>) -> Self {
        Self::build(source, &HubConfig::default())
    }

    /// Create a hub with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(source: Arc<dyn AlarmSource>, config: HubConfig) -> Result<Self, HubError> {
        config.validate()?;
        info!("Creating alarm hub with config: {:?}", config);
        Ok(Self::build(source, &config))
    }

    fn build(source: Arc<dyn AlarmSource>, config: &HubConfig) -> Self {
        let registry = Arc::new(ListenerRegistry::new());
        let scheduler = Arc::new(SnapshotScheduler::new(
            Arc::clone(&registry),
            source,
            config.snapshot_interval,
        ));

        Self {
            dispatcher: EventDispatcher::new(Arc::clone(&registry)),
            registry,
            scheduler,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Register a listener. Returns `false` if it was already registered.
    ///
    /// Waits for in-flight deliveries to finish.
    pub async fn subscribe(&self, listener: ListenerHandle) -> bool {
        self.registry.add(listener).await
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    ///
    /// Once this returns, no delivery started afterwards reaches the listener.
    pub async fn unsubscribe(&self, listener: &ListenerHandle) -> bool {
        self.registry.remove(listener).await
    }

    /// Number of registered listeners.
    pub async fn listener_count(&self) -> usize {
        self.registry.len().await
    }

    /// Start the snapshot scheduler on the current tokio runtime.
    ///
    /// Calling `start` on a running hub does nothing; at most one scheduler
    /// loop exists per hub. If a concurrent [`stop`](Self::stop) is still
    /// waiting for the previous loop, the new loop begins ticking only after
    /// that loop has exited.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NoRuntime`] if called outside a tokio runtime.
    pub fn start(&self) -> Result<(), HubError> {
        let mut lifecycle = self.lifecycle();
        if lifecycle
            .task
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
        {
            debug!("Alarm hub already started");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| HubError::NoRuntime)?;
        let shutdown = CancellationToken::new();
        let exited = CancellationToken::new();
        let previous = lifecycle.exited.replace(exited.clone());

        let scheduler = Arc::clone(&self.scheduler);
        let token = shutdown.clone();
        let exit_guard = exited.drop_guard();
        let handle = runtime.spawn(async move {
            let _exit_guard = exit_guard;
            if let Some(previous) = previous {
                previous.cancelled().await;
            }
            scheduler.run(token).await;
        });

        lifecycle.task = Some(SchedulerTask { shutdown, handle });
        info!(
            interval_ms = self.scheduler.interval().as_millis() as u64,
            "Alarm hub started"
        );
        Ok(())
    }

    /// Stop the snapshot scheduler and wait for it to exit.
    ///
    /// A tick in progress runs to completion first. Listeners stay
    /// registered. Stopping a stopped hub does nothing.
    pub async fn stop(&self) {
        let task = self.lifecycle().task.take();
        let Some(SchedulerTask { shutdown, handle }) = task else {
            return;
        };

        shutdown.cancel();
        if let Err(e) = handle.await {
            warn!(error = %e, "Snapshot scheduler exited abnormally");
        }
        info!("Alarm hub stopped");
    }

    /// Check whether the scheduler loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lifecycle()
            .task
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Run one reconciliation pass now, independent of the schedule.
    pub async fn snapshot_now(&self) -> TickOutcome {
        self.scheduler.tick().await
    }

    /// Deliver a lifecycle event to all listeners.
    pub async fn publish(&self, event: &AlarmEvent<'_>) -> DispatchReport {
        self.dispatcher.dispatch(event).await
    }

    /// A new alarm was created.
    pub async fn alarm_created(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::Created(alarm)).await
    }

    /// An existing alarm was reduced by a new occurrence.
    pub async fn alarm_updated(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::Updated(alarm)).await
    }

    /// An alarm was acknowledged.
    pub async fn alarm_acknowledged(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::Acknowledged(alarm)).await
    }

    /// An alarm was unacknowledged.
    pub async fn alarm_unacknowledged(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::Unacknowledged(alarm)).await
    }

    /// An alarm's severity changed.
    pub async fn alarm_severity_changed(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::SeverityChanged(alarm)).await
    }

    /// An alarm's sticky memo was created or changed.
    pub async fn sticky_memo_updated(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::StickyMemoUpdated(alarm)).await
    }

    /// An alarm's sticky memo was removed.
    pub async fn sticky_memo_deleted(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::StickyMemoDeleted(alarm)).await
    }

    /// An alarm's reduction key memo was created or changed.
    pub async fn reduction_key_memo_updated(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::ReductionKeyMemoUpdated(alarm)).await
    }

    /// An alarm's reduction key memo was removed.
    pub async fn reduction_key_memo_deleted(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::ReductionKeyMemoDeleted(alarm)).await
    }

    /// An alarm was deleted. Only its id and reduction key are forwarded.
    pub async fn alarm_deleted(&self, alarm: &Alarm) -> DispatchReport {
        self.publish(&AlarmEvent::deleted(alarm)).await
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AlarmHub {
    fn drop(&mut self) {
        if let Some(task) = self.lifecycle().task.take() {
            task.shutdown.cancel();
        }
    }
}

impl std::fmt::Debug for AlarmHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmHub")
            .field("registry", &self.registry)
            .field("scheduler", &self.scheduler)
            .field("running", &self.is_running())
            .finish()
    }
}
