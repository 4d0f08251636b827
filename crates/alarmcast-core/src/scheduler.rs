//! Periodic snapshot reconciliation.
//!
//! The scheduler runs as one task. The first tick fires immediately and later
//! ticks are due at `previous_due + interval`: a tick that overruns is
//! followed at once by the next one, and ticks never overlap.

use crate::dispatcher::{panic_message, Delivery, DispatchReport, EventDispatcher};
use crate::error::SourceError;
use crate::metrics;
use crate::registry::ListenerRegistry;
use crate::source::AlarmSource;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

/// Default interval between snapshots.
pub const DEFAULT_SNAPSHOT_INTERVAL: Duration = Duration::from_secs(5);

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No listeners; the source was not read.
    Skipped,
    /// A snapshot was fanned out.
    Delivered {
        alarms: usize,
        report: DispatchReport,
    },
    /// The source read failed or panicked; nothing was delivered.
    Failed(String),
}

impl TickOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Delivered { .. } => "delivered",
            Self::Failed(_) => "failed",
        }
    }
}

/// Pulls full scans from the alarm source and pushes them to listeners.
pub struct SnapshotScheduler {
    registry: Arc<ListenerRegistry>,
    dispatcher: EventDispatcher,
    source: Arc<dyn AlarmSource>,
    interval: Duration,
}

impl SnapshotScheduler {
    /// Create a scheduler.
    #[must_use]
    pub fn new(
        registry: Arc<ListenerRegistry>,
        source: Arc<dyn AlarmSource>,
        interval: Duration,
    ) -> Self {
        Self {
            dispatcher: EventDispatcher::new(Arc::clone(&registry)),
            registry,
            source,
            interval,
        }
    }

    /// Interval between ticks.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one reconciliation pass.
    ///
    /// Never fails: source errors and panics are logged and reported as
    /// [`TickOutcome::Failed`].
    pub async fn tick(&self) -> TickOutcome {
        let outcome = match AssertUnwindSafe(self.snapshot()).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(error = %e, "Error while performing snapshot update.");
                TickOutcome::Failed(e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, "Snapshot update panicked.");
                TickOutcome::Failed(format!("panicked: {message}"))
            }
        };
        metrics::record_tick(outcome.label());
        outcome
    }

    async fn snapshot(&self) -> Result<TickOutcome, SourceError> {
        if self.registry.is_empty().await {
            trace!("No listeners registered, skipping snapshot");
            return Ok(TickOutcome::Skipped);
        }

        let alarms = self.source.read_all_alarms().await?;
        metrics::record_snapshot_size(alarms.len());

        let report = self
            .dispatcher
            .deliver(Delivery::Snapshot(&alarms), "snapshot")
            .await;
        debug!(
            alarms = alarms.len(),
            listeners = report.attempted,
            failed = report.failed,
            "Delivered alarm snapshot"
        );

        Ok(TickOutcome::Delivered {
            alarms: alarms.len(),
            report,
        })
    }

    /// Tick at a fixed rate until `shutdown` is cancelled.
    ///
    /// Cancellation is observed between ticks; a tick in progress completes.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        info!(interval_ms = self.interval.as_millis() as u64, "Snapshot scheduler started");

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        info!("Snapshot scheduler stopped");
    }
}

impl std::fmt::Debug for SnapshotScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotScheduler")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
