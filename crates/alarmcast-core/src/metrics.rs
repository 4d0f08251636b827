//! Hub instrumentation.
//!
//! Uses the `metrics` facade; nothing is recorded unless the host process
//! installs a recorder.

use metrics::{counter, gauge, histogram};

/// Metric names.
pub mod names {
    pub const EVENTS_TOTAL: &str = "alarmcast_events_total";
    pub const LISTENER_FAILURES_TOTAL: &str = "alarmcast_listener_failures_total";
    pub const LISTENERS_ACTIVE: &str = "alarmcast_listeners_active";
    pub const SNAPSHOT_TICKS_TOTAL: &str = "alarmcast_snapshot_ticks_total";
    pub const SNAPSHOT_ALARMS: &str = "alarmcast_snapshot_alarms";
    pub const DISPATCH_SECONDS: &str = "alarmcast_dispatch_seconds";
}

/// Describe all hub metrics to the installed recorder.
pub fn describe() {
    metrics::describe_counter!(
        names::EVENTS_TOTAL,
        "Total number of lifecycle events dispatched"
    );
    metrics::describe_counter!(
        names::LISTENER_FAILURES_TOTAL,
        "Total number of failed listener deliveries"
    );
    metrics::describe_gauge!(
        names::LISTENERS_ACTIVE,
        "Current number of listeners across all hubs in the process"
    );
    metrics::describe_counter!(
        names::SNAPSHOT_TICKS_TOTAL,
        "Total number of snapshot scheduler ticks"
    );
    metrics::describe_histogram!(
        names::SNAPSHOT_ALARMS,
        "Number of alarms in each delivered snapshot"
    );
    metrics::describe_histogram!(
        names::DISPATCH_SECONDS,
        "Time spent fanning out a single delivery in seconds"
    );
}

/// Record a dispatched lifecycle event.
pub fn record_event(kind: &'static str) {
    counter!(names::EVENTS_TOTAL, "kind" => kind).increment(1);
}

/// Record a failed listener delivery.
pub fn record_listener_failure(path: &'static str) {
    counter!(names::LISTENER_FAILURES_TOTAL, "path" => path).increment(1);
}

/// Adjust the listener gauge by a registry's change in size.
///
/// The gauge is shared by every hub in the process, so registries only ever
/// apply deltas to it.
pub fn adjust_listeners(delta: isize) {
    let gauge = gauge!(names::LISTENERS_ACTIVE);
    if delta >= 0 {
        gauge.increment(delta as f64);
    } else {
        gauge.decrement(delta.unsigned_abs() as f64);
    }
}

/// Record a scheduler tick outcome.
pub fn record_tick(outcome: &'static str) {
    counter!(names::SNAPSHOT_TICKS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a delivered snapshot size.
pub fn record_snapshot_size(alarms: usize) {
    histogram!(names::SNAPSHOT_ALARMS).record(alarms as f64);
}

/// Record fan-out latency.
pub fn record_dispatch_latency(path: &'static str, seconds: f64) {
    histogram!(names::DISPATCH_SECONDS, "path" => path).record(seconds);
}
