//! Test doubles shared by the unit tests.

use crate::alarm::{Alarm, AlarmId};
use crate::error::{ListenerError, ListenerResult, SourceError};
use crate::listener::AlarmListener;
use crate::source::AlarmSource;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Snapshot(Vec<Alarm>),
    Upsert(Alarm),
    Delete(AlarmId, String),
}

/// Records every call, optionally sleeping inside each one.
pub struct RecordingListener {
    name: String,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingListener {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn snapshots(&self) -> Vec<Vec<Alarm>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Snapshot(alarms) => Some(alarms),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: Call) -> ListenerResult {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl AlarmListener for RecordingListener {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_snapshot(&self, alarms: &[Alarm]) -> ListenerResult {
        self.record(Call::Snapshot(alarms.to_vec())).await
    }

    async fn on_upsert(&self, alarm: &Alarm) -> ListenerResult {
        self.record(Call::Upsert(alarm.clone())).await
    }

    async fn on_delete(&self, id: AlarmId, reduction_key: &str) -> ListenerResult {
        self.record(Call::Delete(id, reduction_key.to_string())).await
    }
}

/// Fails every call.
pub struct FailingListener {
    name: String,
    calls: AtomicUsize,
}

impl FailingListener {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> ListenerResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ListenerError::Unavailable(format!("{} is down", self.name)))
    }
}

#[async_trait]
impl AlarmListener for FailingListener {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_snapshot(&self, _alarms: &[Alarm]) -> ListenerResult {
        self.fail()
    }

    async fn on_upsert(&self, _alarm: &Alarm) -> ListenerResult {
        self.fail()
    }

    async fn on_delete(&self, _id: AlarmId, _reduction_key: &str) -> ListenerResult {
        self.fail()
    }
}

/// Panics on every call.
pub struct PanickingListener;

#[async_trait]
impl AlarmListener for PanickingListener {
    async fn on_snapshot(&self, _alarms: &[Alarm]) -> ListenerResult {
        panic!("snapshot handler exploded")
    }

    async fn on_upsert(&self, _alarm: &Alarm) -> ListenerResult {
        panic!("upsert handler exploded")
    }

    async fn on_delete(&self, _id: AlarmId, _reduction_key: &str) -> ListenerResult {
        panic!("delete handler exploded")
    }
}

/// Counts scans and records when each one started.
pub struct CountingSource {
    alarms: Vec<Alarm>,
    calls: AtomicUsize,
    started: Mutex<Vec<Instant>>,
    failures: AtomicUsize,
    first_call_delay: Option<Duration>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl CountingSource {
    pub fn new(alarms: Vec<Alarm>) -> Self {
        Self {
            alarms,
            calls: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
            failures: AtomicUsize::new(0),
            first_call_delay: None,
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Fail the first `n` scans.
    pub fn failing_first(self, n: usize) -> Self {
        self.failures.store(n, Ordering::SeqCst);
        self
    }

    /// Make the first scan take `delay`.
    pub fn slow_first(mut self, delay: Duration) -> Self {
        self.first_call_delay = Some(delay);
        self
    }

    /// Make every scan take `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of scans that were running at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> Vec<Instant> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlarmSource for CountingSource {
    async fn read_all_alarms(&self) -> Result<Vec<Alarm>, SourceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.lock().unwrap().push(Instant::now());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if call == 0 {
            if let Some(delay) = self.first_call_delay {
                tokio::time::sleep(delay).await;
            }
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(SourceError::Unavailable("database connection refused".into()));
        }

        Ok(self.alarms.clone())
    }
}

/// Panics on every scan.
#[derive(Default)]
pub struct PanickingSource {
    calls: AtomicUsize,
}

impl PanickingSource {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlarmSource for PanickingSource {
    async fn read_all_alarms(&self) -> Result<Vec<Alarm>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("alarm table vanished")
    }
}
