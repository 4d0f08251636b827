//! Alarm source capability and an in-memory implementation.

use crate::alarm::{Alarm, AlarmId};
use crate::error::SourceError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Authoritative full-scan read of current alarms.
///
/// Implementations wrap the scan in whatever transactional scope their store
/// provides; the hub adds no isolation of its own and never retries.
#[async_trait]
pub trait AlarmSource: Send + Sync {
    /// Read every current alarm in one consistent scan.
    async fn read_all_alarms(&self) -> Result<Vec<Alarm>, SourceError>;
}

/// An alarm store held in memory.
///
/// Scans are taken under a read lock, so a snapshot never observes a
/// half-applied write.
#[derive(Debug, Default)]
pub struct MemoryAlarmSource {
    alarms: RwLock<BTreeMap<AlarmId, Alarm>>,
}

impl MemoryAlarmSource {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with alarms.
    #[must_use]
    pub fn with_alarms(alarms: impl IntoIterator<Item = Alarm>) -> Self {
        Self {
            alarms: RwLock::new(alarms.into_iter().map(|a| (a.id, a)).collect()),
        }
    }

    /// Insert or replace an alarm, returning the previous version.
    pub async fn upsert(&self, alarm: Alarm) -> Option<Alarm> {
        self.alarms.write().await.insert(alarm.id, alarm)
    }

    /// Remove an alarm.
    pub async fn remove(&self, id: AlarmId) -> Option<Alarm> {
        self.alarms.write().await.remove(&id)
    }

    /// Get a copy of an alarm.
    pub async fn get(&self, id: AlarmId) -> Option<Alarm> {
        self.alarms.read().await.get(&id).cloned()
    }

    /// Number of stored alarms.
    pub async fn len(&self) -> usize {
        self.alarms.read().await.len()
    }

    /// Check whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.alarms.read().await.is_empty()
    }
}

#[async_trait]
impl AlarmSource for MemoryAlarmSource {
    async fn read_all_alarms(&self) -> Result<Vec<Alarm>, SourceError> {
        Ok(self.alarms.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Severity;

    #[tokio::test]
    async fn test_memory_source_crud() {
        let source = MemoryAlarmSource::new();
        assert!(source.is_empty().await);

        let alarm = Alarm::new(1, "uei/a", "uei/a:1", Severity::Minor);
        assert!(source.upsert(alarm.clone()).await.is_none());
        assert_eq!(source.get(AlarmId(1)).await, Some(alarm.clone()));

        let mut updated = alarm.clone();
        updated.set_severity(Severity::Critical);
        assert_eq!(source.upsert(updated).await, Some(alarm));
        assert_eq!(source.len().await, 1);

        assert!(source.remove(AlarmId(1)).await.is_some());
        assert!(source.remove(AlarmId(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_memory_source_scan() {
        let source = MemoryAlarmSource::with_alarms(
            (1..=3).map(|i| Alarm::new(i, "uei/a", format!("uei/a:{i}"), Severity::Warning)),
        );

        let alarms = source.read_all_alarms().await.unwrap();
        assert_eq!(alarms.len(), 3);
        assert_eq!(alarms[0].id, AlarmId(1));
    }
}
