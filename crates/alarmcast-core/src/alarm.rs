//! Alarm records forwarded by the hub.
//!
//! The hub treats an [`Alarm`] as an opaque payload: it is handed to listeners
//! exactly as the producer supplied it. The mutation helpers here exist for
//! producers and alarm sources, never for the hub itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Numeric alarm identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlarmId(pub u32);

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AlarmId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Alarm severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Indeterminate,
    Cleared,
    Normal,
    Warning,
    Minor,
    Major,
    Critical,
}

impl Severity {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Indeterminate => "indeterminate",
            Self::Cleared => "cleared",
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A memo attached to an alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    /// Memo text.
    pub body: String,
    /// Who wrote it.
    pub author: String,
    /// Last update, in milliseconds since the epoch.
    pub updated_at: u64,
}

impl Memo {
    /// Create a memo stamped with the current time.
    #[must_use]
    pub fn new(body: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            author: author.into(),
            updated_at: now_millis(),
        }
    }
}

/// An alarm record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// Numeric identity.
    pub id: AlarmId,
    /// Stable correlation key, independent of `id`.
    pub reduction_key: String,
    /// Event UEI that raised the alarm.
    pub uei: String,
    /// Current severity.
    pub severity: Severity,
    /// Human readable description.
    pub description: Option<String>,
    /// Number of reduced occurrences.
    pub counter: u32,
    /// First occurrence, in milliseconds since the epoch.
    pub first_event_time: u64,
    /// Latest occurrence, in milliseconds since the epoch.
    pub last_event_time: u64,
    /// User that acknowledged the alarm.
    pub ack_user: Option<String>,
    /// Acknowledgement time, in milliseconds since the epoch.
    pub ack_time: Option<u64>,
    /// Memo attached to this alarm only.
    pub sticky_memo: Option<Memo>,
    /// Memo shared by every alarm with the same reduction key.
    pub reduction_key_memo: Option<Memo>,
}

impl Alarm {
    /// Create a new, unacknowledged alarm with a single occurrence.
    #[must_use]
    pub fn new(
        id: impl Into<AlarmId>,
        uei: impl Into<String>,
        reduction_key: impl Into<String>,
        severity: Severity,
    ) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            reduction_key: reduction_key.into(),
            uei: uei.into(),
            severity,
            description: None,
            counter: 1,
            first_event_time: now,
            last_event_time: now,
            ack_user: None,
            ack_time: None,
            sticky_memo: None,
            reduction_key_memo: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check whether the alarm is acknowledged.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.ack_user.is_some()
    }

    /// Record another occurrence of the same problem.
    pub fn reduce(&mut self) {
        self.counter = self.counter.saturating_add(1);
        self.last_event_time = now_millis();
    }

    /// Acknowledge the alarm.
    ///
    /// Returns the previous acknowledgement user and time.
    pub fn acknowledge(&mut self, user: impl Into<String>) -> (Option<String>, Option<u64>) {
        let previous = (self.ack_user.take(), self.ack_time.take());
        self.ack_user = Some(user.into());
        self.ack_time = Some(now_millis());
        previous
    }

    /// Remove the acknowledgement.
    ///
    /// Returns the previous acknowledgement user and time.
    pub fn unacknowledge(&mut self) -> (Option<String>, Option<u64>) {
        (self.ack_user.take(), self.ack_time.take())
    }

    /// Change the severity, returning the previous one.
    pub fn set_severity(&mut self, severity: Severity) -> Severity {
        std::mem::replace(&mut self.severity, severity)
    }

    /// Clear the alarm, returning the previous severity.
    pub fn clear(&mut self) -> Severity {
        self.set_severity(Severity::Cleared)
    }

    /// Replace the sticky memo, returning the previous one.
    pub fn set_sticky_memo(&mut self, memo: Memo) -> Option<Memo> {
        self.sticky_memo.replace(memo)
    }

    /// Remove the sticky memo.
    pub fn clear_sticky_memo(&mut self) -> Option<Memo> {
        self.sticky_memo.take()
    }

    /// Replace the reduction key memo, returning the previous one.
    pub fn set_reduction_key_memo(&mut self, memo: Memo) -> Option<Memo> {
        self.reduction_key_memo.replace(memo)
    }

    /// Remove the reduction key memo.
    pub fn clear_reduction_key_memo(&mut self) -> Option<Memo> {
        self.reduction_key_memo.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm() -> Alarm {
        Alarm::new(7, "uei.opennms.org/nodes/nodeDown", "uei/nodeDown:7", Severity::Major)
    }

    #[test]
    fn test_alarm_creation() {
        let alarm = alarm().with_description("node down");
        assert_eq!(alarm.id, AlarmId(7));
        assert_eq!(alarm.counter, 1);
        assert_eq!(alarm.first_event_time, alarm.last_event_time);
        assert!(!alarm.is_acknowledged());
        assert_eq!(alarm.description.as_deref(), Some("node down"));
    }

    #[test]
    fn test_acknowledge_unacknowledge() {
        let mut alarm = alarm();

        let (prev_user, prev_time) = alarm.acknowledge("admin");
        assert!(prev_user.is_none());
        assert!(prev_time.is_none());
        assert!(alarm.is_acknowledged());

        let (prev_user, prev_time) = alarm.acknowledge("operator");
        assert_eq!(prev_user.as_deref(), Some("admin"));
        assert!(prev_time.is_some());

        let (prev_user, _) = alarm.unacknowledge();
        assert_eq!(prev_user.as_deref(), Some("operator"));
        assert!(!alarm.is_acknowledged());
        assert!(alarm.ack_time.is_none());
    }

    #[test]
    fn test_severity_changes() {
        let mut alarm = alarm();
        assert_eq!(alarm.set_severity(Severity::Critical), Severity::Major);
        assert_eq!(alarm.clear(), Severity::Critical);
        assert_eq!(alarm.severity, Severity::Cleared);
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Cleared < Severity::Normal);
    }

    #[test]
    fn test_memos() {
        let mut alarm = alarm();
        assert!(alarm.set_sticky_memo(Memo::new("rebooting", "ops")).is_none());
        let previous = alarm.set_sticky_memo(Memo::new("rebooted", "ops"));
        assert_eq!(previous.map(|m| m.body), Some("rebooting".to_string()));
        assert!(alarm.clear_sticky_memo().is_some());
        assert!(alarm.sticky_memo.is_none());

        alarm.set_reduction_key_memo(Memo::new("known flapper", "noc"));
        assert_eq!(alarm.clear_reduction_key_memo().map(|m| m.author), Some("noc".into()));
    }

    #[test]
    fn test_reduce() {
        let mut alarm = alarm();
        alarm.reduce();
        alarm.reduce();
        assert_eq!(alarm.counter, 3);
        assert!(alarm.last_event_time >= alarm.first_event_time);
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let parsed: Severity = serde_json::from_str("\"minor\"").unwrap();
        assert_eq!(parsed, Severity::Minor);
    }
}
