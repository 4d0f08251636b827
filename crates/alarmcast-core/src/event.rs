//! Alarm lifecycle events.
//!
//! Events borrow the alarm from the producer: delivery happens in-line with
//! the ingress call, so nothing needs to outlive it.

use crate::alarm::{Alarm, AlarmId};

/// One incremental change to an alarm.
#[derive(Debug, Clone, Copy)]
pub enum AlarmEvent<'a> {
    Created(&'a Alarm),
    /// Reduced by a new occurrence of the same problem.
    Updated(&'a Alarm),
    Acknowledged(&'a Alarm),
    Unacknowledged(&'a Alarm),
    SeverityChanged(&'a Alarm),
    StickyMemoUpdated(&'a Alarm),
    StickyMemoDeleted(&'a Alarm),
    ReductionKeyMemoUpdated(&'a Alarm),
    ReductionKeyMemoDeleted(&'a Alarm),
    /// The record may already be gone, so only its keys are carried.
    Deleted {
        id: AlarmId,
        reduction_key: &'a str,
    },
}

impl<'a> AlarmEvent<'a> {
    /// Build a delete event from an alarm, capturing its keys now.
    #[must_use]
    pub fn deleted(alarm: &'a Alarm) -> Self {
        Self::Deleted {
            id: alarm.id,
            reduction_key: &alarm.reduction_key,
        }
    }

    /// Stable label for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Acknowledged(_) => "acknowledged",
            Self::Unacknowledged(_) => "unacknowledged",
            Self::SeverityChanged(_) => "severity_changed",
            Self::StickyMemoUpdated(_) => "sticky_memo_updated",
            Self::StickyMemoDeleted(_) => "sticky_memo_deleted",
            Self::ReductionKeyMemoUpdated(_) => "reduction_key_memo_updated",
            Self::ReductionKeyMemoDeleted(_) => "reduction_key_memo_deleted",
            Self::Deleted { .. } => "deleted",
        }
    }

    /// The carried alarm, or `None` for deletes.
    #[must_use]
    pub fn alarm(&self) -> Option<&'a Alarm> {
        match *self {
            Self::Created(a)
            | Self::Updated(a)
            | Self::Acknowledged(a)
            | Self::Unacknowledged(a)
            | Self::SeverityChanged(a)
            | Self::StickyMemoUpdated(a)
            | Self::StickyMemoDeleted(a)
            | Self::ReductionKeyMemoUpdated(a)
            | Self::ReductionKeyMemoDeleted(a) => Some(a),
            Self::Deleted { .. } => None,
        }
    }

    /// Identity of the affected alarm.
    #[must_use]
    pub fn alarm_id(&self) -> AlarmId {
        self.keys().0
    }

    /// Reduction key of the affected alarm.
    #[must_use]
    pub fn reduction_key(&self) -> &'a str {
        self.keys().1
    }

    fn keys(&self) -> (AlarmId, &'a str) {
        match *self {
            Self::Deleted { id, reduction_key } => (id, reduction_key),
            Self::Created(a)
            | Self::Updated(a)
            | Self::Acknowledged(a)
            | Self::Unacknowledged(a)
            | Self::SeverityChanged(a)
            | Self::StickyMemoUpdated(a)
            | Self::StickyMemoDeleted(a)
            | Self::ReductionKeyMemoUpdated(a)
            | Self::ReductionKeyMemoDeleted(a) => (a.id, a.reduction_key.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Severity;

    #[test]
    fn test_deleted_captures_keys() {
        let alarm = Alarm::new(42, "uei/foo", "uei/foo:42", Severity::Minor);
        let event = AlarmEvent::deleted(&alarm);

        assert_eq!(event.kind(), "deleted");
        assert!(event.alarm().is_none());
        assert_eq!(event.alarm_id(), AlarmId(42));
        assert_eq!(event.reduction_key(), "uei/foo:42");
    }

    #[test]
    fn test_content_event_accessors() {
        let alarm = Alarm::new(3, "uei/bar", "uei/bar:3", Severity::Warning);
        let event = AlarmEvent::SeverityChanged(&alarm);

        assert_eq!(event.kind(), "severity_changed");
        assert_eq!(event.alarm(), Some(&alarm));
        assert_eq!(event.alarm_id(), AlarmId(3));
        assert_eq!(event.reduction_key(), "uei/bar:3");
    }
}
