//! # alarmcast-core
//!
//! In-process distribution of alarm lifecycle events.
//!
//! Subscribers are kept in sync by two delivery paths sharing one listener
//! registry:
//!
//! - **Incremental** - the producer calls the hub's ingress API after every
//!   alarm mutation and the change is fanned out in-line
//! - **Snapshot** - a fixed-rate scheduler periodically reads every alarm from
//!   the [`AlarmSource`] and pushes the full set, healing lost events and late
//!   subscribers
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  ingress  ┌──────────┐     ┌────────────┐     ┌───────────┐
//! │ Producer │──────────▶│ AlarmHub │────▶│ Dispatcher │────▶│ Listeners │
//! └──────────┘           └──────────┘     └────────────┘     └───────────┘
//!                              │                ▲
//!                              ▼                │ snapshot
//!                        ┌───────────┐          │
//!                        │ Scheduler │──────────┘
//!                        └───────────┘
//!                              │ full scan
//!                              ▼
//!                        ┌─────────────┐
//!                        │ AlarmSource │
//!                        └─────────────┘
//! ```

pub mod alarm;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod hub;
pub mod listener;
pub mod metrics;
pub mod registry;
pub mod scheduler;
pub mod source;

#[cfg(test)]
mod test_support;

pub use alarm::{Alarm, AlarmId, Memo, Severity};
pub use dispatcher::{Delivery, DispatchReport, EventDispatcher};
pub use error::{HubError, ListenerError, ListenerResult, SourceError};
pub use event::AlarmEvent;
pub use hub::{AlarmHub, HubConfig};
pub use listener::{AlarmListener, TracingListener};
pub use registry::{ListenerHandle, ListenerRegistry};
pub use scheduler::{SnapshotScheduler, TickOutcome, DEFAULT_SNAPSHOT_INTERVAL};
pub use source::{AlarmSource, MemoryAlarmSource};
