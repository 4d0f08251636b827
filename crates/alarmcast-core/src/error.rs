//! Error types for the alarm hub.
//!
//! Listener and source errors are always absorbed by the hub: they are logged
//! and counted, never returned to the producer or the scheduler.

use thiserror::Error;

/// Errors raised by an [`AlarmListener`](crate::AlarmListener) operation.
#[derive(Debug, Clone, Error)]
pub enum ListenerError {
    /// The listener refused the notification.
    #[error("Listener rejected notification: {0}")]
    Rejected(String),

    /// The listener's downstream is unavailable.
    #[error("Listener unavailable: {0}")]
    Unavailable(String),

    /// The listener panicked while handling the notification.
    #[error("Listener panicked: {0}")]
    Panicked(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type returned by listener operations.
pub type ListenerResult = Result<(), ListenerError>;

/// Errors raised by an [`AlarmSource`](crate::AlarmSource) full scan.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The backing store could not be reached.
    #[error("Alarm source unavailable: {0}")]
    Unavailable(String),

    /// The transaction wrapping the scan failed.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// The scan itself failed.
    #[error("Query failed: {0}")]
    Query(String),
}

/// Hub configuration and lifecycle errors.
#[derive(Debug, Error)]
pub enum HubError {
    /// Invalid configuration value.
    #[error("Invalid hub configuration: {0}")]
    InvalidConfig(&'static str),

    /// `start` was called outside of a tokio runtime.
    #[error("No tokio runtime available to run the snapshot scheduler")]
    NoRuntime,
}
