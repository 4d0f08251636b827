//! # alarmcast
//!
//! Runs an alarm hub against an in-memory alarm store, with a logging
//! listener and a simulated producer.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default settings
//! alarmcast
//!
//! # Run with environment overrides
//! ALARMCAST_SNAPSHOT_INTERVAL_MS=1000 RUST_LOG=alarmcast=trace alarmcast
//! ```

mod config;
mod metrics;
mod producer;

use alarmcast_core::{AlarmHub, MemoryAlarmSource, TracingListener};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alarmcast=debug,alarmcast_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::load()?;
    tracing::info!("Starting alarmcast with config: {:?}", config);

    if config.metrics.enabled {
        if let Err(e) = metrics::start_metrics_server(config.metrics.port) {
            tracing::error!("Failed to start metrics server: {:#}", e);
        }
    }

    let store = Arc::new(MemoryAlarmSource::new());
    let hub = Arc::new(
        AlarmHub::with_config(store.clone(), config.hub_config())
            .context("Invalid hub configuration")?,
    );
    hub.subscribe(Arc::new(TracingListener::new("log"))).await;
    hub.start().context("Failed to start alarm hub")?;

    let shutdown = CancellationToken::new();
    let producer = config.producer.enabled.then(|| {
        let producer =
            producer::Producer::new(Arc::clone(&hub), store, config.producer.max_alarms);
        let interval = Duration::from_millis(config.producer.event_interval_ms.max(1));
        tokio::spawn(producer.run(interval, shutdown.clone()))
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested");

    shutdown.cancel();
    if let Some(producer) = producer {
        if let Err(e) = producer.await {
            tracing::warn!("Producer task failed: {}", e);
        }
    }
    hub.stop().await;

    Ok(())
}
