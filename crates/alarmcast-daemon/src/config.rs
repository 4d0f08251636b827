//! Daemon configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (ALARMCAST_*)
//! - TOML configuration file

use alarmcast_core::HubConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Hub settings.
    #[serde(default)]
    pub hub: HubSection,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Simulated alarm producer.
    #[serde(default)]
    pub producer: ProducerConfig,
}

/// Hub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSection {
    /// Snapshot interval in milliseconds.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable the Prometheus exporter.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Exporter port.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Simulated producer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Run the simulated producer.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delay between simulated alarm mutations in milliseconds.
    #[serde(default = "default_event_interval")]
    pub event_interval_ms: u64,

    /// Number of distinct alarms the producer cycles through.
    #[serde(default = "default_max_alarms")]
    pub max_alarms: u32,
}

// Default value functions
fn default_snapshot_interval() -> u64 {
    std::env::var("ALARMCAST_SNAPSHOT_INTERVAL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5_000)
}

fn default_true() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    std::env::var("ALARMCAST_METRICS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(9090)
}

fn default_event_interval() -> u64 {
    1_000
}

fn default_max_alarms() -> u32 {
    16
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: default_snapshot_interval(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
        }
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            event_interval_ms: default_event_interval(),
            max_alarms: default_max_alarms(),
        }
    }
}

impl Config {
    /// Load configuration from file or defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_paths = [
            "alarmcast.toml",
            "/etc/alarmcast/alarmcast.toml",
            "~/.config/alarmcast/alarmcast.toml",
        ];

        for path in &config_paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::from_file(expanded.as_ref());
            }
        }

        // Fall back to defaults with environment overrides
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Hub configuration derived from the `[hub]` section.
    #[must_use]
    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            snapshot_interval: Duration::from_millis(self.hub.snapshot_interval_ms),
        }
    }
}
