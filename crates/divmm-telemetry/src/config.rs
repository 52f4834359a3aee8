//! Telemetry configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Where to write the Prometheus text snapshot on shutdown.
    /// `None` disables the snapshot.
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,

    /// Log the status report every N ticks (0 = only on shutdown).
    #[serde(default = "default_status_every_ticks")]
    pub status_every_ticks: u64,
}

fn default_status_every_ticks() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TelemetryConfig = toml::from_str("").unwrap();
        assert!(config.metrics_path.is_none());
        assert_eq!(config.status_every_ticks, 30);
    }
}
