//! Application configuration.

use std::path::{Path, PathBuf};

use divmm_feed::CandlesConfig;
use divmm_mm::MakerConfig;
use divmm_paper::PaperConfig;
use divmm_persistence::PersistenceConfig;
use divmm_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Candle replay and clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// JSON Lines candle file replayed into the feed.
    #[serde(default = "default_candles_path")]
    pub candles_path: PathBuf,

    /// Wall-clock delay between replayed candles (ms).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Candle duration (ms). A candle's close time is its open time plus
    /// this, and the engine clock runs on close times.
    #[serde(default = "default_candle_interval_ms")]
    pub candle_interval_ms: u64,

    /// Shut down once the replay has no candles left.
    #[serde(default = "default_true")]
    pub stop_when_exhausted: bool,
}

fn default_candles_path() -> PathBuf {
    PathBuf::from("data/candles/ETH-USDT_1m.jsonl")
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_candle_interval_ms() -> u64 {
    60_000
}

fn default_true() -> bool {
    true
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            candles_path: default_candles_path(),
            tick_interval_ms: default_tick_interval_ms(),
            candle_interval_ms: default_candle_interval_ms(),
            stop_when_exhausted: true,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Quoting parameters.
    #[serde(default)]
    pub maker: MakerConfig,

    /// Candle feed and indicator window.
    #[serde(default)]
    pub candles: CandlesConfig,

    /// Candle replay source.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Simulated exchange.
    #[serde(default)]
    pub paper: PaperConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Trade history files.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl AppConfig {
    /// Load configuration from file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        self.maker.validate()?;

        if self.candles.length == 0 {
            return Err(AppError::Config(
                "candles.length must be at least 1".to_string(),
            ));
        }
        if self.candles.max_records < 2 {
            return Err(AppError::Config(format!(
                "candles.max_records must be at least 2, got {}",
                self.candles.max_records
            )));
        }
        if self.feed.tick_interval_ms == 0 {
            return Err(AppError::Config(
                "feed.tick_interval_ms must be positive".to_string(),
            ));
        }
        if self.feed.candle_interval_ms == 0 {
            return Err(AppError::Config(
                "feed.candle_interval_ms must be positive".to_string(),
            ));
        }
        if self.persistence.enabled && self.persistence.max_buffer_size == 0 {
            return Err(AppError::Config(
                "persistence.max_buffer_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
