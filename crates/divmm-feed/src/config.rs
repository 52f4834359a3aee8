//! Candle feed configuration.

use serde::{Deserialize, Serialize};

/// Candle feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandlesConfig {
    /// Exchange the candles come from (display only).
    #[serde(default = "default_connector")]
    pub connector: String,

    /// Candle interval label, e.g. "1m".
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Indicator window for both RSI and NATR.
    #[serde(default = "default_length")]
    pub length: usize,

    /// Maximum candles retained in the buffer.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for CandlesConfig {
    fn default() -> Self {
        Self {
            connector: default_connector(),
            interval: default_interval(),
            length: default_length(),
            max_records: default_max_records(),
        }
    }
}

fn default_connector() -> String {
    "binance".to_string()
}
fn default_interval() -> String {
    "1m".to_string()
}
fn default_length() -> usize {
    30
}
fn default_max_records() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CandlesConfig::default();
        assert_eq!(config.connector, "binance");
        assert_eq!(config.interval, "1m");
        assert_eq!(config.length, 30);
        assert_eq!(config.max_records, 1000);
    }

    #[test]
    fn test_partial_toml() {
        let config: CandlesConfig = toml::from_str("length = 14").unwrap();
        assert_eq!(config.length, 14);
        assert_eq!(config.max_records, 1000);
    }
}
