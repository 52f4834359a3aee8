//! Persistence configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Write trade history files.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory for `trades_{date}.jsonl` files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Records buffered before an automatic flush.
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_output_dir(),
            max_buffer_size: default_max_buffer_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/trades")
}

fn default_max_buffer_size() -> usize {
    16
}
