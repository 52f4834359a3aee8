//! JSON Lines candle replay for paper trading.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use divmm_core::Candle;
use tracing::{info, warn};

use crate::error::FeedResult;
use crate::parser::parse_candle_line;

/// Pre-loaded candle sequence, consumed one candle at a time.
#[derive(Debug, Default)]
pub struct CandleReplay {
    pending: VecDeque<Candle>,
    skipped: usize,
}

impl CandleReplay {
    /// Load every parseable line from `path`.
    ///
    /// Blank lines and `#` comments are ignored; malformed lines are logged
    /// and skipped.
    pub fn from_path(path: impl AsRef<Path>) -> FeedResult<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut replay = Self::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match parse_candle_line(trimmed) {
                Ok(candle) => replay.pending.push_back(candle),
                Err(e) => {
                    warn!(line = idx + 1, error = %e, "Skipping malformed candle line");
                    replay.skipped += 1;
                }
            }
        }

        info!(
            path = %path.display(),
            candles = replay.pending.len(),
            skipped = replay.skipped,
            "Candle replay loaded"
        );
        Ok(replay)
    }

    pub fn from_candles(candles: impl IntoIterator<Item = Candle>) -> Self {
        Self {
            pending: candles.into_iter().collect(),
            skipped: 0,
        }
    }

    /// Next candle, `None` when exhausted.
    pub fn next_candle(&mut self) -> Option<Candle> {
        self.pending.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    /// Lines rejected while loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_skips_comments_and_bad_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# ETH-USDT 1m").unwrap();
        writeln!(file, r#"[1,"10","11","9","10","1"]"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, r#"[2,"10","12","10","11","1"]"#).unwrap();

        let mut replay = CandleReplay::from_path(file.path()).unwrap();
        assert_eq!(replay.remaining(), 2);
        assert_eq!(replay.skipped(), 1);
        assert_eq!(replay.next_candle().unwrap().timestamp_ms, 1);
        assert_eq!(replay.next_candle().unwrap().timestamp_ms, 2);
        assert!(replay.next_candle().is_none());
        assert!(replay.is_exhausted());
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(CandleReplay::from_path("/nonexistent/candles.jsonl").is_err());
    }
}
