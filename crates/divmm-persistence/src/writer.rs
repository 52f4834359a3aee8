//! JSON Lines file writer for trade history.
//!
//! Uses JSON Lines format (.jsonl) for robustness:
//! - Each line is a complete JSON object
//! - Partial file corruption only affects individual lines
//! - Can be read even if write was interrupted
//!
//! Files are named `trades_{YYYY-MM-DD}.jsonl` after the UTC date of each
//! record's timestamp, so replayed history lands in the day it happened.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use divmm_mm::TradeRecord;
use tracing::{debug, info, warn};

use crate::error::{PersistenceError, PersistenceResult};

/// Active writer state for daily file.
struct ActiveWriter {
    writer: BufWriter<File>,
    date: String,
    records_written: usize,
}

/// JSON Lines writer for trade records.
///
/// Uses append mode, so restarts never truncate earlier history.
pub struct TradeWriter {
    base_dir: PathBuf,
    buffer: Vec<TradeRecord>,
    max_buffer_size: usize,
    active_writer: Option<ActiveWriter>,
    total_written: usize,
}

impl TradeWriter {
    /// Create a writer, creating `base_dir` if needed.
    pub fn new(base_dir: impl AsRef<Path>, max_buffer_size: usize) -> PersistenceResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;

        Ok(Self {
            base_dir,
            buffer: Vec::with_capacity(max_buffer_size),
            max_buffer_size: max_buffer_size.max(1),
            active_writer: None,
            total_written: 0,
        })
    }

    /// Buffer a record, flushing when the buffer is full.
    pub fn add_record(&mut self, record: TradeRecord) -> PersistenceResult<()> {
        self.buffer.push(record);

        if self.buffer.len() >= self.max_buffer_size {
            self.flush()?;
        }

        Ok(())
    }

    /// Path of the file for `date`.
    pub fn file_path(&self, date: &str) -> PathBuf {
        self.base_dir.join(format!("trades_{date}.jsonl"))
    }

    fn close_active_writer(&mut self) {
        if let Some(mut active) = self.active_writer.take() {
            if let Err(e) = active.writer.flush() {
                warn!(?e, "Failed to flush writer on close");
            }
            info!(
                date = %active.date,
                records = active.records_written,
                "Closed trade history writer"
            );
        }
    }

    fn open_writer(&mut self, date: &str) -> PersistenceResult<()> {
        let path = self.file_path(date);
        info!(path = %path.display(), "Opening trade history writer (append mode)");

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        self.active_writer = Some(ActiveWriter {
            writer: BufWriter::new(file),
            date: date.to_string(),
            records_written: 0,
        });
        Ok(())
    }

    /// Write buffered records, rotating files on date change.
    pub fn flush(&mut self) -> PersistenceResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let records = std::mem::take(&mut self.buffer);
        let count = records.len();

        for record in &records {
            let date = record_date(record.timestamp_ms)?;

            let rotate = self
                .active_writer
                .as_ref()
                .map(|w| w.date != date)
                .unwrap_or(true);
            if rotate {
                self.close_active_writer();
                self.open_writer(&date)?;
            }

            let json = serde_json::to_string(record)?;
            if let Some(active) = self.active_writer.as_mut() {
                writeln!(active.writer, "{json}")?;
                active.records_written += 1;
            }
        }

        if let Some(active) = self.active_writer.as_mut() {
            active.writer.flush()?;
        }
        self.total_written += count;

        debug!(records = count, "Flushed trades to JSON Lines");
        Ok(())
    }

    /// Flush pending records and close the file.
    pub fn close(&mut self) -> PersistenceResult<()> {
        self.flush()?;
        self.close_active_writer();
        Ok(())
    }

    /// Records written since creation.
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl Drop for TradeWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(?e, "Failed to flush buffer on drop");
        }
        self.close_active_writer();
    }
}

fn record_date(timestamp_ms: i64) -> PersistenceResult<String> {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .ok_or(PersistenceError::InvalidTimestamp(timestamp_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use divmm_core::{OrderSide, Price, Size, TradingPair};
    use rust_decimal_macros::dec;
    use std::io::{BufRead, BufReader};
    use tempfile::TempDir;

    const DAY_MS: i64 = 86_400_000;

    fn make_test_record(timestamp_ms: i64) -> TradeRecord {
        TradeRecord {
            timestamp_ms,
            side: OrderSide::Buy,
            price: Price::new(dec!(99.99)),
            amount: Size::new(dec!(0.01)),
            pair: TradingPair::new("ETH", "USDT"),
        }
    }

    fn read_lines(path: &Path) -> Vec<String> {
        let reader = BufReader::new(File::open(path).unwrap());
        reader.lines().map_while(Result::ok).collect()
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = TradeWriter::new(temp_dir.path(), 100).unwrap();

        for i in 0..5 {
            writer.add_record(make_test_record(1_700_000_000_000 + i)).unwrap();
        }
        assert_eq!(writer.pending(), 5);
        writer.close().unwrap();
        assert_eq!(writer.total_written(), 5);

        let lines = read_lines(&writer.file_path("2023-11-14"));
        assert_eq!(lines.len(), 5);

        let record: TradeRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(record, make_test_record(1_700_000_000_000));

        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["timestamp_ms"], 1_700_000_000_000i64);
        assert_eq!(value["pair"], "ETH-USDT");
        assert!(value.get("price").is_some());
        assert!(value.get("amount").is_some());
        assert!(value.get("side").is_some());
    }

    #[test]
    fn test_append_mode() {
        let temp_dir = TempDir::new().unwrap();

        for batch in 0..2 {
            let mut writer = TradeWriter::new(temp_dir.path(), 100).unwrap();
            for i in 0..3 {
                writer.add_record(make_test_record(batch * 3 + i)).unwrap();
            }
            writer.close().unwrap();
        }

        let writer = TradeWriter::new(temp_dir.path(), 100).unwrap();
        let lines = read_lines(&writer.file_path("1970-01-01"));
        assert_eq!(lines.len(), 6, "Should have 6 records total from 2 writes");
    }

    #[test]
    fn test_rotates_on_record_date() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = TradeWriter::new(temp_dir.path(), 100).unwrap();
        writer.add_record(make_test_record(DAY_MS - 1)).unwrap();
        writer.add_record(make_test_record(DAY_MS)).unwrap();
        writer.add_record(make_test_record(DAY_MS + 1)).unwrap();
        writer.close().unwrap();

        assert_eq!(read_lines(&writer.file_path("1970-01-01")).len(), 1);
        assert_eq!(read_lines(&writer.file_path("1970-01-02")).len(), 2);
    }

    #[test]
    fn test_auto_flush_at_buffer_size() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = TradeWriter::new(temp_dir.path(), 2).unwrap();
        writer.add_record(make_test_record(1)).unwrap();
        assert_eq!(writer.pending(), 1);
        writer.add_record(make_test_record(2)).unwrap();
        assert_eq!(writer.pending(), 0);
        assert_eq!(read_lines(&writer.file_path("1970-01-01")).len(), 2);
    }

    #[test]
    fn test_empty_flush_noop() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = TradeWriter::new(temp_dir.path(), 100).unwrap();
        writer.flush().unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert!(entries.is_empty());
    }
}
