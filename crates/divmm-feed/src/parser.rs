//! Candle line parsing.
//!
//! Supports two line formats:
//! 1. Object: `{"timestamp_ms": 1700000000000, "open": "2000.1", "high": ..., "volume": "12.3"}`
//! 2. Binance kline array: `[1700000000000, "2000.1", "2001.0", "1999.0", "2000.5", "12.3", ...]`
//!    (open time, open, high, low, close, volume; trailing fields ignored)

use divmm_core::{Candle, Price, Size};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::{FeedError, FeedResult};

/// Parse one JSON line into a candle.
pub fn parse_candle_line(line: &str) -> FeedResult<Candle> {
    let value: Value = serde_json::from_str(line.trim())?;
    let candle = match value {
        Value::Array(fields) => parse_kline(&fields)?,
        Value::Object(_) => serde_json::from_value::<Candle>(value)?,
        other => {
            return Err(FeedError::ParseError(format!(
                "expected object or array, got {other}"
            )))
        }
    };
    validate_candle(&candle)?;
    Ok(candle)
}

fn parse_kline(fields: &[Value]) -> FeedResult<Candle> {
    if fields.len() < 6 {
        return Err(FeedError::ParseError(format!(
            "kline needs at least 6 fields, got {}",
            fields.len()
        )));
    }
    let timestamp_ms = fields[0]
        .as_i64()
        .ok_or_else(|| FeedError::ParseError("kline open time is not an integer".to_string()))?;

    Ok(Candle {
        timestamp_ms,
        open: Price::new(decimal_field(&fields[1], "open")?),
        high: Price::new(decimal_field(&fields[2], "high")?),
        low: Price::new(decimal_field(&fields[3], "low")?),
        close: Price::new(decimal_field(&fields[4], "close")?),
        volume: Size::new(decimal_field(&fields[5], "volume")?),
    })
}

/// Exchanges send numbers as strings; accept both.
fn decimal_field(value: &Value, name: &str) -> FeedResult<Decimal> {
    let parsed = match value {
        Value::String(s) => s.parse::<Decimal>().ok(),
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| FeedError::ParseError(format!("invalid {name}: {value}")))
}

/// Reject candles no exchange would print.
pub(crate) fn validate_candle(candle: &Candle) -> FeedResult<()> {
    if !candle.close.is_positive() {
        return Err(FeedError::InvalidData(format!(
            "non-positive close {} at {}",
            candle.close, candle.timestamp_ms
        )));
    }
    if candle.high < candle.low {
        return Err(FeedError::InvalidData(format!(
            "high {} below low {} at {}",
            candle.high, candle.low, candle.timestamp_ms
        )));
    }
    Ok(())
}
