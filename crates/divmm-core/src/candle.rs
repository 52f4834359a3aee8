//! Candle market data.
//!
//! `Candle` is a raw OHLCV bar. `IndicatorCandle` is the same bar with the
//! momentum oscillator (RSI) and normalised volatility (NATR, percent)
//! already attached by the feed. The engine only ever reads a
//! `CandleSnapshot`; it never mutates one.

use serde::{Deserialize, Serialize};

use crate::{Price, Size};

/// Raw OHLCV candle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time (Unix milliseconds).
    pub timestamp_ms: i64,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Size,
}

/// Candle with indicator columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorCandle {
    pub candle: Candle,
    /// Momentum oscillator value (RSI, 0..100).
    pub momentum: f64,
    /// Normalised volatility in percent (NATR).
    pub volatility: f64,
}

impl IndicatorCandle {
    pub fn new(candle: Candle, momentum: f64, volatility: f64) -> Self {
        Self {
            candle,
            momentum,
            volatility,
        }
    }

    #[inline]
    pub fn close(&self) -> Price {
        self.candle.close
    }

    #[inline]
    pub fn timestamp_ms(&self) -> i64 {
        self.candle.timestamp_ms
    }
}

/// Ordered (oldest to newest) view of recent indicator candles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSnapshot {
    records: Vec<IndicatorCandle>,
}

impl CandleSnapshot {
    pub fn new(records: Vec<IndicatorCandle>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest record.
    pub fn latest(&self) -> Option<&IndicatorCandle> {
        self.records.last()
    }

    /// `(previous, current)` pair, `None` with fewer than two records.
    pub fn last_two(&self) -> Option<(&IndicatorCandle, &IndicatorCandle)> {
        match self.records.as_slice() {
            [.., prev, cur] => Some((prev, cur)),
            _ => None,
        }
    }

    /// The newest `n` records, newest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &IndicatorCandle> {
        self.records.iter().rev().take(n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorCandle> {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) fn sample(ts: i64, close: rust_decimal::Decimal) -> IndicatorCandle {
    IndicatorCandle::new(
        Candle {
            timestamp_ms: ts,
            open: Price::new(close),
            high: Price::new(close),
            low: Price::new(close),
            close: Price::new(close),
            volume: Size::ZERO,
        },
        50.0,
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_last_two_requires_two_records() {
        assert!(CandleSnapshot::default().last_two().is_none());
        let one = CandleSnapshot::new(vec![sample(0, dec!(100))]);
        assert!(one.last_two().is_none());
    }

    #[test]
    fn test_last_two_reads_newest_pair() {
        let snap = CandleSnapshot::new(vec![
            sample(0, dec!(100)),
            sample(60_000, dec!(101)),
            sample(120_000, dec!(102)),
        ]);
        let (prev, cur) = snap.last_two().unwrap();
        assert_eq!(prev.close(), Price::new(dec!(101)));
        assert_eq!(cur.close(), Price::new(dec!(102)));
    }

    #[test]
    fn test_tail_is_newest_first() {
        let snap = CandleSnapshot::new(vec![
            sample(0, dec!(1)),
            sample(1, dec!(2)),
            sample(2, dec!(3)),
        ]);
        let ts: Vec<i64> = snap.tail(2).map(|c| c.timestamp_ms()).collect();
        assert_eq!(ts, vec![2, 1]);
        assert_eq!(snap.tail(10).count(), 3);
    }
}
