//! Rolling candle buffer with indicator columns.

use std::collections::VecDeque;

use divmm_core::{Candle, CandleSnapshot, IndicatorCandle, TradingPair};
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, trace};

use crate::config::CandlesConfig;
use crate::error::{FeedError, FeedResult};
use crate::indicators::{NatrIndicator, RsiIndicator};
use crate::parser::validate_candle;

/// Candle feed for one trading pair.
#[derive(Debug)]
pub struct CandleFeed {
    pair: TradingPair,
    config: CandlesConfig,
    rsi: RsiIndicator,
    natr: NatrIndicator,
    /// Warm candles only, oldest first.
    records: VecDeque<IndicatorCandle>,
    last_timestamp_ms: Option<i64>,
    /// Raw candles consumed, including warm-up.
    seen: u64,
}

impl CandleFeed {
    pub fn new(pair: TradingPair, config: CandlesConfig) -> Self {
        let capacity = config.max_records.min(4096);
        Self {
            rsi: RsiIndicator::new(config.length),
            natr: NatrIndicator::new(config.length),
            pair,
            config,
            records: VecDeque::with_capacity(capacity),
            last_timestamp_ms: None,
            seen: 0,
        }
    }

    /// Append a closed candle.
    ///
    /// Returns the stored indicator candle, or `None` while the indicators
    /// are still warming up.
    pub fn push(&mut self, candle: Candle) -> FeedResult<Option<&IndicatorCandle>> {
        if let Some(last_ms) = self.last_timestamp_ms {
            if candle.timestamp_ms <= last_ms {
                return Err(FeedError::OutOfOrder {
                    timestamp_ms: candle.timestamp_ms,
                    last_ms,
                });
            }
        }
        validate_candle(&candle)?;

        let close = to_f64(candle.close.inner())?;
        let high = to_f64(candle.high.inner())?;
        let low = to_f64(candle.low.inner())?;

        // Only accepted candles move the ordering guard.
        self.last_timestamp_ms = Some(candle.timestamp_ms);
        self.seen += 1;

        let momentum = self.rsi.update(close);
        let volatility = self.natr.update(high, low, close);

        let (momentum, volatility) = match (momentum, volatility) {
            (Some(m), Some(v)) => (m, v),
            _ => {
                trace!(
                    pair = %self.pair,
                    seen = self.seen,
                    length = self.config.length,
                    "Indicators warming up"
                );
                return Ok(None);
            }
        };

        if self.records.len() >= self.config.max_records.max(1) {
            self.records.pop_front();
        }
        self.records
            .push_back(IndicatorCandle::new(candle, momentum, volatility));

        let latest = self.records.back();
        if let Some(c) = latest {
            debug!(
                pair = %self.pair,
                close = %c.close(),
                rsi = c.momentum,
                natr = c.volatility,
                "Candle appended"
            );
        }
        Ok(latest)
    }

    /// Copy of the current buffer, oldest first.
    pub fn snapshot(&self) -> CandleSnapshot {
        CandleSnapshot::new(self.records.iter().cloned().collect())
    }

    /// At least two candles with indicators are available.
    pub fn is_ready(&self) -> bool {
        self.records.len() >= 2
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    /// Display name, e.g. `binance_ETH-USDT`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.config.connector, self.pair)
    }

    pub fn interval(&self) -> &str {
        &self.config.interval
    }

    pub fn config(&self) -> &CandlesConfig {
        &self.config
    }
}

fn to_f64(value: rust_decimal::Decimal) -> FeedResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| FeedError::InvalidData(format!("{value} does not fit in f64")))
}
