//! RSI/price divergence detection.
//!
//! Only the last two candles matter:
//! - bearish: price rose while momentum fell
//! - bullish: price fell while momentum rose
//!
//! Equal values on either axis produce no signal, so the two flags can never
//! be set together.

use std::fmt;

use divmm_core::{CandleSnapshot, IndicatorCandle, Price};

use crate::error::{MakerError, MakerResult};

/// Candles needed for a reading.
pub const MIN_CANDLES: usize = 2;

/// Direction of a detected divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceKind {
    Bearish,
    Bullish,
}

impl fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearish => write!(f, "bearish"),
            Self::Bullish => write!(f, "bullish"),
        }
    }
}

/// Divergence flags for the latest candle pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Divergence {
    pub bearish: bool,
    pub bullish: bool,
}

impl Divergence {
    pub const NONE: Self = Self {
        bearish: false,
        bullish: false,
    };

    /// Compare `cur` against `prev`.
    pub fn between(prev: &IndicatorCandle, cur: &IndicatorCandle) -> Self {
        let price_up = cur.close() > prev.close();
        let price_down = cur.close() < prev.close();
        // NaN compares false both ways and yields no signal.
        let momentum_up = cur.momentum > prev.momentum;
        let momentum_down = cur.momentum < prev.momentum;

        Self {
            bearish: price_up && momentum_down,
            bullish: price_down && momentum_up,
        }
    }

    pub fn kind(&self) -> Option<DivergenceKind> {
        match (self.bearish, self.bullish) {
            (true, false) => Some(DivergenceKind::Bearish),
            (false, true) => Some(DivergenceKind::Bullish),
            _ => None,
        }
    }

    pub fn is(&self, kind: DivergenceKind) -> bool {
        self.kind() == Some(kind)
    }
}

/// Everything the spread step needs from the candle buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalReading {
    pub divergence: Divergence,
    /// NATR (percent) of the newest candle.
    pub volatility: f64,
    /// RSI of the newest candle.
    pub momentum: f64,
    pub close: Price,
}

impl SignalReading {
    /// Read the last two candles of `snapshot`.
    pub fn from_snapshot(snapshot: &CandleSnapshot) -> MakerResult<Self> {
        let (prev, cur) = snapshot
            .last_two()
            .ok_or(MakerError::InsufficientData {
                available: snapshot.len(),
                required: MIN_CANDLES,
            })?;

        Ok(Self {
            divergence: Divergence::between(prev, cur),
            volatility: cur.volatility,
            momentum: cur.momentum,
            close: cur.close(),
        })
    }
}
