//! Incremental RSI and NATR with Wilder smoothing.
//!
//! Both indicators return `None` until `window` samples have been seen, so a
//! candle is only exposed to the engine once its indicator columns are real
//! numbers.

/// RSI (Relative Strength Index): Wilder-smoothed average gain over loss.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    window: usize,
    prev_close: Option<f64>,
    avg_gain: f64,
    avg_loss: f64,
    gain_sum: f64,
    loss_sum: f64,
    count: usize,
    warm: bool,
}

impl RsiIndicator {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            prev_close: None,
            avg_gain: 0.0,
            avg_loss: 0.0,
            gain_sum: 0.0,
            loss_sum: 0.0,
            count: 0,
            warm: false,
        }
    }

    /// Feed a close; returns the RSI once warm.
    pub fn update(&mut self, close: f64) -> Option<f64> {
        if !close.is_finite() {
            return self.value();
        }
        let prev = match self.prev_close.replace(close) {
            Some(prev) => prev,
            None => return None,
        };

        let change = close - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let w = self.window as f64;

        if self.warm {
            self.avg_gain = (self.avg_gain * (w - 1.0) + gain) / w;
            self.avg_loss = (self.avg_loss * (w - 1.0) + loss) / w;
        } else {
            self.gain_sum += gain;
            self.loss_sum += loss;
            self.count += 1;
            if self.count < self.window {
                return None;
            }
            self.avg_gain = self.gain_sum / w;
            self.avg_loss = self.loss_sum / w;
            self.warm = true;
        }

        self.value()
    }

    /// Current RSI, `None` while warming up.
    pub fn value(&self) -> Option<f64> {
        if !self.warm {
            return None;
        }
        if self.avg_loss == 0.0 {
            if self.avg_gain == 0.0 {
                return Some(50.0);
            }
            return Some(100.0);
        }
        let rs = self.avg_gain / self.avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }

    pub fn is_warm(&self) -> bool {
        self.warm
    }
}

/// NATR: Wilder ATR expressed as a percentage of the close.
#[derive(Debug, Clone)]
pub struct NatrIndicator {
    window: usize,
    prev_close: Option<f64>,
    atr: f64,
    tr_sum: f64,
    count: usize,
    warm: bool,
}

impl NatrIndicator {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            prev_close: None,
            atr: 0.0,
            tr_sum: 0.0,
            count: 0,
            warm: false,
        }
    }

    /// Feed a bar; returns `100 * ATR / close` once warm.
    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        if !(high.is_finite() && low.is_finite() && close.is_finite()) {
            return None;
        }
        let tr = match self.prev_close {
            Some(prev) => (high - low)
                .max((high - prev).abs())
                .max((low - prev).abs()),
            None => high - low,
        };
        self.prev_close = Some(close);

        let w = self.window as f64;
        if self.warm {
            self.atr = (self.atr * (w - 1.0) + tr) / w;
        } else {
            self.tr_sum += tr;
            self.count += 1;
            if self.count < self.window {
                return None;
            }
            self.atr = self.tr_sum / w;
            self.warm = true;
        }

        if close == 0.0 {
            return None;
        }
        Some(self.atr / close * 100.0)
    }

    pub fn is_warm(&self) -> bool {
        self.warm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_warmup() {
        let mut rsi = RsiIndicator::new(3);
        assert_eq!(rsi.update(10.0), None);
        assert_eq!(rsi.update(11.0), None);
        assert_eq!(rsi.update(12.0), None);
        assert!(rsi.update(13.0).is_some());
        assert!(rsi.is_warm());
    }

    #[test]
    fn test_rsi_monotonic_rise_is_100() {
        let mut rsi = RsiIndicator::new(5);
        let mut last = None;
        for i in 0..20 {
            last = rsi.update(100.0 + i as f64);
        }
        assert_eq!(last, Some(100.0));
    }

    #[test]
    fn test_rsi_monotonic_fall_is_0() {
        let mut rsi = RsiIndicator::new(5);
        let mut last = None;
        for i in 0..20 {
            last = rsi.update(100.0 - i as f64);
        }
        assert_eq!(last, Some(0.0));
    }

    #[test]
    fn test_rsi_flat_is_neutral() {
        let mut rsi = RsiIndicator::new(4);
        let mut last = None;
        for _ in 0..10 {
            last = rsi.update(42.0);
        }
        assert_eq!(last, Some(50.0));
    }

    #[test]
    fn test_rsi_falls_after_drop() {
        let mut rsi = RsiIndicator::new(3);
        for c in [10.0, 11.0, 10.5, 11.5, 12.0] {
            rsi.update(c);
        }
        let before = rsi.value().unwrap();
        let after = rsi.update(11.0).unwrap();
        assert!(after < before);
    }

    #[test]
    fn test_natr_constant_range() {
        let mut natr = NatrIndicator::new(3);
        assert_eq!(natr.update(101.0, 99.0, 100.0), None);
        assert_eq!(natr.update(101.0, 99.0, 100.0), None);
        let v = natr.update(101.0, 99.0, 100.0).unwrap();
        // ATR = 2, close = 100 -> 2%
        assert!((v - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_natr_uses_gap_from_prev_close() {
        let mut natr = NatrIndicator::new(1);
        natr.update(100.0, 100.0, 100.0);
        // Gap up: TR = |110 - 100| = 10 even though the bar range is 0.
        let v = natr.update(110.0, 110.0, 110.0).unwrap();
        assert!((v - 10.0 / 110.0 * 100.0).abs() < 1e-12);
    }
}
