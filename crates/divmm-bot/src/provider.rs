//! Candle feed adapter for the quote manager.

use divmm_core::{CandleSnapshot, TradingPair};
use divmm_feed::CandleFeed;
use divmm_mm::CandleProvider;
use tracing::warn;

/// Adapts `CandleFeed` to `CandleProvider`.
///
/// The feed serves a single pair; any other pair gets an empty snapshot,
/// which the engine treats as insufficient data.
pub struct FeedCandles<'a> {
    feed: &'a CandleFeed,
}

impl<'a> FeedCandles<'a> {
    pub fn new(feed: &'a CandleFeed) -> Self {
        Self { feed }
    }
}

impl CandleProvider for FeedCandles<'_> {
    fn latest_candles(&self, pair: &TradingPair) -> CandleSnapshot {
        if pair != self.feed.pair() {
            warn!(requested = %pair, feed = %self.feed.pair(), "Candle feed pair mismatch");
            return CandleSnapshot::default();
        }
        self.feed.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use divmm_core::{Candle, Price, Size};
    use divmm_feed::CandlesConfig;
    use rust_decimal::Decimal;

    fn feed_with_candles() -> CandleFeed {
        let mut feed = CandleFeed::new(
            TradingPair::new("ETH", "USDT"),
            CandlesConfig {
                length: 1,
                ..Default::default()
            },
        );
        for i in 0..4 {
            let c = Decimal::from(100 + i);
            feed.push(Candle {
                timestamp_ms: i * 60_000,
                open: Price::new(c),
                high: Price::new(c + Decimal::ONE),
                low: Price::new(c - Decimal::ONE),
                close: Price::new(c),
                volume: Size::new(Decimal::ONE),
            })
            .unwrap();
        }
        feed
    }

    #[test]
    fn test_matching_pair_returns_snapshot() {
        let feed = feed_with_candles();
        let provider = FeedCandles::new(&feed);
        let snap = provider.latest_candles(&TradingPair::new("ETH", "USDT"));
        assert_eq!(snap.len(), feed.len());
        assert!(snap.len() >= 2);
    }

    #[test]
    fn test_other_pair_is_empty() {
        let feed = feed_with_candles();
        let provider = FeedCandles::new(&feed);
        assert!(provider
            .latest_candles(&TradingPair::new("BTC", "USDT"))
            .is_empty());
    }
}
