//! Market making configuration.

use divmm_core::{PriceType, TradingPair};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MakerError, MakerResult};
use crate::recorder::TradeRetention;

/// Market making configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Pair to quote, e.g. "ETH-USDT".
    #[serde(default = "default_trading_pair")]
    pub trading_pair: TradingPair,

    /// Exchange label used in logs and status.
    #[serde(default = "default_exchange")]
    pub exchange: String,

    /// Base bid spread as a fraction of the reference price (0.0001 = 1 bp).
    #[serde(default = "default_spread")]
    pub bid_spread: Decimal,

    /// Base ask spread as a fraction of the reference price.
    #[serde(default = "default_spread")]
    pub ask_spread: Decimal,

    /// Amount per side in base-asset units.
    #[serde(default = "default_order_amount")]
    pub order_amount: Decimal,

    /// Minimum time between refresh cycles in milliseconds.
    #[serde(default = "default_order_refresh_time_ms")]
    pub order_refresh_time_ms: u64,

    /// Which reference price to quote around.
    /// Inventory is always valued at mid regardless of this setting.
    #[serde(default)]
    pub price_type: PriceType,

    /// Multiplier applied to the tightened side when a skew rule fires.
    #[serde(default = "default_skew_discount")]
    pub skew_discount: Decimal,

    /// Inventory ratio above which a bearish divergence tightens the ask.
    #[serde(default = "default_high_inventory_threshold")]
    pub high_inventory_threshold: Decimal,

    /// Inventory ratio below which a bullish divergence tightens the bid.
    #[serde(default = "default_low_inventory_threshold")]
    pub low_inventory_threshold: Decimal,

    /// Drop the whole proposal if any leg fails the budget check.
    #[serde(default = "default_true")]
    pub all_or_none: bool,

    /// Candle rows shown in the status report.
    #[serde(default = "default_display_rows")]
    pub display_rows: usize,

    /// Trade history retention.
    #[serde(default)]
    pub trade_retention: TradeRetention,
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            trading_pair: default_trading_pair(),
            exchange: default_exchange(),
            bid_spread: default_spread(),
            ask_spread: default_spread(),
            order_amount: default_order_amount(),
            order_refresh_time_ms: default_order_refresh_time_ms(),
            price_type: PriceType::default(),
            skew_discount: default_skew_discount(),
            high_inventory_threshold: default_high_inventory_threshold(),
            low_inventory_threshold: default_low_inventory_threshold(),
            all_or_none: true,
            display_rows: default_display_rows(),
            trade_retention: TradeRetention::default(),
        }
    }
}

impl MakerConfig {
    /// Reject configurations that cannot produce a valid quote.
    pub fn validate(&self) -> MakerResult<()> {
        if self.bid_spread <= Decimal::ZERO || self.bid_spread >= Decimal::ONE {
            return Err(MakerError::InvalidConfig(format!(
                "bid_spread must be in (0, 1), got {}",
                self.bid_spread
            )));
        }
        if self.ask_spread <= Decimal::ZERO {
            return Err(MakerError::InvalidConfig(format!(
                "ask_spread must be positive, got {}",
                self.ask_spread
            )));
        }
        if self.order_amount <= Decimal::ZERO {
            return Err(MakerError::InvalidConfig(format!(
                "order_amount must be positive, got {}",
                self.order_amount
            )));
        }
        if self.order_refresh_time_ms == 0 {
            return Err(MakerError::InvalidConfig(
                "order_refresh_time_ms must be positive".to_string(),
            ));
        }
        if self.skew_discount <= Decimal::ZERO || self.skew_discount > Decimal::ONE {
            return Err(MakerError::InvalidConfig(format!(
                "skew_discount must be in (0, 1], got {}",
                self.skew_discount
            )));
        }
        let in_unit = |t: Decimal| t >= Decimal::ZERO && t <= Decimal::ONE;
        if !in_unit(self.low_inventory_threshold)
            || !in_unit(self.high_inventory_threshold)
            || self.low_inventory_threshold >= self.high_inventory_threshold
        {
            return Err(MakerError::InvalidConfig(format!(
                "inventory thresholds must satisfy 0 <= low < high <= 1, got low={} high={}",
                self.low_inventory_threshold, self.high_inventory_threshold
            )));
        }
        if let TradeRetention::Capped(0) = self.trade_retention {
            return Err(MakerError::InvalidConfig(
                "capped trade retention needs at least one record".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_trading_pair() -> TradingPair {
    TradingPair::new("ETH", "USDT")
}

fn default_exchange() -> String {
    "binance_paper_trade".to_string()
}

fn default_spread() -> Decimal {
    Decimal::new(1, 4) // 0.0001 = 1 bp
}

fn default_order_amount() -> Decimal {
    Decimal::new(1, 2) // 0.01 base units
}

fn default_order_refresh_time_ms() -> u64 {
    10_000 // 10 seconds
}

fn default_skew_discount() -> Decimal {
    Decimal::new(9, 1) // 0.9
}

fn default_high_inventory_threshold() -> Decimal {
    Decimal::new(7, 1) // 0.7
}

fn default_low_inventory_threshold() -> Decimal {
    Decimal::new(3, 1) // 0.3
}

fn default_display_rows() -> usize {
    5
}
