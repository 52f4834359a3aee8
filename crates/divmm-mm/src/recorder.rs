//! Fill history.
//!
//! Fills arrive on a channel from the market-access layer and are recorded
//! when the engine drains it. Records are stamped with the engine clock at
//! drain time.

use std::collections::VecDeque;

use divmm_core::{FillEvent, OrderSide, Price, Size, TradingPair};
use rust_decimal::prelude::Signed;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

/// How many trade records to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeRetention {
    #[default]
    Unbounded,
    /// Keep only the newest N records.
    Capped(usize),
}

/// One recorded fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp_ms: i64,
    pub side: OrderSide,
    pub price: Price,
    pub amount: Size,
    pub pair: TradingPair,
}

/// Running totals over every fill seen, including evicted ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeStats {
    pub buy_count: u64,
    pub sell_count: u64,
    pub buy_volume: Decimal,
    pub sell_volume: Decimal,
    /// Net base position from fills (positive = long).
    pub net_size: Decimal,
    /// Average entry price of the net position.
    pub avg_entry: Decimal,
    /// Realized PnL in quote units.
    pub realized_pnl: Decimal,
}

impl TradeStats {
    fn record(&mut self, side: OrderSide, price: Price, amount: Size) {
        let fill_size = amount.inner();
        let fill_price = price.inner();

        let signed_size = match side {
            OrderSide::Buy => {
                self.buy_count += 1;
                self.buy_volume += fill_size;
                fill_size
            }
            OrderSide::Sell => {
                self.sell_count += 1;
                self.sell_volume += fill_size;
                -fill_size
            }
        };

        let old_size = self.net_size;
        let new_size = old_size + signed_size;

        if (old_size > Decimal::ZERO && signed_size < Decimal::ZERO)
            || (old_size < Decimal::ZERO && signed_size > Decimal::ZERO)
        {
            let reduce_amount = signed_size.abs().min(old_size.abs());
            let pnl = if old_size > Decimal::ZERO {
                (fill_price - self.avg_entry) * reduce_amount
            } else {
                (self.avg_entry - fill_price) * reduce_amount
            };
            self.realized_pnl += pnl;
        }

        if new_size.is_zero() {
            self.avg_entry = Decimal::ZERO;
        } else if new_size.signum() != old_size.signum() && !old_size.is_zero() {
            // Flipped through zero.
            self.avg_entry = fill_price;
        } else if new_size.signum() == signed_size.signum() || old_size.is_zero() {
            let old_notional = old_size.abs() * self.avg_entry;
            let new_notional = fill_size * fill_price;
            self.avg_entry = (old_notional + new_notional) / new_size.abs();
        }

        self.net_size = new_size;
    }

    pub fn fill_count(&self) -> u64 {
        self.buy_count + self.sell_count
    }

    /// Mark-to-market PnL of the open position.
    pub fn unrealized_pnl(&self, mark: Price) -> Decimal {
        if self.net_size.is_zero() {
            return Decimal::ZERO;
        }
        (mark.inner() - self.avg_entry) * self.net_size
    }
}

/// Records fills for reporting.
#[derive(Debug)]
pub struct TradeRecorder {
    exchange: String,
    retention: TradeRetention,
    records: VecDeque<TradeRecord>,
    stats: TradeStats,
    evicted: u64,
}

impl TradeRecorder {
    pub fn new(exchange: impl Into<String>, retention: TradeRetention) -> Self {
        Self {
            exchange: exchange.into(),
            retention,
            records: VecDeque::new(),
            stats: TradeStats::default(),
            evicted: 0,
        }
    }

    /// Record one fill, stamped at `now_ms`.
    pub fn record_fill(&mut self, fill: &FillEvent, now_ms: i64) -> TradeRecord {
        info!(
            "{} {} {} {} at {}",
            fill.side,
            fill.amount.inner().round_dp(2),
            fill.pair,
            self.exchange,
            fill.price.display_dp(2)
        );

        let record = TradeRecord {
            timestamp_ms: now_ms,
            side: fill.side,
            price: fill.price,
            amount: fill.amount,
            pair: fill.pair.clone(),
        };

        self.stats.record(fill.side, fill.price, fill.amount);
        self.records.push_back(record.clone());
        if let TradeRetention::Capped(cap) = self.retention {
            while self.records.len() > cap {
                self.records.pop_front();
                self.evicted += 1;
            }
        }
        record
    }

    /// Record every fill waiting on `rx`. Returns the new records in order.
    pub fn drain(&mut self, rx: &mut UnboundedReceiver<FillEvent>, now_ms: i64) -> Vec<TradeRecord> {
        let mut recorded = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(fill) => recorded.push(self.record_fill(&fill, now_ms)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if recorded.is_empty() {
                        warn!("Fill channel closed");
                    }
                    break;
                }
            }
        }
        recorded
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &TradeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &TradeStats {
        &self.stats
    }

    /// Records dropped by the retention cap.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
