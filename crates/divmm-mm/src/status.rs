//! Plain-text status report.

use std::fmt::Write;

use chrono::{TimeZone, Utc};
use divmm_core::{CandleSnapshot, PriceType};

use crate::config::MakerConfig;
use crate::market::MarketAccess;
use crate::recorder::TradeRecorder;

const SEPARATOR: &str =
    "----------------------------------------------------------------------";

/// Trades listed under the summary line.
const RECENT_TRADES: usize = 5;

/// Candle feed description for the candles section.
#[derive(Debug, Clone, Copy)]
pub struct FeedLabel<'a> {
    pub name: &'a str,
    pub interval: &'a str,
    /// Indicator window; caps the rows shown.
    pub length: usize,
}

/// Render balances, open orders, recent candles and trade history.
pub fn format_status<M>(
    config: &MakerConfig,
    market: &M,
    candles: &CandleSnapshot,
    feed: FeedLabel<'_>,
    recorder: &TradeRecorder,
    now_ms: i64,
) -> String
where
    M: MarketAccess + ?Sized,
{
    if !market.is_ready() {
        return "Market connectors are not ready.".to_string();
    }

    let pair = &config.trading_pair;
    let mut out = String::new();

    // Balances
    let _ = writeln!(out);
    let _ = writeln!(out, "  Balances:");
    let _ = writeln!(
        out,
        "    {:<22} {:<6} {:>16} {:>18}",
        "Exchange", "Asset", "Total Balance", "Available Balance"
    );
    for asset in [pair.base(), pair.quote()] {
        let _ = writeln!(
            out,
            "    {:<22} {:<6} {:>16} {:>18}",
            config.exchange,
            asset,
            market.balance(asset).round_dp(4).to_string(),
            market.available_balance(asset).round_dp(4).to_string()
        );
    }

    // Orders
    let orders = market.open_orders(pair);
    let _ = writeln!(out);
    if orders.is_empty() {
        let _ = writeln!(out, "  No active maker orders.");
    } else {
        let _ = writeln!(out, "  Orders:");
        let _ = writeln!(
            out,
            "    {:<22} {:<10} {:<5} {:>14} {:>10} {:>9}",
            "Exchange", "Market", "Side", "Price", "Amount", "Age"
        );
        for order in &orders {
            let _ = writeln!(
                out,
                "    {:<22} {:<10} {:<5} {:>14} {:>10} {:>9}",
                config.exchange,
                order.pair.to_string(),
                order.side.as_str(),
                order.price.display_dp(4).to_string(),
                order.amount.inner().round_dp(4).to_string(),
                format_age(order.age_secs(now_ms))
            );
        }
    }

    let _ = writeln!(out, "\n{SEPARATOR}\n");

    // Candles
    let _ = writeln!(
        out,
        "  Candles: {} | Interval: {}",
        feed.name, feed.interval
    );
    let _ = writeln!(out);
    let rows = config
        .display_rows
        .min(feed.length)
        .min(candles.len());
    if rows == 0 {
        let _ = writeln!(out, "    No candles with indicators yet.");
    } else {
        let _ = writeln!(
            out,
            "    {:<20} {:>12} {:>12} {:>12} {:>12} {:>12} {:>8} {:>8}",
            "timestamp", "open", "high", "low", "close", "volume", "RSI", "NATR"
        );
        for c in candles.tail(rows) {
            let _ = writeln!(
                out,
                "    {:<20} {:>12} {:>12} {:>12} {:>12} {:>12} {:>8.2} {:>8.4}",
                format_timestamp(c.timestamp_ms()),
                c.candle.open.display_dp(4).to_string(),
                c.candle.high.display_dp(4).to_string(),
                c.candle.low.display_dp(4).to_string(),
                c.candle.close.display_dp(4).to_string(),
                c.candle.volume.inner().round_dp(4).to_string(),
                c.momentum,
                c.volatility
            );
        }
    }

    // Trades
    let stats = recorder.stats();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Trades: {} buys, {} sells | Net: {} {} | Realized PnL: {} {}",
        stats.buy_count,
        stats.sell_count,
        stats.net_size.round_dp(4),
        pair.base(),
        stats.realized_pnl.round_dp(4),
        pair.quote()
    );
    if let Ok(mid) = market.reference_price(pair, PriceType::Mid) {
        let _ = writeln!(
            out,
            "  Unrealized PnL: {} {} at mid {}",
            stats.unrealized_pnl(mid).round_dp(4),
            pair.quote(),
            mid.display_dp(4)
        );
    }
    for record in recorder.records().rev().take(RECENT_TRADES) {
        let _ = writeln!(
            out,
            "    {:<20} {:<5} {:>14} {:>10}",
            format_timestamp(record.timestamp_ms),
            record.side.as_str(),
            record.price.display_dp(4).to_string(),
            record.amount.inner().round_dp(4).to_string()
        );
    }

    out
}

fn format_age(secs: i64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

fn format_timestamp(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketAccess;
    use crate::recorder::TradeRetention;
    use divmm_core::{
        Candle, ClientOrderId, FillEvent, IndicatorCandle, OpenOrder, OrderSide, Price, Size,
        TradingPair,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const FEED: FeedLabel<'static> = FeedLabel {
        name: "binance_ETH-USDT",
        interval: "1m",
        length: 30,
    };

    fn candle(ts: i64, close: Decimal) -> IndicatorCandle {
        let close = Price::new(close);
        IndicatorCandle::new(
            Candle {
                timestamp_ms: ts,
                open: close,
                high: close,
                low: close,
                close,
                volume: Size::new(dec!(1)),
            },
            50.0,
            0.5,
        )
    }

    fn ready_market(orders: Vec<OpenOrder>) -> MockMarketAccess {
        let mut m = MockMarketAccess::new();
        m.expect_is_ready().return_const(true);
        m.expect_balance().return_const(dec!(10));
        m.expect_available_balance().return_const(dec!(9.5));
        m.expect_open_orders().returning(move |_| orders.clone());
        m.expect_reference_price()
            .returning(|_, _| Ok(Price::new(dec!(100))));
        m
    }

    #[test]
    fn test_not_ready() {
        let mut m = MockMarketAccess::new();
        m.expect_is_ready().return_const(false);
        let status = format_status(
            &MakerConfig::default(),
            &m,
            &CandleSnapshot::default(),
            FEED,
            &TradeRecorder::new("paper", TradeRetention::Unbounded),
            0,
        );
        assert_eq!(status, "Market connectors are not ready.");
    }

    #[test]
    fn test_no_orders_and_candle_header() {
        let m = ready_market(Vec::new());
        let status = format_status(
            &MakerConfig::default(),
            &m,
            &CandleSnapshot::default(),
            FEED,
            &TradeRecorder::new("paper", TradeRetention::Unbounded),
            0,
        );
        assert!(status.contains("  Balances:"));
        assert!(status.contains("No active maker orders."));
        assert!(status.contains("Candles: binance_ETH-USDT | Interval: 1m"));
        assert!(status.contains(SEPARATOR));
    }

    #[test]
    fn test_orders_and_newest_candles_first() {
        let order = OpenOrder {
            id: ClientOrderId::from("x"),
            pair: TradingPair::new("ETH", "USDT"),
            side: OrderSide::Sell,
            price: Price::new(dec!(100.01)),
            amount: Size::new(dec!(0.01)),
            created_at_ms: 0,
        };
        let m = ready_market(vec![order]);
        let snapshot = CandleSnapshot::new(
            (0..8)
                .map(|i| candle(i * 60_000, Decimal::from(1000 + i)))
                .collect(),
        );

        let status = format_status(
            &MakerConfig::default(),
            &m,
            &snapshot,
            FEED,
            &TradeRecorder::new("paper", TradeRetention::Unbounded),
            3_725_000,
        );

        assert!(status.contains("  Orders:"));
        assert!(status.contains("SELL"));
        assert!(status.contains("01:02:05"));
        // display_rows = 5: closes 1007..1003, newest first.
        let newest = status.find("1007").unwrap();
        let oldest_shown = status.find("1003").unwrap();
        assert!(newest < oldest_shown);
        assert!(!status.contains("1002"));
    }

    #[test]
    fn test_rows_capped_by_indicator_window() {
        let m = ready_market(Vec::new());
        let snapshot = CandleSnapshot::new(
            (0..8)
                .map(|i| candle(i * 60_000, Decimal::from(1000 + i)))
                .collect(),
        );
        let feed = FeedLabel { length: 3, ..FEED };

        let status = format_status(
            &MakerConfig::default(),
            &m,
            &snapshot,
            feed,
            &TradeRecorder::new("paper", TradeRetention::Unbounded),
            0,
        );
        assert!(status.contains("1007"));
        assert!(status.contains("1005"));
        assert!(!status.contains("1004"));
    }

    #[test]
    fn test_trade_summary() {
        let m = ready_market(Vec::new());
        let mut recorder = TradeRecorder::new("paper", TradeRetention::Unbounded);
        recorder.record_fill(
            &FillEvent {
                timestamp_ms: 0,
                order_id: ClientOrderId::from("b"),
                pair: TradingPair::new("ETH", "USDT"),
                side: OrderSide::Buy,
                price: Price::new(dec!(99.99)),
                amount: Size::new(dec!(0.01)),
            },
            60_000,
        );
        let status = format_status(
            &MakerConfig::default(),
            &m,
            &CandleSnapshot::default(),
            FEED,
            &recorder,
            60_000,
        );
        assert!(status.contains("Trades: 1 buys, 0 sells"));
        assert!(status.contains("Unrealized PnL: 0.0001 USDT at mid 100"));
        assert!(status.contains("1970-01-01 00:01:00"));
        assert!(status.contains("99.99"));
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(0), "00:00:00");
        assert_eq!(format_age(3661), "01:01:01");
    }
}
