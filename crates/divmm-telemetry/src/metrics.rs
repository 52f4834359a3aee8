//! Prometheus metrics for the divergence market maker.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_int_counter,
    CounterVec, Encoder, Gauge, GaugeVec, IntCounter, TextEncoder,
};

use crate::error::TelemetryResult;

/// Refresh cycles by outcome.
/// Labels: outcome (quoted/budget_rejected/skipped)
pub static CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "divmm_cycles_total",
        "Refresh cycles by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Skipped cycles by reason.
pub static CYCLES_SKIPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "divmm_cycles_skipped_total",
        "Skipped refresh cycles by reason",
        &["reason"]
    )
    .unwrap()
});

/// Orders accepted by the market.
pub static ORDERS_SUBMITTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "divmm_orders_submitted_total",
        "Orders accepted by the market"
    )
    .unwrap()
});

/// Order operation failures.
/// Labels: kind (placement/cancellation)
pub static ORDER_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "divmm_order_failures_total",
        "Failed order placements and cancellations",
        &["kind"]
    )
    .unwrap()
});

/// Orders cancelled at refresh.
pub static ORDERS_CANCELLED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "divmm_orders_cancelled_total",
        "Orders cancelled at refresh"
    )
    .unwrap()
});

/// Fills by side.
pub static FILLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("divmm_fills_total", "Recorded fills", &["side"]).unwrap()
});

/// Fill volume in base units by side.
pub static FILL_VOLUME: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "divmm_fill_volume_total",
        "Filled base-asset volume",
        &["side"]
    )
    .unwrap()
});

/// Current spread (fraction of reference price) by side.
pub static SPREAD: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "divmm_spread",
        "Spread applied at the last refresh (fraction of reference)",
        &["side"]
    )
    .unwrap()
});

/// Base-asset share of portfolio value at the last refresh.
pub static INVENTORY_RATIO: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "divmm_inventory_ratio",
        "Base-asset share of portfolio value"
    )
    .unwrap()
});

/// Reference price at the last refresh.
pub static REFERENCE_PRICE: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("divmm_reference_price", "Reference price at last refresh").unwrap()
});

/// Divergence signals by kind.
pub static DIVERGENCE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "divmm_divergence_total",
        "Divergence signals seen at refresh",
        &["kind"]
    )
    .unwrap()
});

/// Skew rule applications.
pub static SKEW_APPLIED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "divmm_skew_applied_total",
        "Inventory skew rule applications",
        &["rule"]
    )
    .unwrap()
});

/// Candles consumed by the feed.
pub static CANDLES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("divmm_candles_total", "Candles consumed by the feed").unwrap()
});

/// Realized PnL in quote units.
pub static REALIZED_PNL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("divmm_realized_pnl", "Realized PnL in quote units").unwrap()
});

/// Static helpers over the registered metrics.
pub struct Metrics;

impl Metrics {
    /// Record a refresh cycle outcome.
    pub fn cycle(outcome: &str) {
        CYCLES_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a skipped cycle.
    pub fn cycle_skipped(reason: &str) {
        CYCLES_TOTAL.with_label_values(&["skipped"]).inc();
        CYCLES_SKIPPED_TOTAL.with_label_values(&[reason]).inc();
    }

    pub fn orders_submitted(count: u64) {
        ORDERS_SUBMITTED_TOTAL.inc_by(count);
    }

    pub fn placement_failures(count: u64) {
        ORDER_FAILURES_TOTAL
            .with_label_values(&["placement"])
            .inc_by(count as f64);
    }

    pub fn cancellation_failures(count: u64) {
        ORDER_FAILURES_TOTAL
            .with_label_values(&["cancellation"])
            .inc_by(count as f64);
    }

    pub fn orders_cancelled(count: u64) {
        ORDERS_CANCELLED_TOTAL.inc_by(count);
    }

    /// Record a fill.
    pub fn fill(side: &str, amount: f64) {
        FILLS_TOTAL.with_label_values(&[side]).inc();
        if amount.is_finite() && amount > 0.0 {
            FILL_VOLUME.with_label_values(&[side]).inc_by(amount);
        }
    }

    /// Set spread gauges.
    pub fn spreads(bid: f64, ask: f64) {
        SPREAD.with_label_values(&["bid"]).set(bid);
        SPREAD.with_label_values(&["ask"]).set(ask);
    }

    pub fn inventory_ratio(ratio: f64) {
        INVENTORY_RATIO.set(ratio);
    }

    pub fn reference_price(price: f64) {
        REFERENCE_PRICE.set(price);
    }

    /// Record a divergence signal.
    pub fn divergence(kind: &str) {
        DIVERGENCE_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn skew_applied(rule: &str) {
        SKEW_APPLIED_TOTAL.with_label_values(&[rule]).inc();
    }

    pub fn candle_consumed() {
        CANDLES_TOTAL.inc();
    }

    pub fn realized_pnl(pnl: f64) {
        REALIZED_PNL.set(pnl);
    }

    /// Prometheus text exposition of the default registry.
    pub fn render() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the text exposition to `path`.
    pub fn write_snapshot(path: &Path) -> TelemetryResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, Self::render()?)?;
        Ok(())
    }
}
