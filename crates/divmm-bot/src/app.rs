//! Main application orchestration.
//!
//! Coordinates all components:
//! - Candle replay into the indicator feed
//! - Paper market matching along each candle's price path
//! - Refresh cycles (cancel, budget clip, place) through the quote manager
//! - Fill recording, trade history files and metrics
//!
//! The engine clock is candle time: each replayed candle advances it to the
//! candle's close, so refresh timing is reproducible regardless of how fast
//! the replay runs.

use std::time::Duration;

use divmm_core::{FillEvent, TradingPair};
use divmm_feed::{CandleFeed, CandleReplay};
use divmm_mm::{
    format_status, CycleOutcome, CycleReport, FeedLabel, QuoteManager, RefreshTimer,
    TradeRecorder,
};
use divmm_paper::PaperMarket;
use divmm_persistence::TradeWriter;
use divmm_telemetry::Metrics;
use rust_decimal::prelude::ToPrimitive;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::provider::FeedCandles;

/// Main application.
pub struct Application {
    config: AppConfig,
    feed: CandleFeed,
    replay: CandleReplay,
    market: PaperMarket,
    fill_rx: UnboundedReceiver<FillEvent>,
    manager: QuoteManager,
    timer: RefreshTimer,
    recorder: TradeRecorder,
    writer: Option<TradeWriter>,
    /// Close time of the newest accepted candle.
    now_ms: i64,
    /// Accepted candles.
    ticks: u64,
}

impl Application {
    /// Create an application replaying `config.feed.candles_path`.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let replay = CandleReplay::from_path(&config.feed.candles_path)?;
        Self::with_replay(config, replay)
    }

    /// Create an application over an already loaded replay.
    pub fn with_replay(config: AppConfig, replay: CandleReplay) -> AppResult<Self> {
        config.validate()?;

        let pair: TradingPair = config.maker.trading_pair.clone();
        for asset in [pair.base(), pair.quote()] {
            if !config.paper.initial_balances.contains_key(asset) {
                warn!(asset, "No initial paper balance configured, starting at zero");
            }
        }

        let feed = CandleFeed::new(pair.clone(), config.candles.clone());
        let (fill_tx, fill_rx) = mpsc::unbounded_channel();
        let market = PaperMarket::new(pair, config.paper.clone(), fill_tx);
        let manager = QuoteManager::new(config.maker.clone())?;
        let recorder = TradeRecorder::new(
            config.maker.exchange.clone(),
            config.maker.trade_retention,
        );

        let writer = if config.persistence.enabled {
            Some(TradeWriter::new(
                &config.persistence.output_dir,
                config.persistence.max_buffer_size,
            )?)
        } else {
            None
        };

        info!(
            pair = %config.maker.trading_pair,
            candles = replay.remaining(),
            refresh_ms = config.maker.order_refresh_time_ms,
            persistence = config.persistence.enabled,
            "Application initialized"
        );

        Ok(Self {
            config,
            feed,
            replay,
            market,
            fill_rx,
            manager,
            timer: RefreshTimer::new(),
            recorder,
            writer,
            now_ms: 0,
            ticks: 0,
        })
    }

    /// Process the next candle.
    ///
    /// Candles the feed rejects are logged and skipped. Returns `None` once
    /// the replay is exhausted.
    pub fn step(&mut self) -> AppResult<Option<CycleReport>> {
        let candle = loop {
            let Some(candle) = self.replay.next_candle() else {
                return Ok(None);
            };
            match self.feed.push(candle.clone()) {
                Ok(_) => break candle,
                Err(e) => warn!(ts = candle.timestamp_ms, error = %e, "Dropping candle"),
            }
        };

        let interval = i64::try_from(self.config.feed.candle_interval_ms).unwrap_or(i64::MAX);
        let now_ms = candle.timestamp_ms.saturating_add(interval).max(self.now_ms);
        self.now_ms = now_ms;
        self.ticks += 1;
        Metrics::candle_consumed();

        // Resting quotes trade through this candle before the engine sees it.
        let fills = self.market.apply_candle(&candle, now_ms);
        if fills > 0 {
            debug!(fills, ts = candle.timestamp_ms, "Paper fills on candle");
        }
        self.record_fills()?;

        let report = {
            let candles = FeedCandles::new(&self.feed);
            self.manager
                .on_tick(now_ms, &mut self.timer, &mut self.market, &candles)
        };
        record_cycle_metrics(&report);

        let every = self.config.telemetry.status_every_ticks;
        if every > 0 && self.ticks % every == 0 {
            info!("Status:\n{}", self.status());
        }

        Ok(Some(report))
    }

    /// Drain the fill channel into the recorder, trade files and metrics.
    fn record_fills(&mut self) -> AppResult<usize> {
        let records = self.recorder.drain(&mut self.fill_rx, self.now_ms);
        let count = records.len();
        for record in records {
            Metrics::fill(
                record.side.as_str(),
                record.amount.inner().to_f64().unwrap_or_default(),
            );
            if let Some(writer) = self.writer.as_mut() {
                writer.add_record(record)?;
            }
        }
        if count > 0 {
            Metrics::realized_pnl(
                self.recorder
                    .stats()
                    .realized_pnl
                    .to_f64()
                    .unwrap_or_default(),
            );
        }
        Ok(count)
    }

    /// Plain-text status report.
    pub fn status(&self) -> String {
        let name = self.feed.name();
        format_status(
            self.manager.config(),
            &self.market,
            &self.feed.snapshot(),
            FeedLabel {
                name: &name,
                interval: self.feed.interval(),
                length: self.feed.config().length,
            },
            &self.recorder,
            self.now_ms,
        )
    }

    /// Run the replay loop until the replay ends or Ctrl-C.
    pub async fn run(&mut self) -> AppResult<()> {
        info!(
            tick_ms = self.config.feed.tick_interval_ms,
            candles = self.replay.remaining(),
            "Entering main event loop"
        );

        let mut tick_interval =
            tokio::time::interval(Duration::from_millis(self.config.feed.tick_interval_ms));
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut exhausted_logged = false;
        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    match self.step()? {
                        Some(report) => {
                            debug!(outcome = report.outcome.label(), "Tick processed");
                        }
                        None if self.config.feed.stop_when_exhausted => {
                            info!("Candle replay exhausted");
                            break;
                        }
                        None => {
                            if !exhausted_logged {
                                info!("Candle replay exhausted, holding quotes until shutdown");
                                exhausted_logged = true;
                            }
                        }
                    }
                }

                // Handle shutdown signal
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.shutdown()
    }

    /// Cancel resting quotes, flush history and write the final reports.
    pub fn shutdown(&mut self) -> AppResult<()> {
        info!(ticks = self.ticks, cycles = self.manager.cycles(), "Shutting down");

        let summary = self.manager.cancel_all(&mut self.market);
        Metrics::orders_cancelled(summary.cancelled.len() as u64);
        Metrics::cancellation_failures(summary.failures as u64);
        if summary.failures > 0 {
            warn!(failures = summary.failures, "Some orders could not be cancelled");
        }

        self.record_fills()?;

        if let Some(writer) = self.writer.as_mut() {
            writer.close()?;
            info!(records = writer.total_written(), "Trade history closed");
        }

        if let Some(path) = &self.config.telemetry.metrics_path {
            Metrics::write_snapshot(path)?;
            info!(path = %path.display(), "Metrics snapshot written");
        }

        info!("Final status:\n{}", self.status());
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn market(&self) -> &PaperMarket {
        &self.market
    }

    pub fn recorder(&self) -> &TradeRecorder {
        &self.recorder
    }

    pub fn manager(&self) -> &QuoteManager {
        &self.manager
    }

    pub fn feed(&self) -> &CandleFeed {
        &self.feed
    }

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Trade records written to disk so far.
    pub fn trades_written(&self) -> usize {
        self.writer.as_ref().map_or(0, TradeWriter::total_written)
    }
}

fn record_cycle_metrics(report: &CycleReport) {
    match &report.outcome {
        CycleOutcome::NotDue { .. } => return,
        CycleOutcome::Skipped(reason) => {
            Metrics::cycle_skipped(reason.as_str());
            return;
        }
        outcome => Metrics::cycle(outcome.label()),
    }

    Metrics::orders_cancelled(report.cancelled.len() as u64);
    Metrics::cancellation_failures(report.cancel_failures as u64);
    Metrics::orders_submitted(report.submitted.len() as u64);
    Metrics::placement_failures(report.submit_failures as u64);

    if let Some(decision) = &report.decision {
        let spreads = decision.spread.spreads;
        Metrics::spreads(
            spreads.bid.to_f64().unwrap_or_default(),
            spreads.ask.to_f64().unwrap_or_default(),
        );
        Metrics::inventory_ratio(decision.inventory.ratio.to_f64().unwrap_or_default());
        Metrics::reference_price(
            decision
                .reference_price
                .inner()
                .to_f64()
                .unwrap_or_default(),
        );
        if let Some(kind) = decision.reading.divergence.kind() {
            Metrics::divergence(&kind.to_string());
        }
        if let Some(rule) = decision.spread.skew {
            Metrics::skew_applied(rule);
        }
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("pair", &self.config.maker.trading_pair)
            .field("ticks", &self.ticks)
            .field("now_ms", &self.now_ms)
            .finish_non_exhaustive()
    }
}
