//! Quote lifecycle management.
//!
//! One refresh cycle, run when the timer is due:
//! 1. Read the signal, inventory and reference price (any failure skips
//!    the cycle without touching open orders or the timer)
//! 2. Compute spreads and build the two-sided proposal
//! 3. Cancel every open order on the pair
//! 4. Budget-clip the proposal (all-or-none by default)
//! 5. Submit the surviving intents, each independently
//! 6. Schedule the next refresh
//!
//! Cancellation runs before the budget check so the funds locked by the
//! previous quotes are available to the new ones.

use std::fmt;

use divmm_core::{ClientOrderId, OrderIntent, Price, Size};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::MakerConfig;
use crate::error::{MakerError, MakerResult};
use crate::inventory::InventorySnapshot;
use crate::market::{CandleProvider, MarketAccess};
use crate::quote_engine::build_proposal;
use crate::signal::SignalReading;
use crate::spread::{compute_spreads, SkewRules, SpreadDecision, SpreadPair};

/// Earliest time the next refresh may run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshTimer {
    next_allowed_ms: i64,
}

impl RefreshTimer {
    /// Due immediately.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_due(&self, now_ms: i64) -> bool {
        self.next_allowed_ms <= now_ms
    }

    /// Schedule the next refresh `interval_ms` after `now_ms`.
    pub fn advance(&mut self, now_ms: i64, interval_ms: u64) {
        let interval = i64::try_from(interval_ms).unwrap_or(i64::MAX);
        self.next_allowed_ms = now_ms.saturating_add(interval);
    }

    pub fn next_allowed_ms(&self) -> i64 {
        self.next_allowed_ms
    }
}

/// Manager state between and during cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Idle,
    Refreshing,
}

/// Why a due cycle did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MarketNotReady,
    InsufficientData { available: usize, required: usize },
    MarketData(String),
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketNotReady => "market_not_ready",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::MarketData(_) => "market_data",
        }
    }
}

impl From<MakerError> for SkipReason {
    fn from(e: MakerError) -> Self {
        match e {
            MakerError::InsufficientData {
                available,
                required,
            } => Self::InsufficientData {
                available,
                required,
            },
            other => Self::MarketData(other.to_string()),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarketNotReady => write!(f, "market not ready"),
            Self::InsufficientData {
                available,
                required,
            } => write!(f, "insufficient data ({available}/{required} candles)"),
            Self::MarketData(msg) => write!(f, "{msg}"),
        }
    }
}

/// Result of one `on_tick` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Timer not yet due.
    NotDue { next_allowed_ms: i64 },
    /// Due, but nothing was done.
    Skipped(SkipReason),
    /// Stale quotes cancelled; the proposal failed the budget check.
    BudgetRejected,
    /// Stale quotes cancelled and the proposal submitted.
    Quoted,
}

impl CycleOutcome {
    /// Metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotDue { .. } => "not_due",
            Self::Skipped(_) => "skipped",
            Self::BudgetRejected => "budget_rejected",
            Self::Quoted => "quoted",
        }
    }
}

/// Everything decided before touching the market.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDecision {
    pub reading: SignalReading,
    pub inventory: InventorySnapshot,
    pub reference_price: Price,
    pub spread: SpreadDecision,
    pub proposal: Vec<OrderIntent>,
}

/// What one `on_tick` call did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub decision: Option<QuoteDecision>,
    pub cancelled: Vec<ClientOrderId>,
    pub cancel_failures: usize,
    /// Intents that passed the budget check.
    pub funded: Vec<OrderIntent>,
    pub submitted: Vec<ClientOrderId>,
    pub submit_failures: usize,
}

impl CycleReport {
    fn new(outcome: CycleOutcome) -> Self {
        Self {
            outcome,
            decision: None,
            cancelled: Vec::new(),
            cancel_failures: 0,
            funded: Vec::new(),
            submitted: Vec::new(),
            submit_failures: 0,
        }
    }
}

/// Cancellation totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelSummary {
    pub cancelled: Vec<ClientOrderId>,
    /// Orders already gone when the cancel arrived.
    pub absent: usize,
    pub failures: usize,
}

/// Runs the refresh cycle for one trading pair.
#[derive(Debug)]
pub struct QuoteManager {
    config: MakerConfig,
    rules: SkewRules,
    state: LifecycleState,
    cycles: u64,
}

impl QuoteManager {
    pub fn new(config: MakerConfig) -> MakerResult<Self> {
        config.validate()?;
        let rules = SkewRules::from_config(&config);
        Ok(Self {
            config,
            rules,
            state: LifecycleState::Idle,
            cycles: 0,
        })
    }

    pub fn config(&self) -> &MakerConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Completed refresh cycles (quoted or budget-rejected).
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one tick.
    pub fn on_tick<M, C>(
        &mut self,
        now_ms: i64,
        timer: &mut RefreshTimer,
        market: &mut M,
        candles: &C,
    ) -> CycleReport
    where
        M: MarketAccess + ?Sized,
        C: CandleProvider + ?Sized,
    {
        if !timer.is_due(now_ms) {
            return CycleReport::new(CycleOutcome::NotDue {
                next_allowed_ms: timer.next_allowed_ms(),
            });
        }

        if !market.is_ready() {
            debug!("Market not ready, skipping refresh");
            return CycleReport::new(CycleOutcome::Skipped(SkipReason::MarketNotReady));
        }

        let decision = match self.decide(&*market, candles) {
            Ok(d) => d,
            Err(e) => {
                let reason = SkipReason::from(e);
                debug!(reason = %reason, "Skipping refresh");
                return CycleReport::new(CycleOutcome::Skipped(reason));
            }
        };

        self.state = LifecycleState::Refreshing;

        let cancel = self.cancel_all(market);

        let funded = market.clip_to_budget(decision.proposal.clone(), self.config.all_or_none);

        let mut report = CycleReport::new(CycleOutcome::Quoted);
        report.cancelled = cancel.cancelled;
        report.cancel_failures = cancel.failures;

        if funded.is_empty() {
            info!(
                pair = %self.config.trading_pair,
                "Proposal rejected by budget check, no orders placed"
            );
            report.outcome = CycleOutcome::BudgetRejected;
        } else {
            for intent in &funded {
                match market.submit_order(intent) {
                    Ok(id) => {
                        debug!(
                            id = %id,
                            side = %intent.side,
                            price = %intent.price,
                            amount = %intent.amount,
                            "Order submitted"
                        );
                        report.submitted.push(id);
                    }
                    Err(e) => {
                        warn!(
                            side = %intent.side,
                            price = %intent.price,
                            error = %e,
                            "Order placement failed"
                        );
                        report.submit_failures += 1;
                    }
                }
            }
        }

        timer.advance(now_ms, self.config.order_refresh_time_ms);
        self.state = LifecycleState::Idle;
        self.cycles += 1;

        report.funded = funded;
        report.decision = Some(decision);
        report
    }

    /// Steps that only read from the market.
    pub fn decide<M, C>(&self, market: &M, candles: &C) -> MakerResult<QuoteDecision>
    where
        M: MarketAccess + ?Sized,
        C: CandleProvider + ?Sized,
    {
        let pair = &self.config.trading_pair;

        let snapshot = candles.latest_candles(pair);
        let reading = SignalReading::from_snapshot(&snapshot)?;

        let inventory = InventorySnapshot::capture(market, pair)?;
        let reference_price = market.reference_price(pair, self.config.price_type)?;
        if !reference_price.is_positive() {
            return Err(MakerError::MarketData(format!(
                "non-positive {} price {reference_price}",
                self.config.price_type
            )));
        }

        let spread = compute_spreads(
            SpreadPair::new(self.config.bid_spread, self.config.ask_spread),
            reading.volatility,
            reading.divergence,
            inventory.ratio,
            &self.rules,
        )?;
        if spread.spreads.bid >= Decimal::ONE {
            return Err(MakerError::MarketData(format!(
                "bid spread {} leaves no positive buy price",
                spread.spreads.bid
            )));
        }

        if let Some(rule) = spread.skew {
            info!(
                rule,
                inventory_ratio = %inventory.ratio.round_dp(4),
                bid_spread = %spread.spreads.bid,
                ask_spread = %spread.spreads.ask,
                "Inventory skew applied"
            );
        }

        let proposal = build_proposal(
            pair,
            reference_price,
            spread.spreads,
            Size::new(self.config.order_amount),
        );

        debug!(
            bearish = reading.divergence.bearish,
            bullish = reading.divergence.bullish,
            rsi = reading.momentum,
            natr = reading.volatility,
            reference = %reference_price,
            bid = %proposal[0].price,
            ask = %proposal[1].price,
            "Proposal built"
        );

        Ok(QuoteDecision {
            reading,
            inventory,
            reference_price,
            spread,
            proposal,
        })
    }

    /// Cancel every open order on the configured pair.
    ///
    /// Orders that already filled or vanished count as absent, not failed.
    pub fn cancel_all<M>(&self, market: &mut M) -> CancelSummary
    where
        M: MarketAccess + ?Sized,
    {
        let pair = &self.config.trading_pair;
        let mut summary = CancelSummary::default();

        for order in market.open_orders(pair) {
            match market.cancel_order(pair, &order.id) {
                Ok(()) => summary.cancelled.push(order.id),
                Err(e) if e.is_absent_order() => {
                    debug!(id = %order.id, "Order already gone");
                    summary.absent += 1;
                }
                Err(e) => {
                    warn!(id = %order.id, error = %e, "Order cancellation failed");
                    summary.failures += 1;
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{MockCandleProvider, MockMarketAccess};
    use divmm_core::{
        Candle, CandleSnapshot, IndicatorCandle, OpenOrder, OrderSide, PriceType, TradingPair,
    };
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn pair() -> TradingPair {
        TradingPair::new("ETH", "USDT")
    }

    fn candle(ts: i64, close: Decimal, momentum: f64, volatility: f64) -> IndicatorCandle {
        let close = Price::new(close);
        IndicatorCandle::new(
            Candle {
                timestamp_ms: ts,
                open: close,
                high: close,
                low: close,
                close,
                volume: Size::ZERO,
            },
            momentum,
            volatility,
        )
    }

    fn candles(snapshot: CandleSnapshot) -> MockCandleProvider {
        let mut provider = MockCandleProvider::new();
        provider
            .expect_latest_candles()
            .returning(move |_| snapshot.clone());
        provider
    }

    fn flat_candles() -> MockCandleProvider {
        candles(CandleSnapshot::new(vec![
            candle(0, dec!(100), 50.0, 0.0),
            candle(60_000, dec!(100), 50.0, 0.0),
        ]))
    }

    /// Ready market at mid 100 with the given balances.
    fn market(base: Decimal, quote: Decimal) -> MockMarketAccess {
        let mut m = MockMarketAccess::new();
        m.expect_is_ready().return_const(true);
        m.expect_reference_price()
            .returning(|_, _| Ok(Price::new(dec!(100))));
        m.expect_balance().returning(move |asset| match asset {
            "ETH" => base,
            _ => quote,
        });
        m
    }

    fn open_order(id: &str) -> OpenOrder {
        OpenOrder {
            id: ClientOrderId::from(id),
            pair: pair(),
            side: OrderSide::Buy,
            price: Price::new(dec!(99)),
            amount: Size::new(dec!(0.01)),
            created_at_ms: 0,
        }
    }

    fn manager() -> QuoteManager {
        QuoteManager::new(MakerConfig::default()).unwrap()
    }

    #[test]
    fn test_not_due_does_nothing() {
        let mut m = MockMarketAccess::new();
        let provider = MockCandleProvider::new();
        let mut timer = RefreshTimer::new();
        timer.advance(0, 10_000);

        let report = manager().on_tick(5_000, &mut timer, &mut m, &provider);
        assert_eq!(
            report.outcome,
            CycleOutcome::NotDue {
                next_allowed_ms: 10_000
            }
        );
    }

    #[test]
    fn test_quoted_cycle() {
        let mut m = market(dec!(1), dec!(100));
        m.expect_open_orders()
            .returning(|_| vec![open_order("old")]);
        m.expect_cancel_order()
            .with(eq(pair()), eq(ClientOrderId::from("old")))
            .times(1)
            .returning(|_, _| Ok(()));
        m.expect_clip_to_budget()
            .withf(|intents, all_or_none| intents.len() == 2 && *all_or_none)
            .returning(|intents, _| intents);
        m.expect_submit_order()
            .times(2)
            .returning(|intent| Ok(ClientOrderId::from(intent.side.as_str())));

        let mut timer = RefreshTimer::new();
        let mut mgr = manager();
        let report = mgr.on_tick(1_000, &mut timer, &mut m, &flat_candles());

        assert_eq!(report.outcome, CycleOutcome::Quoted);
        assert_eq!(report.cancelled, vec![ClientOrderId::from("old")]);
        assert_eq!(report.submitted.len(), 2);
        assert_eq!(report.funded[0].price, Price::new(dec!(99.99)));
        assert_eq!(report.funded[1].price, Price::new(dec!(100.01)));
        assert_eq!(timer.next_allowed_ms(), 11_000);
        assert_eq!(mgr.state(), LifecycleState::Idle);
        assert_eq!(mgr.cycles(), 1);

        let decision = report.decision.unwrap();
        assert_eq!(decision.inventory.ratio, dec!(0.5));
        assert_eq!(decision.spread.skew, None);
    }

    #[test]
    fn test_volatility_pushing_bid_spread_past_one_skips() {
        let mut m = market(dec!(1), dec!(100));
        m.expect_open_orders().never();
        m.expect_cancel_order().never();
        m.expect_clip_to_budget().never();
        m.expect_submit_order().never();
        // NATR 100 doubles the 0.6 base bid spread to 1.2.
        let provider = candles(CandleSnapshot::new(vec![
            candle(0, dec!(100), 50.0, 100.0),
            candle(60_000, dec!(100), 50.0, 100.0),
        ]));
        let config = MakerConfig {
            bid_spread: dec!(0.6),
            ..MakerConfig::default()
        };
        let mut mgr = QuoteManager::new(config).unwrap();
        let mut timer = RefreshTimer::new();

        let report = mgr.on_tick(1_000, &mut timer, &mut m, &provider);
        assert!(matches!(
            report.outcome,
            CycleOutcome::Skipped(SkipReason::MarketData(_))
        ));
        assert!(report.decision.is_none());
        assert!(timer.is_due(1_000));
        assert_eq!(mgr.cycles(), 0);
    }

    #[test]
    fn test_insufficient_data_skips_without_side_effects() {
        let mut m = MockMarketAccess::new();
        m.expect_is_ready().return_const(true);
        m.expect_cancel_order().never();
        m.expect_submit_order().never();
        m.expect_open_orders().never();

        let provider = candles(CandleSnapshot::new(vec![candle(0, dec!(100), 50.0, 1.0)]));
        let mut timer = RefreshTimer::new();
        let report = manager().on_tick(1_000, &mut timer, &mut m, &provider);

        assert!(matches!(
            report.outcome,
            CycleOutcome::Skipped(SkipReason::InsufficientData {
                available: 1,
                required: 2
            })
        ));
        assert_eq!(timer.next_allowed_ms(), 0);
        assert!(timer.is_due(1_001));
    }

    #[test]
    fn test_market_not_ready_skips() {
        let mut m = MockMarketAccess::new();
        m.expect_is_ready().return_const(false);
        let provider = MockCandleProvider::new();
        let mut timer = RefreshTimer::new();

        let report = manager().on_tick(1_000, &mut timer, &mut m, &provider);
        assert_eq!(report.outcome, CycleOutcome::Skipped(SkipReason::MarketNotReady));
        assert_eq!(timer.next_allowed_ms(), 0);
    }

    #[test]
    fn test_missing_price_skips() {
        let mut m = MockMarketAccess::new();
        m.expect_is_ready().return_const(true);
        m.expect_reference_price()
            .returning(|_, _| Err(MakerError::MarketData("empty book".to_string())));
        m.expect_balance().return_const(Decimal::ONE);
        m.expect_cancel_order().never();

        let mut timer = RefreshTimer::new();
        let report = manager().on_tick(1_000, &mut timer, &mut m, &flat_candles());
        assert!(matches!(
            report.outcome,
            CycleOutcome::Skipped(SkipReason::MarketData(_))
        ));
        assert!(timer.is_due(1_000));
    }

    #[test]
    fn test_budget_rejection_cancels_but_places_nothing() {
        let mut m = market(dec!(1), dec!(100));
        m.expect_open_orders()
            .returning(|_| vec![open_order("a"), open_order("b")]);
        m.expect_cancel_order().times(2).returning(|_, _| Ok(()));
        m.expect_clip_to_budget().returning(|_, _| Vec::new());
        m.expect_submit_order().never();

        let mut timer = RefreshTimer::new();
        let report = manager().on_tick(1_000, &mut timer, &mut m, &flat_candles());

        assert_eq!(report.outcome, CycleOutcome::BudgetRejected);
        assert_eq!(report.cancelled.len(), 2);
        assert!(report.submitted.is_empty());
        assert_eq!(timer.next_allowed_ms(), 11_000);
    }

    #[test]
    fn test_absent_order_is_not_a_failure() {
        let mut m = market(dec!(1), dec!(100));
        m.expect_open_orders()
            .returning(|_| vec![open_order("gone"), open_order("stuck")]);
        m.expect_cancel_order().returning(|_, id| {
            if id.as_str() == "gone" {
                Err(MakerError::OrderNotFound(id.clone()))
            } else {
                Err(MakerError::CancellationFailure("timeout".to_string()))
            }
        });

        let summary = manager().cancel_all(&mut m);
        assert!(summary.cancelled.is_empty());
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.failures, 1);
    }

    #[test]
    fn test_one_failed_leg_does_not_block_the_other() {
        let mut m = market(dec!(1), dec!(100));
        m.expect_open_orders().returning(|_| Vec::new());
        m.expect_clip_to_budget().returning(|intents, _| intents);
        m.expect_submit_order().times(2).returning(|intent| {
            if intent.side == OrderSide::Buy {
                Err(MakerError::PlacementFailure("rejected".to_string()))
            } else {
                Ok(ClientOrderId::from("ask"))
            }
        });

        let mut timer = RefreshTimer::new();
        let report = manager().on_tick(0, &mut timer, &mut m, &flat_candles());
        assert_eq!(report.outcome, CycleOutcome::Quoted);
        assert_eq!(report.submitted, vec![ClientOrderId::from("ask")]);
        assert_eq!(report.submit_failures, 1);
    }

    #[test]
    fn test_bearish_long_inventory_tightens_ask() {
        // 4 ETH at 100 + 100 USDT -> ratio 0.8
        let m = market(dec!(4), dec!(100));
        let provider = candles(CandleSnapshot::new(vec![
            candle(0, dec!(100), 60.0, 0.0),
            candle(60_000, dec!(101), 55.0, 0.0),
        ]));

        let decision = manager().decide(&m, &provider).unwrap();
        assert!(decision.reading.divergence.bearish);
        assert_eq!(decision.inventory.ratio, dec!(0.8));
        assert_eq!(decision.spread.skew, Some("high_inventory_bearish"));
        assert_eq!(decision.proposal[1].price, Price::new(dec!(100.009)));
        assert_eq!(decision.proposal[0].price, Price::new(dec!(99.99)));
    }

    #[test]
    fn test_price_type_selects_reference() {
        let mut m = MockMarketAccess::new();
        m.expect_balance().return_const(Decimal::ONE);
        m.expect_reference_price()
            .withf(|_, t| *t == PriceType::Mid)
            .returning(|_, _| Ok(Price::new(dec!(100))));
        m.expect_reference_price()
            .withf(|_, t| *t == PriceType::LastTrade)
            .returning(|_, _| Ok(Price::new(dec!(200))));

        let mgr = QuoteManager::new(MakerConfig {
            price_type: PriceType::LastTrade,
            ..Default::default()
        })
        .unwrap();
        let decision = mgr.decide(&m, &flat_candles()).unwrap();
        assert_eq!(decision.reference_price, Price::new(dec!(200)));
        // Inventory still valued at mid.
        assert_eq!(decision.inventory.mid, Price::new(dec!(100)));
        assert_eq!(decision.proposal[0].price, Price::new(dec!(199.98)));
    }

    #[test]
    fn test_volatility_widens_quotes() {
        let m = market(dec!(1), dec!(100));
        let provider = candles(CandleSnapshot::new(vec![
            candle(0, dec!(100), 50.0, 100.0),
            candle(60_000, dec!(100), 50.0, 100.0),
        ]));
        let decision = manager().decide(&m, &provider).unwrap();
        assert_eq!(decision.proposal[0].price, Price::new(dec!(99.98)));
        assert_eq!(decision.proposal[1].price, Price::new(dec!(100.02)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MakerConfig {
            order_refresh_time_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            QuoteManager::new(config),
            Err(MakerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_timer() {
        let mut timer = RefreshTimer::new();
        assert!(timer.is_due(0));
        timer.advance(1_000, 10_000);
        assert!(!timer.is_due(10_999));
        assert!(timer.is_due(11_000));
        timer.advance(i64::MAX - 1, u64::MAX);
        assert_eq!(timer.next_allowed_ms(), i64::MAX);
    }
}
