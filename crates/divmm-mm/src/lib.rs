//! Market making engine for the divergence market maker.
//!
//! Decides, once per refresh interval, whether and where to quote a
//! two-sided post-only market:
//! - Divergence between RSI and price over the last two candles
//! - Spreads widened by NATR volatility
//! - Inventory skew that tightens one side when inventory is lopsided
//!   and divergence points the same way
//! - Proposal lifecycle: propose, cancel stale quotes, budget-clip, place
//! - Fill history for reporting
//!
//! # Architecture
//!
//! ```text
//! tick(now) → QuoteManager.on_tick()
//!              ├─ RefreshTimer: due?
//!              ├─ signal: Divergence from CandleSnapshot
//!              ├─ inventory: base value / total value
//!              ├─ spread: base × (1 + natr/100), then SkewRules
//!              ├─ quote_engine: buy/sell OrderIntents
//!              └─ MarketAccess: cancel_order / clip_to_budget / submit_order
//!                   ↓
//! FillEvent channel → TradeRecorder.drain()
//! ```

pub mod config;
pub mod error;
pub mod inventory;
pub mod market;
pub mod quote_engine;
pub mod quote_manager;
pub mod recorder;
pub mod signal;
pub mod spread;
pub mod status;

pub use config::MakerConfig;
pub use error::{MakerError, MakerResult};
pub use inventory::{inventory_ratio, InventorySnapshot, NEUTRAL_INVENTORY_RATIO};
pub use market::{CandleProvider, MarketAccess};
pub use quote_engine::build_proposal;
pub use quote_manager::{
    CycleOutcome, CycleReport, LifecycleState, QuoteDecision, QuoteManager, RefreshTimer,
    SkipReason,
};
pub use recorder::{TradeRecord, TradeRecorder, TradeRetention, TradeStats};
pub use signal::{Divergence, DivergenceKind, SignalReading};
pub use spread::{
    compute_spreads, SkewCondition, SkewEffect, SkewRule, SkewRules, SpreadDecision, SpreadPair,
};
pub use status::{format_status, FeedLabel};
