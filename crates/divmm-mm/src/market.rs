//! Boundaries to the exchange and the candle feed.
//!
//! The engine reads prices and balances and places orders only through
//! `MarketAccess`; it reads candles only through `CandleProvider`. Both are
//! synchronous: a paper exchange answers immediately, and a live connector
//! is expected to serve cached state.

use divmm_core::{
    CandleSnapshot, ClientOrderId, OpenOrder, OrderIntent, Price, PriceType, TradingPair,
};
use rust_decimal::Decimal;

use crate::error::MakerResult;

/// Exchange connectivity used by the lifecycle manager.
#[cfg_attr(test, mockall::automock)]
pub trait MarketAccess {
    /// Connector is connected and has balances and an order book.
    fn is_ready(&self) -> bool;

    /// Reference price of the requested kind.
    fn reference_price(&self, pair: &TradingPair, price_type: PriceType) -> MakerResult<Price>;

    /// Total balance of `asset`, including amounts locked by open orders.
    fn balance(&self, asset: &str) -> Decimal;

    /// Balance of `asset` not locked by open orders.
    fn available_balance(&self, asset: &str) -> Decimal;

    /// Fit `intents` to available funds.
    ///
    /// With `all_or_none`, any intent that cannot be fully funded empties the
    /// whole result.
    fn clip_to_budget(&self, intents: Vec<OrderIntent>, all_or_none: bool) -> Vec<OrderIntent>;

    fn submit_order(&mut self, intent: &OrderIntent) -> MakerResult<ClientOrderId>;

    /// Returns `MakerError::OrderNotFound` for unknown or already filled ids.
    fn cancel_order(&mut self, pair: &TradingPair, id: &ClientOrderId) -> MakerResult<()>;

    fn open_orders(&self, pair: &TradingPair) -> Vec<OpenOrder>;
}

/// Candle buffer with indicators attached.
#[cfg_attr(test, mockall::automock)]
pub trait CandleProvider {
    fn latest_candles(&self, pair: &TradingPair) -> CandleSnapshot;
}
