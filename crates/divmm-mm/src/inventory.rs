//! Inventory valuation.
//!
//! The ratio is the share of total portfolio value held in the base asset,
//! valued at mid price:
//!
//! ```text
//! ratio = base × mid / (base × mid + quote)
//! ```
//!
//! An empty portfolio is neutral (0.5).

use divmm_core::{Price, PriceType, TradingPair};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::MakerResult;
use crate::market::MarketAccess;

pub const NEUTRAL_INVENTORY_RATIO: Decimal = dec!(0.5);

/// Base-asset share of total value, in `[0, 1]` for non-negative balances.
pub fn inventory_ratio(base_balance: Decimal, quote_balance: Decimal, mid: Price) -> Decimal {
    let base_value = base_balance * mid.inner();
    let total_value = base_value + quote_balance;
    if total_value <= Decimal::ZERO {
        return NEUTRAL_INVENTORY_RATIO;
    }
    base_value / total_value
}

/// Balances and valuation captured for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub base_balance: Decimal,
    pub quote_balance: Decimal,
    pub mid: Price,
    pub base_value: Decimal,
    pub total_value: Decimal,
    pub ratio: Decimal,
}

impl InventorySnapshot {
    /// Read total balances and mid price from `market`.
    pub fn capture<M: MarketAccess + ?Sized>(
        market: &M,
        pair: &TradingPair,
    ) -> MakerResult<Self> {
        let mid = market.reference_price(pair, PriceType::Mid)?;
        let base_balance = market.balance(pair.base());
        let quote_balance = market.balance(pair.quote());
        Ok(Self::new(base_balance, quote_balance, mid))
    }

    pub fn new(base_balance: Decimal, quote_balance: Decimal, mid: Price) -> Self {
        let base_value = base_balance * mid.inner();
        Self {
            base_balance,
            quote_balance,
            mid,
            base_value,
            total_value: base_value + quote_balance,
            ratio: inventory_ratio(base_balance, quote_balance, mid),
        }
    }
}
