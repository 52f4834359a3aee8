//! Order lifecycle values.
//!
//! - `OrderIntent`: a single-cycle proposal, consumed by the budget step and
//!   then by placement
//! - `OpenOrder`: an order resting at the market-access layer
//! - `FillEvent`: an execution reported back asynchronously

use serde::{Deserialize, Serialize};

use crate::order::{ClientOrderId, OrderSide, OrderType, TimeInForce};
use crate::{Price, Size, TradingPair};

/// Proposed order, not yet submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub pair: TradingPair,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub tif: TimeInForce,
    pub price: Price,
    pub amount: Size,
    /// Maker-only intent (must rest on the book).
    pub is_maker: bool,
}

impl OrderIntent {
    /// Post-only limit intent.
    #[must_use]
    pub fn maker_limit(pair: TradingPair, side: OrderSide, price: Price, amount: Size) -> Self {
        Self {
            pair,
            side,
            order_type: OrderType::Limit,
            tif: TimeInForce::AddLiquidityOnly,
            price,
            amount,
            is_maker: true,
        }
    }

    /// Copy of this intent with a reduced amount.
    #[must_use]
    pub fn with_amount(&self, amount: Size) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// Quote-asset value at the limit price.
    pub fn notional(&self) -> rust_decimal::Decimal {
        self.amount.notional(self.price)
    }
}

/// Order resting at the market-access layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub id: ClientOrderId,
    pub pair: TradingPair,
    pub side: OrderSide,
    pub price: Price,
    pub amount: Size,
    /// Creation timestamp (Unix milliseconds).
    pub created_at_ms: i64,
}

impl OpenOrder {
    pub fn from_intent(id: ClientOrderId, intent: &OrderIntent, created_at_ms: i64) -> Self {
        Self {
            id,
            pair: intent.pair.clone(),
            side: intent.side,
            price: intent.price,
            amount: intent.amount,
            created_at_ms,
        }
    }

    /// Age in seconds at `now_ms`.
    pub fn age_secs(&self, now_ms: i64) -> i64 {
        (now_ms - self.created_at_ms).max(0) / 1000
    }
}

/// Fill reported by the market-access layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    /// Execution time (Unix milliseconds).
    pub timestamp_ms: i64,
    pub order_id: ClientOrderId,
    pub pair: TradingPair,
    pub side: OrderSide,
    pub price: Price,
    pub amount: Size,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> TradingPair {
        TradingPair::new("ETH", "USDT")
    }

    #[test]
    fn test_maker_limit_is_post_only() {
        let intent = OrderIntent::maker_limit(
            pair(),
            OrderSide::Buy,
            Price::new(dec!(99.99)),
            Size::new(dec!(0.01)),
        );
        assert_eq!(intent.order_type, OrderType::Limit);
        assert_eq!(intent.tif, TimeInForce::AddLiquidityOnly);
        assert!(intent.is_maker);
        assert_eq!(intent.notional(), dec!(0.9999));
    }

    #[test]
    fn test_with_amount_keeps_price() {
        let intent = OrderIntent::maker_limit(
            pair(),
            OrderSide::Sell,
            Price::new(dec!(100.01)),
            Size::new(dec!(0.01)),
        );
        let shrunk = intent.with_amount(Size::new(dec!(0.005)));
        assert_eq!(shrunk.price, intent.price);
        assert_eq!(shrunk.amount, Size::new(dec!(0.005)));
    }

    #[test]
    fn test_open_order_age() {
        let intent = OrderIntent::maker_limit(
            pair(),
            OrderSide::Buy,
            Price::new(dec!(1)),
            Size::new(dec!(1)),
        );
        let order = OpenOrder::from_intent(ClientOrderId::from("a"), &intent, 1_000);
        assert_eq!(order.age_secs(11_500), 10);
        assert_eq!(order.age_secs(0), 0);
    }
}
