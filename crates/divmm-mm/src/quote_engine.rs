//! Proposal construction.
//!
//! One maker-only limit order per side around the reference price:
//! - buy at `ref × (1 - bid_spread)`
//! - sell at `ref × (1 + ask_spread)`

use divmm_core::{OrderIntent, OrderSide, Price, Size, TradingPair};

use crate::spread::SpreadPair;

/// Build the two-sided proposal, buy first.
///
/// # Arguments
/// * `reference` - Reference price chosen by `price_type`
/// * `spreads` - Final spreads after volatility and skew
/// * `amount` - Base-asset amount for each side
pub fn build_proposal(
    pair: &TradingPair,
    reference: Price,
    spreads: SpreadPair,
    amount: Size,
) -> Vec<OrderIntent> {
    vec![
        OrderIntent::maker_limit(
            pair.clone(),
            OrderSide::Buy,
            reference.below(spreads.bid),
            amount,
        ),
        OrderIntent::maker_limit(
            pair.clone(),
            OrderSide::Sell,
            reference.above(spreads.ask),
            amount,
        ),
    ]
}
