//! Spread computation: volatility widening, then inventory skew.
//!
//! ```text
//! multiplier = 1 + natr / 100
//! bid = bid_spread × multiplier
//! ask = ask_spread × multiplier
//! first matching SkewRule scales one side by its discount
//! ```
//!
//! Skew only ever narrows a spread; it never widens one.

use divmm_core::OrderSide;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::config::MakerConfig;
use crate::error::{MakerError, MakerResult};
use crate::signal::{Divergence, DivergenceKind};

/// Bid and ask spreads as fractions of the reference price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadPair {
    pub bid: Decimal,
    pub ask: Decimal,
}

impl SpreadPair {
    pub fn new(bid: Decimal, ask: Decimal) -> Self {
        Self { bid, ask }
    }
}

/// When a skew rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkewCondition {
    /// Inventory ratio strictly above the threshold with the given divergence.
    InventoryAbove {
        threshold: Decimal,
        divergence: DivergenceKind,
    },
    /// Inventory ratio strictly below the threshold with the given divergence.
    InventoryBelow {
        threshold: Decimal,
        divergence: DivergenceKind,
    },
}

impl SkewCondition {
    pub fn matches(&self, inventory_ratio: Decimal, divergence: Divergence) -> bool {
        match *self {
            Self::InventoryAbove {
                threshold,
                divergence: kind,
            } => inventory_ratio > threshold && divergence.is(kind),
            Self::InventoryBelow {
                threshold,
                divergence: kind,
            } => inventory_ratio < threshold && divergence.is(kind),
        }
    }
}

/// What a matching skew rule does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkewEffect {
    /// Multiply one side's spread by `discount` (at most 1).
    Tighten { side: OrderSide, discount: Decimal },
}

impl SkewEffect {
    pub fn apply(&self, spreads: SpreadPair) -> SpreadPair {
        match *self {
            Self::Tighten { side, discount } => {
                let discount = discount.min(Decimal::ONE);
                match side {
                    OrderSide::Buy => SpreadPair::new(spreads.bid * discount, spreads.ask),
                    OrderSide::Sell => SpreadPair::new(spreads.bid, spreads.ask * discount),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkewRule {
    pub name: &'static str,
    pub condition: SkewCondition,
    pub effect: SkewEffect,
}

/// Ordered skew rules. The first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkewRules {
    rules: Vec<SkewRule>,
}

impl SkewRules {
    pub fn new(rules: Vec<SkewRule>) -> Self {
        Self { rules }
    }

    /// Long inventory with bearish divergence tightens the ask; short
    /// inventory with bullish divergence tightens the bid.
    pub fn from_config(config: &MakerConfig) -> Self {
        Self::new(vec![
            SkewRule {
                name: "high_inventory_bearish",
                condition: SkewCondition::InventoryAbove {
                    threshold: config.high_inventory_threshold,
                    divergence: DivergenceKind::Bearish,
                },
                effect: SkewEffect::Tighten {
                    side: OrderSide::Sell,
                    discount: config.skew_discount,
                },
            },
            SkewRule {
                name: "low_inventory_bullish",
                condition: SkewCondition::InventoryBelow {
                    threshold: config.low_inventory_threshold,
                    divergence: DivergenceKind::Bullish,
                },
                effect: SkewEffect::Tighten {
                    side: OrderSide::Buy,
                    discount: config.skew_discount,
                },
            },
        ])
    }

    pub fn first_match(&self, inventory_ratio: Decimal, divergence: Divergence) -> Option<&SkewRule> {
        self.rules
            .iter()
            .find(|rule| rule.condition.matches(inventory_ratio, divergence))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Spread result with the skew rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadDecision {
    pub spreads: SpreadPair,
    /// Before skew.
    pub adjusted: SpreadPair,
    pub multiplier: Decimal,
    pub skew: Option<&'static str>,
}

/// `1 + natr / 100`. Negative readings are treated as zero volatility.
pub fn volatility_multiplier(volatility: f64) -> MakerResult<Decimal> {
    if !volatility.is_finite() {
        return Err(MakerError::MarketData(format!(
            "non-finite volatility {volatility}"
        )));
    }
    let natr = Decimal::from_f64(volatility.max(0.0)).ok_or_else(|| {
        MakerError::MarketData(format!("volatility {volatility} out of decimal range"))
    })?;
    Ok(Decimal::ONE + natr / Decimal::ONE_HUNDRED)
}

/// Full spread computation for one cycle.
pub fn compute_spreads(
    base: SpreadPair,
    volatility: f64,
    divergence: Divergence,
    inventory_ratio: Decimal,
    rules: &SkewRules,
) -> MakerResult<SpreadDecision> {
    let multiplier = volatility_multiplier(volatility)?;
    let adjusted = SpreadPair::new(base.bid * multiplier, base.ask * multiplier);

    let rule = rules.first_match(inventory_ratio, divergence);
    let spreads = match rule {
        Some(rule) => rule.effect.apply(adjusted),
        None => adjusted,
    };

    Ok(SpreadDecision {
        spreads,
        adjusted,
        multiplier,
        skew: rule.map(|r| r.name),
    })
}
