//! Asset balances with reservations for open orders.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{PaperError, PaperResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Holding {
    total: Decimal,
    locked: Decimal,
}

/// Per-asset totals and locked amounts.
#[derive(Debug, Clone, Default)]
pub struct Balances {
    holdings: BTreeMap<String, Holding>,
}

impl Balances {
    pub fn new(initial: &BTreeMap<String, Decimal>) -> Self {
        Self {
            holdings: initial
                .iter()
                .map(|(asset, &total)| {
                    (
                        asset.clone(),
                        Holding {
                            total,
                            locked: Decimal::ZERO,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn total(&self, asset: &str) -> Decimal {
        self.holdings
            .get(asset)
            .map(|h| h.total)
            .unwrap_or(Decimal::ZERO)
    }

    /// Total minus locked.
    pub fn available(&self, asset: &str) -> Decimal {
        self.holdings
            .get(asset)
            .map(|h| h.total - h.locked)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn locked(&self, asset: &str) -> Decimal {
        self.holdings
            .get(asset)
            .map(|h| h.locked)
            .unwrap_or(Decimal::ZERO)
    }

    /// Reserve `amount` for an open order.
    pub fn lock(&mut self, asset: &str, amount: Decimal) -> PaperResult<()> {
        let available = self.available(asset);
        if amount > available {
            return Err(PaperError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount,
                available,
            });
        }
        self.holdings.entry(asset.to_string()).or_default().locked += amount;
        Ok(())
    }

    /// Release a reservation.
    pub fn unlock(&mut self, asset: &str, amount: Decimal) {
        if let Some(h) = self.holdings.get_mut(asset) {
            h.locked = (h.locked - amount).max(Decimal::ZERO);
        }
    }

    /// Consume a reservation of `paid` in `pay_asset` and credit `received`
    /// in `receive_asset`.
    pub fn settle(&mut self, pay_asset: &str, paid: Decimal, receive_asset: &str, received: Decimal) {
        let pay = self.holdings.entry(pay_asset.to_string()).or_default();
        pay.locked = (pay.locked - paid).max(Decimal::ZERO);
        pay.total -= paid;
        self.holdings
            .entry(receive_asset.to_string())
            .or_default()
            .total += received;
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.holdings.keys().map(String::as_str)
    }
}
