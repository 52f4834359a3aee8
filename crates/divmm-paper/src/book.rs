//! Simulated top of book.

use divmm_core::{Price, PriceType};
use rust_decimal::Decimal;

use crate::error::{PaperError, PaperResult};

/// Best bid, best ask and last trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookTop {
    pub best_bid: Price,
    pub best_ask: Price,
    pub last_trade: Option<Price>,
}

impl BookTop {
    /// Book centred on `mid` with `half_spread` on each side.
    pub fn around(mid: Price, half_spread: Decimal) -> Self {
        Self {
            best_bid: mid.below(half_spread),
            best_ask: mid.above(half_spread),
            last_trade: None,
        }
    }

    pub fn mid(&self) -> Price {
        Price::new((self.best_bid.inner() + self.best_ask.inner()) / Decimal::TWO)
    }

    pub fn price(&self, price_type: PriceType) -> PaperResult<Price> {
        match price_type {
            PriceType::Mid => Ok(self.mid()),
            PriceType::BestBid => Ok(self.best_bid),
            PriceType::BestAsk => Ok(self.best_ask),
            PriceType::LastTrade => self.last_trade.ok_or(PaperError::NoPrice(price_type)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_book_around_mid() {
        let book = BookTop::around(Price::new(dec!(100)), dec!(0.001));
        assert_eq!(book.best_bid, Price::new(dec!(99.9)));
        assert_eq!(book.best_ask, Price::new(dec!(100.1)));
        assert_eq!(book.mid(), Price::new(dec!(100)));
    }

    #[test]
    fn test_price_types() {
        let mut book = BookTop::around(Price::new(dec!(100)), dec!(0.001));
        assert_eq!(book.price(PriceType::BestBid).unwrap(), Price::new(dec!(99.9)));
        assert_eq!(book.price(PriceType::BestAsk).unwrap(), Price::new(dec!(100.1)));
        assert!(matches!(
            book.price(PriceType::LastTrade),
            Err(PaperError::NoPrice(PriceType::LastTrade))
        ));
        book.last_trade = Some(Price::new(dec!(100.05)));
        assert_eq!(book.price(PriceType::LastTrade).unwrap(), Price::new(dec!(100.05)));
    }
}
