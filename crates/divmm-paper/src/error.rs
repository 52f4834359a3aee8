//! Paper exchange error types.

use divmm_core::{ClientOrderId, OrderSide, Price, PriceType};
use divmm_mm::MakerError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaperError {
    #[error("Order book not initialised")]
    NotReady,

    #[error("No {0} price available")]
    NoPrice(PriceType),

    #[error("Order not found: {0}")]
    OrderNotFound(ClientOrderId),

    #[error("Post-only {side} at {price} would cross best {best}")]
    WouldCross {
        side: OrderSide,
        price: Price,
        best: Price,
    },

    #[error("Insufficient {asset}: need {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

pub type PaperResult<T> = Result<T, PaperError>;

impl From<PaperError> for MakerError {
    fn from(e: PaperError) -> Self {
        match e {
            PaperError::OrderNotFound(id) => MakerError::OrderNotFound(id),
            PaperError::NotReady | PaperError::NoPrice(_) => MakerError::MarketData(e.to_string()),
            PaperError::WouldCross { .. }
            | PaperError::InsufficientBalance { .. }
            | PaperError::InvalidOrder(_) => MakerError::PlacementFailure(e.to_string()),
        }
    }
}
