//! Market making error types.
//!
//! Every variant is cycle-local: the lifecycle manager logs it and the next
//! scheduled refresh retries.

use divmm_core::ClientOrderId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MakerError {
    #[error("Insufficient candle data: {available} samples, need {required}")]
    InsufficientData { available: usize, required: usize },

    #[error("Market data unavailable: {0}")]
    MarketData(String),

    #[error("Order placement failed: {0}")]
    PlacementFailure(String),

    #[error("Order cancellation failed: {0}")]
    CancellationFailure(String),

    #[error("Order not found: {0}")]
    OrderNotFound(ClientOrderId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MakerError {
    /// Cancelling an order that already filled or never existed is a no-op.
    pub fn is_absent_order(&self) -> bool {
        matches!(self, Self::OrderNotFound(_))
    }
}

pub type MakerResult<T> = Result<T, MakerError>;
