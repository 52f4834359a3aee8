//! Paper trading exchange.
//!
//! A single-pair simulated venue implementing `MarketAccess`:
//! - Top-of-book derived from a mid price and a configured half-spread
//! - Post-only limit orders that are rejected if they would cross
//! - Funds reserved for open orders, released on cancel, settled on fill
//! - All-or-none budget clipping against available balances
//! - Fills reported on an unbounded channel
//!
//! # Fill Rule
//!
//! A resting buy fills when the best ask trades down to its price; a
//! resting sell fills when the best bid trades up to its price. Fills
//! execute at the order's limit price.

pub mod balances;
pub mod book;
pub mod config;
pub mod error;
pub mod market;

pub use balances::Balances;
pub use book::BookTop;
pub use config::PaperConfig;
pub use error::{PaperError, PaperResult};
pub use market::PaperMarket;
