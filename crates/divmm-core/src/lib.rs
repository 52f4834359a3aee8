//! Core domain types for the divergence market maker.
//!
//! This crate provides the types shared by every other crate:
//! - `Price`, `Size`: precision-safe numeric types
//! - `TradingPair`: `BASE-QUOTE` pair identifier
//! - `Candle`, `IndicatorCandle`, `CandleSnapshot`: market data views
//! - `OrderIntent`, `OpenOrder`, `FillEvent`: order lifecycle values
//! - `OrderSide`, `OrderType`, `TimeInForce`, `PriceType`: trading enums

pub mod candle;
pub mod decimal;
pub mod error;
pub mod intent;
pub mod order;
pub mod pair;

pub use candle::{Candle, CandleSnapshot, IndicatorCandle};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use intent::{FillEvent, OpenOrder, OrderIntent};
pub use order::{ClientOrderId, OrderSide, OrderType, PriceType, TimeInForce};
pub use pair::TradingPair;
