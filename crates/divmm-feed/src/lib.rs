//! Candle feed for the divergence market maker.
//!
//! Turns raw OHLCV candles into the indicator view the quoting engine reads:
//! every stored candle carries an RSI value (momentum) and a NATR value
//! (volatility, percent). Candles are appended in time order and the buffer
//! keeps at most `max_records` of them.
//!
//! Candles reach the feed from a `CandleReplay` (JSON Lines file) in paper
//! mode.

pub mod candle_feed;
pub mod config;
pub mod error;
pub mod indicators;
pub mod parser;
pub mod source;

pub use candle_feed::CandleFeed;
pub use config::CandlesConfig;
pub use error::{FeedError, FeedResult};
pub use indicators::{NatrIndicator, RsiIndicator};
pub use parser::parse_candle_line;
pub use source::CandleReplay;
