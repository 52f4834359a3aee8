//! Divergence market maker.
//!
//! Main application that orchestrates all components:
//! - Candle replay into the indicator feed
//! - Paper exchange driven by each candle's price path
//! - Refresh cycles through the quote manager
//! - Fill recording, trade history files and metrics

pub mod app;
pub mod config;
pub mod error;
pub mod provider;

pub use app::Application;
pub use config::{AppConfig, FeedConfig};
pub use error::{AppError, AppResult};
pub use provider::FeedCandles;
