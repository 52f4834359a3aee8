//! Prometheus metrics and structured logging for the divergence market maker.
//!
//! - Prometheus metrics for refresh cycles, orders, fills, spreads, inventory
//! - Structured JSON logging with tracing in production, pretty otherwise
//! - Text exposition snapshot written to disk

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
