//! Trade history persistence for the divergence market maker.
//!
//! Appends every recorded fill to a daily JSON Lines file for
//! post-analysis.

pub mod config;
pub mod error;
pub mod writer;

pub use config::PersistenceConfig;
pub use error::{PersistenceError, PersistenceResult};
pub use writer::TradeWriter;
