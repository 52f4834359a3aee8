//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(#[from] divmm_feed::FeedError),

    #[error("Maker error: {0}")]
    Maker(#[from] divmm_mm::MakerError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] divmm_telemetry::TelemetryError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] divmm_persistence::PersistenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
