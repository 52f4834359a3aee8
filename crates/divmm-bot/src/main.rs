//! Divergence market maker - Entry Point
//!
//! Replays candles through the indicator feed and quotes a two-sided book
//! on the paper exchange.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Divergence market maker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via DIVMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the candle file to replay
    #[arg(long)]
    candles: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    divmm_telemetry::init_logging()?;

    info!("Starting divmm-bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > DIVMM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var_os("DIVMM_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config/default.toml"));

    info!(config_path = %config_path.display(), "Loading configuration");

    let mut config = divmm_bot::AppConfig::from_file(&config_path)?;
    if let Some(candles) = args.candles {
        config.feed.candles_path = candles;
    }
    config.validate()?;
    info!(
        pair = %config.maker.trading_pair,
        exchange = %config.maker.exchange,
        candles = %config.feed.candles_path.display(),
        "Configuration loaded"
    );

    let mut app = divmm_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
