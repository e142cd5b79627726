//! Binary crate for the `weather-dash` terminal dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive dashboard loop
//! - Human-friendly panel rendering

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod view;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
