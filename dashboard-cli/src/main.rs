//! Binary crate for the `weather-dash` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Drawing the dashboard as text
//! - Hosting the weather proxy

use clap::Parser;
use dashboard_core::Config;

mod cli;
mod logging;
mod view;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    let config = Config::load()?;
    logging::init(&config.log_level);
    cmd.run(config).await
}
