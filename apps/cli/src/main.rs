//! CivicWatch CLI — municipal tender tracking for Nanded.
//!
//! Scrapes the corporation's departmental tender listings into a
//! deduplicated local snapshot and manages citizen photo reports.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
