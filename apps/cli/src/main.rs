//! mapslink CLI: add Google Maps links to a spreadsheet of place names.
//!
//! Reads a workbook, resolves one column of location names through the
//! Places API, and writes a copy with a `Google Maps URL` column appended.

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
