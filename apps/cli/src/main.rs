//! relchron CLI — release chronology catalogs and milestone resolution.
//!
//! Builds time-windowed version catalogs from upstream release feeds and
//! fills in the earliest plausible shipping version for recorded feature
//! milestones.

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
