//! terrapin - control plane for a reverse-tunnel platform.
//!
//! the controller reconciles operator configuration and live target
//! health into per-agent configuration snapshots, pushed to newt and olm
//! agents over their persistent channels.

use clap::Parser;
use color_eyre::eyre::Result;
use terrapin::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(cmd) => cmd.run().await,
    }
}
