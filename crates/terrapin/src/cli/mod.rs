//! command-line interface for terrapin.

mod serve;

pub use serve::ServeCommand;

use clap::{Parser, Subcommand};

/// terrapin - control plane for a reverse-tunnel platform
#[derive(Parser, Debug)]
#[command(name = "terrapin", version, about)]
pub struct Cli {
    /// subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// run the controller
    Serve(ServeCommand),
}
