//! # devspec — device spec CLI
//!
//! Builds the device section of a container runtime spec from a runtime
//! configuration and a per-container request, and inspects host devices.

mod commands;
mod input;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
