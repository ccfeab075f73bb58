//! CLI command definitions and dispatch.

pub mod build;
pub mod host_devices;
pub mod parse_device;

use clap::{Parser, Subcommand};

/// devspec — build the device section of a container runtime spec.
#[derive(Parser, Debug)]
#[command(name = "devspec", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the device section for a container request.
    Build(build::BuildArgs),
    /// List host devices a privileged container would receive.
    HostDevices(host_devices::HostDevicesArgs),
    /// Validate a `src[:dst[:perms]]` device string.
    ParseDevice(parse_device::ParseDeviceArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Build(args) => build::execute(args),
        Command::HostDevices(args) => host_devices::execute(args),
        Command::ParseDevice(args) => parse_device::execute(&args),
    }
}
