//! `devspec parse-device` — Validate a `src[:dst[:perms]]` device string.

use clap::Args;
use devspec_common::config::parse_device_string;

/// Arguments for the `parse-device` command.
#[derive(Args, Debug)]
pub struct ParseDeviceArgs {
    /// Device string, e.g. `/dev/sdc:/dev/xvdc:rw`.
    pub device: String,
}

/// Executes the `parse-device` command.
///
/// # Errors
///
/// Returns an error if the device string is malformed.
pub fn execute(args: &ParseDeviceArgs) -> anyhow::Result<()> {
    let device = parse_device_string(&args.device)?;
    println!("source:      {}", device.source.display());
    println!("destination: {}", device.destination.display());
    println!("permissions: {}", device.permissions);
    Ok(())
}
