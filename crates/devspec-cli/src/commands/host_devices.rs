//! `devspec host-devices` — List host devices a privileged container would receive.

use std::path::PathBuf;

use clap::Args;
use devspec_core::{DeviceReader, HostDeviceReader};

use crate::output::format_device_row;

/// Arguments for the `host-devices` command.
#[derive(Args, Debug)]
pub struct HostDevicesArgs {
    /// Device directory to enumerate.
    #[arg(long, default_value = devspec_common::constants::HOST_DEVICES_DIR)]
    pub dev_dir: PathBuf,

    /// Also list 0:0 entries, which the builder drops.
    #[arg(long)]
    pub all: bool,
}

/// Executes the `host-devices` command.
///
/// # Errors
///
/// Returns an error if the device directory cannot be enumerated.
pub fn execute(args: HostDevicesArgs) -> anyhow::Result<()> {
    let reader = HostDeviceReader::new(args.dev_dir);
    let devices = reader.host_devices()?;
    tracing::info!(
        count = devices.len(),
        dir = %reader.dev_dir().display(),
        "listing host devices"
    );

    println!("TYPE\tDEVICE\tUID\tGID\tPATH");
    for device in devices
        .iter()
        .filter(|d| args.all || d.major != 0 || d.minor != 0)
    {
        println!("{}", format_device_row(device));
    }
    Ok(())
}
