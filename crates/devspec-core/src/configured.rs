//! Turns administrator and annotation device strings into trusted devices.
//!
//! This is the strict side of device handling: a configured path that is
//! missing or is not a device node is a configuration error.

use std::path::Path;

use devspec_common::config::DeviceString;
use devspec_common::error::{DevspecError, Result};
use devspec_common::types::{ConfiguredDevice, DeviceCgroupRule, DeviceNode};

use crate::device::{DeviceReader, ReadError};
use crate::path::secure_join;

/// Reads the host device named by `device` and pairs it with its cgroup rule.
///
/// # Errors
///
/// Returns [`DevspecError::Config`] if the source is not a device node,
/// [`DevspecError::DeviceRead`] if it cannot be read, or
/// [`DevspecError::PathResolution`] if it cannot be resolved under `host_root`.
pub fn resolve_configured_device<R>(
    reader: &R,
    host_root: &Path,
    device: &DeviceString,
) -> Result<ConfiguredDevice>
where
    R: DeviceReader + ?Sized,
{
    let path = secure_join(host_root, &device.source)?;
    let host = match reader.read_device(&path, &device.permissions) {
        Ok(host) => host,
        Err(ReadError::NotADevice) => {
            return Err(DevspecError::Config {
                message: format!("{} is not a device node", device.source.display()),
            });
        }
        Err(ReadError::Io(source)) => return Err(DevspecError::DeviceRead { path, source }),
    };

    tracing::debug!(
        source = %device.source.display(),
        destination = %device.destination.display(),
        major = host.major,
        minor = host.minor,
        "resolved configured device"
    );

    Ok(ConfiguredDevice {
        host_path: device.source.clone(),
        node: DeviceNode {
            path: device.destination.clone(),
            kind: host.kind,
            major: host.major,
            minor: host.minor,
            uid: host.uid,
            gid: host.gid,
        },
        rule: DeviceCgroupRule::allow_device(
            host.kind,
            host.major,
            host.minor,
            device.permissions.clone(),
        ),
    })
}

/// Resolves a list of device strings, stopping at the first failure.
///
/// # Errors
///
/// Returns the first error from [`resolve_configured_device`].
pub fn resolve_configured_devices<R>(
    reader: &R,
    host_root: &Path,
    devices: &[DeviceString],
) -> Result<Vec<ConfiguredDevice>>
where
    R: DeviceReader + ?Sized,
{
    devices
        .iter()
        .map(|d| resolve_configured_device(reader, host_root, d))
        .collect()
}
