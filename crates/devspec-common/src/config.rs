//! Configuration model for device spec builds.
//!
//! [`RuntimeDeviceConfig`] is the administrator side: which extra devices
//! every container gets and how privileged containers are treated.
//! [`ContainerDeviceRequest`] is the per-container side.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DevspecError, Result};
use crate::types::{DeviceMapping, DevicePermissions, SecurityContext};

/// Runtime flags that shape the device spec build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceOptions {
    /// Do not pass host devices through to privileged containers.
    #[serde(default)]
    pub privileged_without_host_devices: bool,
    /// Take device node ownership from the container's run-as user and group.
    #[serde(default)]
    pub device_ownership_from_security_context: bool,
}

/// Administrator-level device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeDeviceConfig {
    /// Root that host device paths are resolved under.
    #[serde(default = "default_host_root")]
    pub host_root: PathBuf,
    /// Devices added to every container, in `src[:dst[:perms]]` notation.
    #[serde(default)]
    pub additional_devices: Vec<String>,
    /// Build flags.
    #[serde(flatten)]
    pub options: DeviceOptions,
}

fn default_host_root() -> PathBuf {
    PathBuf::from(crate::constants::DEFAULT_HOST_ROOT)
}

impl Default for RuntimeDeviceConfig {
    fn default() -> Self {
        Self {
            host_root: default_host_root(),
            additional_devices: Vec::new(),
            options: DeviceOptions::default(),
        }
    }
}

impl RuntimeDeviceConfig {
    /// Parses every entry of `additional_devices`.
    ///
    /// # Errors
    ///
    /// Returns the first malformed device string.
    pub fn parsed_additional_devices(&self) -> Result<Vec<DeviceString>> {
        self.additional_devices
            .iter()
            .map(String::as_str)
            .map(parse_device_string)
            .collect()
    }
}

/// Per-container device input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDeviceRequest {
    /// Identity and privilege of the container.
    #[serde(default)]
    pub security_context: SecurityContext,
    /// Devices requested by the container.
    #[serde(default)]
    pub devices: Vec<DeviceMapping>,
    /// Raw value of the devices annotation, if set.
    #[serde(default)]
    pub devices_annotation: Option<String>,
}

impl ContainerDeviceRequest {
    /// Parses the devices annotation, if any.
    ///
    /// # Errors
    ///
    /// Returns the first malformed device string.
    pub fn parsed_annotation_devices(&self) -> Result<Vec<DeviceString>> {
        self.devices_annotation
            .as_deref()
            .map_or_else(|| Ok(Vec::new()), parse_devices_annotation)
    }
}

/// A parsed `src[:dst[:perms]]` device string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceString {
    /// Host path.
    pub source: PathBuf,
    /// Container path.
    pub destination: PathBuf,
    /// Requested access.
    pub permissions: DevicePermissions,
}

/// Parses a device string of the form `src[:dst[:perms]]`.
///
/// With two fields the second is read as permissions when it is a valid
/// access string, and as the destination otherwise. An empty destination
/// falls back to the source.
///
/// # Errors
///
/// Returns [`DevspecError::Config`] for too many fields, invalid
/// permissions in the third field, or a relative source path.
pub fn parse_device_string(device: &str) -> Result<DeviceString> {
    let fields: Vec<&str> = device.split(':').collect();
    let (source, destination, permissions) = match fields.as_slice() {
        [src] => (*src, *src, DevicePermissions::all()),
        [src, second] if DevicePermissions::is_valid(second) => {
            (*src, *src, DevicePermissions::new(*second)?)
        }
        [src, dst] => (*src, *dst, DevicePermissions::all()),
        [src, dst, perms] => {
            let permissions = DevicePermissions::new(*perms).map_err(|_| DevspecError::Config {
                message: format!("invalid device mode {perms:?} in {device:?}"),
            })?;
            (*src, *dst, permissions)
        }
        _ => {
            return Err(DevspecError::Config {
                message: format!("invalid device specification: {device:?}"),
            });
        }
    };

    if !Path::new(source).is_absolute() {
        return Err(DevspecError::Config {
            message: format!("device source {source:?} is not an absolute path"),
        });
    }
    let destination = if destination.is_empty() { source } else { destination };

    Ok(DeviceString {
        source: PathBuf::from(source),
        destination: PathBuf::from(destination),
        permissions,
    })
}

/// Parses a comma-separated devices annotation value.
///
/// Blank items are ignored.
///
/// # Errors
///
/// Returns the first malformed device string.
pub fn parse_devices_annotation(value: &str) -> Result<Vec<DeviceString>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(parse_device_string)
        .collect()
}
