//! Domain primitive types for the device section of a container spec.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DevspecError, Result};

/// Kind of a device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// Character device.
    #[serde(rename = "c")]
    Char,
    /// Block device.
    #[serde(rename = "b")]
    Block,
    /// Named pipe.
    #[serde(rename = "p")]
    Fifo,
}

impl DeviceType {
    /// Returns the single-letter code used in runtime specs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Char => "c",
            Self::Block => "b",
            Self::Fifo => "p",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated device access string, a subset of `rwm`.
///
/// Each of `r` (read), `w` (write), and `m` (mknod) may appear at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DevicePermissions(String);

impl DevicePermissions {
    /// Parses an access string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, contains a character other
    /// than `r`, `w`, `m`, or repeats one of them.
    pub fn new(access: impl Into<String>) -> Result<Self> {
        let access = access.into();
        if Self::is_valid(&access) {
            Ok(Self(access))
        } else {
            Err(DevspecError::Config {
                message: format!("invalid device mode: {access:?}"),
            })
        }
    }

    /// Read, write, and mknod.
    #[must_use]
    pub fn all() -> Self {
        Self(crate::constants::ACCESS_ALL.to_owned())
    }

    /// Returns `true` if `access` is a non-empty, duplicate-free subset of `rwm`.
    #[must_use]
    pub fn is_valid(access: &str) -> bool {
        if access.is_empty() {
            return false;
        }
        let mut seen = [false; 3];
        for c in access.chars() {
            let slot = match c {
                'r' => 0,
                'w' => 1,
                'm' => 2,
                _ => return false,
            };
            if seen[slot] {
                return false;
            }
            seen[slot] = true;
        }
        true
    }

    /// Returns the access string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DevicePermissions {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for DevicePermissions {
    type Err = DevspecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for DevicePermissions {
    type Error = DevspecError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DevicePermissions> for String {
    fn from(value: DevicePermissions) -> Self {
        value.0
    }
}

impl fmt::Display for DevicePermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A device node made visible inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNode {
    /// Container-side path of the node.
    pub path: PathBuf,
    /// Device kind.
    #[serde(rename = "type")]
    pub kind: DeviceType,
    /// Major number.
    pub major: u64,
    /// Minor number.
    pub minor: u64,
    /// Owner user id of the node created in the container.
    pub uid: u32,
    /// Owner group id of the node created in the container.
    pub gid: u32,
}

/// A device cgroup access rule.
///
/// `None` for `kind`, `major`, or `minor` matches every value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCgroupRule {
    /// Whether the rule grants or denies access.
    pub allow: bool,
    /// Device kind filter.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeviceType>,
    /// Major number filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<u64>,
    /// Minor number filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor: Option<u64>,
    /// Access granted or denied.
    pub access: DevicePermissions,
}

impl DeviceCgroupRule {
    /// Grants `access` to exactly one device.
    #[must_use]
    pub fn allow_device(
        kind: DeviceType,
        major: u64,
        minor: u64,
        access: DevicePermissions,
    ) -> Self {
        Self {
            allow: true,
            kind: Some(kind),
            major: Some(major),
            minor: Some(minor),
            access,
        }
    }

    /// Grants `rwm` on every device.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            allow: true,
            kind: None,
            major: None,
            minor: None,
            access: DevicePermissions::all(),
        }
    }

    /// Returns `true` if the rule has no kind, major, or minor filter.
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        self.kind.is_none() && self.major.is_none() && self.minor.is_none()
    }
}

/// A trusted device coming from runtime configuration or annotations.
///
/// Both halves are pre-built and copied into the spec verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredDevice {
    /// Host path the device was read from.
    pub host_path: PathBuf,
    /// Node to expose inside the container.
    pub node: DeviceNode,
    /// Cgroup rule granting access to the node.
    pub rule: DeviceCgroupRule,
}

/// A per-container request to expose a host device or a directory of devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMapping {
    /// Path on the host.
    pub host_path: PathBuf,
    /// Path inside the container.
    pub container_path: PathBuf,
    /// Requested access.
    #[serde(default)]
    pub permissions: DevicePermissions,
}

impl DeviceMapping {
    /// Creates a mapping.
    #[must_use]
    pub fn new(
        host_path: impl Into<PathBuf>,
        container_path: impl Into<PathBuf>,
        permissions: DevicePermissions,
    ) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            permissions,
        }
    }
}

/// Identity policy of the container the devices are built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    /// User the container process runs as, if overridden.
    #[serde(default)]
    pub run_as_user: Option<i64>,
    /// Group the container process runs as, if overridden.
    #[serde(default)]
    pub run_as_group: Option<i64>,
    /// Whether the container is privileged.
    #[serde(default)]
    pub privileged: bool,
}
