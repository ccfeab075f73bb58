//! Shared fixtures for builder integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use devspec_common::error::{DevspecError, Result};
use devspec_common::types::{
    ConfiguredDevice, DeviceCgroupRule, DeviceNode, DevicePermissions, DeviceType,
};
use devspec_core::{DeviceReader, HostDevice, ReadError};

/// Device reader that treats registered paths as device nodes.
///
/// Unregistered paths are looked up on disk: missing ones fail with an I/O
/// error and existing ones are reported as not a device.
#[derive(Debug, Default)]
pub struct FakeReader {
    devices: HashMap<PathBuf, HostDevice>,
    unreadable: HashSet<PathBuf>,
    host: Vec<HostDevice>,
    host_fails: bool,
}

impl FakeReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` as a character device owned by `uid:uid`.
    pub fn with_device(mut self, path: impl Into<PathBuf>, major: u64, minor: u64, uid: u32) -> Self {
        let path = path.into();
        let _ = self.devices.insert(path.clone(), host_device(path, major, minor, uid));
        self
    }

    /// Makes reads of `path` fail with permission denied.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        let _ = self.unreadable.insert(path.into());
        self
    }

    /// Adds a node to the host enumeration result.
    pub fn with_host_device(mut self, path: &str, major: u64, minor: u64) -> Self {
        self.host.push(host_device(PathBuf::from(path), major, minor, 0));
        self
    }

    /// Makes host enumeration fail.
    pub fn with_failing_host(mut self) -> Self {
        self.host_fails = true;
        self
    }
}

impl DeviceReader for FakeReader {
    fn read_device(
        &self,
        path: &Path,
        permissions: &DevicePermissions,
    ) -> std::result::Result<HostDevice, ReadError> {
        if let Some(device) = self.devices.get(path) {
            return Ok(HostDevice {
                permissions: permissions.clone(),
                ..device.clone()
            });
        }
        if self.unreadable.contains(path) {
            return Err(ReadError::Io(std::io::Error::from(
                std::io::ErrorKind::PermissionDenied,
            )));
        }
        let _ = std::fs::symlink_metadata(path)?;
        Err(ReadError::NotADevice)
    }

    fn host_devices(&self) -> Result<Vec<HostDevice>> {
        if self.host_fails {
            return Err(DevspecError::Enumeration {
                path: PathBuf::from("/dev"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        Ok(self.host.clone())
    }
}

fn host_device(path: PathBuf, major: u64, minor: u64, uid: u32) -> HostDevice {
    HostDevice {
        path,
        kind: DeviceType::Char,
        major,
        minor,
        uid,
        gid: uid,
        permissions: DevicePermissions::all(),
    }
}

/// A trusted device as the configuration loader would produce it.
pub fn configured(path: &str, major: u64, minor: u64) -> ConfiguredDevice {
    ConfiguredDevice {
        host_path: PathBuf::from(path),
        node: DeviceNode {
            path: PathBuf::from(path),
            kind: DeviceType::Char,
            major,
            minor,
            uid: 0,
            gid: 0,
        },
        rule: DeviceCgroupRule::allow_device(DeviceType::Char, major, minor, DevicePermissions::all()),
    }
}

/// Creates an empty regular file, with parents, under `root`.
pub fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(&path, b"").expect("touch");
    path
}
