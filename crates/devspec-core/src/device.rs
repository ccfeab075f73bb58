//! Host device node reading and enumeration.
//!
//! [`DeviceReader`] is the seam between the builder and the host
//! filesystem. [`HostDeviceReader`] is the Linux implementation backed by
//! `lstat(2)`.

use std::path::{Path, PathBuf};

use devspec_common::error::{DevspecError, Result};
use devspec_common::types::{DevicePermissions, DeviceType};
use thiserror::Error;

/// Metadata of a device node as observed on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDevice {
    /// Host path the node was read from.
    pub path: PathBuf,
    /// Device kind.
    pub kind: DeviceType,
    /// Major number.
    pub major: u64,
    /// Minor number.
    pub minor: u64,
    /// Owner user id on the host.
    pub uid: u32,
    /// Owner group id on the host.
    pub gid: u32,
    /// Access the node was requested with.
    pub permissions: DevicePermissions,
}

/// Outcome of a failed device read.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The path exists but is not a character, block, or fifo node.
    #[error("not a device node")]
    NotADevice,
    /// The path could not be inspected.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads device metadata from the host.
pub trait DeviceReader {
    /// Reads the device node at `path` without following a final symlink.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::NotADevice`] when `path` is not a device node and
    /// [`ReadError::Io`] when it cannot be inspected.
    fn read_device(
        &self,
        path: &Path,
        permissions: &DevicePermissions,
    ) -> std::result::Result<HostDevice, ReadError>;

    /// Lists every device node on the host.
    ///
    /// # Errors
    ///
    /// Returns [`DevspecError::Enumeration`] if the device tree cannot be read.
    fn host_devices(&self) -> Result<Vec<HostDevice>>;
}

/// [`DeviceReader`] backed by the real host filesystem.
#[derive(Debug, Clone)]
pub struct HostDeviceReader {
    dev_dir: PathBuf,
}

impl Default for HostDeviceReader {
    fn default() -> Self {
        Self::new(devspec_common::constants::HOST_DEVICES_DIR)
    }
}

impl HostDeviceReader {
    /// Creates a reader that enumerates host devices under `dev_dir`.
    #[must_use]
    pub fn new(dev_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
        }
    }

    /// Creates a reader that enumerates the `/dev` of `host_root`.
    ///
    /// Pair it with a builder using the same host root; [`Self::default`]
    /// always enumerates the real `/dev`.
    #[must_use]
    pub fn for_root(host_root: &Path) -> Self {
        Self::new(crate::path::lexical_join(
            host_root,
            Path::new(devspec_common::constants::HOST_DEVICES_DIR),
        ))
    }

    /// Returns the directory enumerated by [`DeviceReader::host_devices`].
    #[must_use]
    pub fn dev_dir(&self) -> &Path {
        &self.dev_dir
    }
}

impl DeviceReader for HostDeviceReader {
    fn read_device(
        &self,
        path: &Path,
        permissions: &DevicePermissions,
    ) -> std::result::Result<HostDevice, ReadError> {
        device_from_path(path, permissions)
    }

    fn host_devices(&self) -> Result<Vec<HostDevice>> {
        enumerate_devices(&self.dev_dir)
    }
}

/// Reads the device node at `path`.
///
/// Symlinks are reported as [`ReadError::NotADevice`].
///
/// # Errors
///
/// Returns [`ReadError::NotADevice`] for anything that is not a character,
/// block, or fifo node, and [`ReadError::Io`] if `lstat(2)` fails.
#[cfg(target_os = "linux")]
pub fn device_from_path(
    path: &Path,
    permissions: &DevicePermissions,
) -> std::result::Result<HostDevice, ReadError> {
    use std::os::unix::fs::{FileTypeExt, MetadataExt};

    let meta = std::fs::symlink_metadata(path)?;
    let file_type = meta.file_type();
    let kind = if file_type.is_char_device() {
        DeviceType::Char
    } else if file_type.is_block_device() {
        DeviceType::Block
    } else if file_type.is_fifo() {
        DeviceType::Fifo
    } else {
        return Err(ReadError::NotADevice);
    };

    let rdev = meta.rdev();
    Ok(HostDevice {
        path: path.to_path_buf(),
        kind,
        major: nix::sys::stat::major(rdev),
        minor: nix::sys::stat::minor(rdev),
        uid: meta.uid(),
        gid: meta.gid(),
        permissions: permissions.clone(),
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error: device node inspection requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn device_from_path(
    _path: &Path,
    _permissions: &DevicePermissions,
) -> std::result::Result<HostDevice, ReadError> {
    Err(ReadError::Io(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "Linux required for device node inspection",
    )))
}

/// Recursively collects device nodes under `dev_dir`.
///
/// Pseudo-device directories such as `pts` and `shm` are pruned. Fifos and
/// the `console` node are never returned. Entries that disappear while walking
/// are ignored; any other failure aborts the enumeration.
///
/// # Errors
///
/// Returns [`DevspecError::Enumeration`] if `dev_dir` or one of its
/// entries cannot be read.
pub fn enumerate_devices(dev_dir: &Path) -> Result<Vec<HostDevice>> {
    use devspec_common::constants::{SKIPPED_HOST_DEVICE_DIRS, SKIPPED_HOST_DEVICE_NODE};

    let all = DevicePermissions::all();
    let mut devices = Vec::new();
    let walker = walkdir::WalkDir::new(dev_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.depth() > 0
                && e.file_type().is_dir()
                && e.file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_HOST_DEVICE_DIRS.contains(&name)))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 && is_vanished(e.io_error()) => continue,
            Err(e) => {
                return Err(DevspecError::Enumeration {
                    path: e.path().map_or_else(|| dev_dir.to_path_buf(), Path::to_path_buf),
                    source: e.into(),
                });
            }
        };
        if entry.file_type().is_dir() || entry.file_name() == SKIPPED_HOST_DEVICE_NODE {
            continue;
        }
        match device_from_path(entry.path(), &all) {
            Ok(device) if device.kind == DeviceType::Fifo => {}
            Ok(device) => devices.push(device),
            Err(ReadError::NotADevice) => {}
            Err(ReadError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(ReadError::Io(e)) => {
                return Err(DevspecError::Enumeration {
                    path: entry.into_path(),
                    source: e,
                });
            }
        }
    }

    tracing::debug!(dir = %dev_dir.display(), count = devices.len(), "enumerated host devices");
    Ok(devices)
}

fn is_vanished(err: Option<&std::io::Error>) -> bool {
    err.is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}
