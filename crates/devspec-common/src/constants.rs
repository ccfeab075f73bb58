//! System-wide constants and default paths.

/// Host root that device paths are resolved against by default.
pub const DEFAULT_HOST_ROOT: &str = "/";

/// Directory enumerated for privileged host device passthrough.
pub const HOST_DEVICES_DIR: &str = "/dev";

/// Directories under `/dev` that never contribute host devices.
///
/// These hold per-namespace pseudo devices or runtime bookkeeping that a
/// container must get from its own mounts, not from the host.
pub const SKIPPED_HOST_DEVICE_DIRS: &[&str] =
    &["pts", "shm", "fd", "mqueue", ".lxc", ".lxd-mounts", ".udev"];

/// Host device node that is never passed through, even to privileged containers.
pub const SKIPPED_HOST_DEVICE_NODE: &str = "console";

/// Access string granting read, write, and mknod.
pub const ACCESS_ALL: &str = "rwm";

