//! Formatted output helpers for CLI commands.

use devspec_core::{HostDevice, RuntimeSpec};
use devspec_core::spec::SkippedEntry;
use serde::Serialize;

/// Document printed by `devspec build`.
#[derive(Debug, Serialize)]
pub struct BuildOutput<'a> {
    /// The built spec.
    #[serde(flatten)]
    pub spec: &'a RuntimeSpec,
    /// Skipped directory entries, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<&'a [SkippedEntry]>,
}

/// Formats one host device as a table row: type, `major:minor`, uid, gid, path.
#[must_use]
pub fn format_device_row(device: &HostDevice) -> String {
    format!(
        "{}\t{}:{}\t{}\t{}\t{}",
        device.kind,
        device.major,
        device.minor,
        device.uid,
        device.gid,
        device.path.display()
    )
}
