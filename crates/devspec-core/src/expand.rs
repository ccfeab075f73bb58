//! Best-effort expansion of a directory mapping into its device nodes.
//!
//! A mapping may name a directory such as `/dev/dri`. Every device node
//! below it is exposed under the mapping's container path. Nothing found
//! while walking can fail the build; entries that cannot be used are
//! handed to the visitor as skipped.

use std::path::Path;

use devspec_common::types::{DeviceCgroupRule, DeviceMapping, DeviceNode};

use crate::device::{DeviceReader, ReadError};
use crate::spec::{DeviceSpec, SkipReason, SkippedEntry};

/// Receives the outcome of each descendant visited during expansion.
pub trait ExpansionVisitor {
    /// Called for each device node found.
    fn device(&mut self, node: DeviceNode, rule: DeviceCgroupRule);

    /// Called for each descendant that was left out.
    fn skipped(&mut self, _entry: SkippedEntry) {}
}

impl ExpansionVisitor for DeviceSpec {
    fn device(&mut self, node: DeviceNode, rule: DeviceCgroupRule) {
        self.push(node, rule);
    }

    fn skipped(&mut self, entry: SkippedEntry) {
        self.skipped.push(entry);
    }
}

/// Walks `host_dir` and reports every device node below it.
///
/// The container path of a descendant is `mapping.container_path` followed
/// by the descendant's path relative to `host_dir`. Owner ids are copied
/// from the host node as-is; the run-as override does not apply here.
/// Subdirectories are traversed silently and symlinks are not followed.
pub fn expand_directory<R, V>(reader: &R, host_dir: &Path, mapping: &DeviceMapping, visitor: &mut V)
where
    R: DeviceReader + ?Sized,
    V: ExpansionVisitor + ?Sized,
{
    for entry in walkdir::WalkDir::new(host_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                visitor.skipped(SkippedEntry {
                    path: e.path().unwrap_or(host_dir).to_path_buf(),
                    reason: SkipReason::Walk(e.to_string()),
                });
                continue;
            }
        };

        let device = match reader.read_device(entry.path(), &mapping.permissions) {
            Ok(device) => device,
            Err(ReadError::NotADevice) => {
                if !entry.file_type().is_dir() {
                    visitor.skipped(SkippedEntry {
                        path: entry.into_path(),
                        reason: SkipReason::NotADevice,
                    });
                }
                continue;
            }
            Err(ReadError::Io(e)) => {
                visitor.skipped(SkippedEntry {
                    path: entry.into_path(),
                    reason: SkipReason::Unreadable(e.to_string()),
                });
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(host_dir) else {
            continue;
        };
        let node = DeviceNode {
            path: mapping.container_path.join(relative),
            kind: device.kind,
            major: device.major,
            minor: device.minor,
            uid: device.uid,
            gid: device.gid,
        };
        let rule = DeviceCgroupRule::allow_device(
            device.kind,
            device.major,
            device.minor,
            mapping.permissions.clone(),
        );
        visitor.device(node, rule);
    }
}
