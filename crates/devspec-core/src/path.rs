//! Symlink-safe path resolution scoped to a root directory.
//!
//! Host device paths come from container requests and must never resolve
//! outside the host root, whether through `..` segments or through symlinks
//! whose targets climb out of it.

use std::path::{Component, Path, PathBuf};

use devspec_common::error::{DevspecError, Result};

/// Resolves `unsafe_path` under `root`, treating `root` as `/`.
///
/// Every symlink met along the way is expanded relative to `root`, and `..`
/// never climbs above it. Components that do not exist, or that sit below a
/// non-directory, are appended as-is, so the result may name a path that
/// does not exist yet. The final component is expanded too when it is a
/// symlink.
///
/// # Errors
///
/// Returns [`DevspecError::PathResolution`] if `root` cannot be
/// canonicalized or too many symlinks are followed.
pub fn secure_join(root: &Path, unsafe_path: &Path) -> Result<PathBuf> {
    safe_path::scoped_resolve(root, unsafe_path)
        .map(|relative| root.join(relative))
        .map_err(|source| DevspecError::PathResolution {
            root: root.to_path_buf(),
            path: unsafe_path.to_path_buf(),
            source,
        })
}

/// Maps an absolute container-style path onto `root` without resolving it.
#[must_use]
pub fn lexical_join(root: &Path, path: &Path) -> PathBuf {
    let mut joined = root.to_path_buf();
    for component in path.components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::ParentDir => {
                if joined != root {
                    let _ = joined.pop();
                }
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    joined
}
