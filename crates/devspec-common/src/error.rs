//! Unified error type for the devspec workspace.
//!
//! Every variant is fatal for a device spec build. Soft outcomes such as a
//! mapping that points at a plain file never become a `DevspecError`.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum DevspecError {
    /// A privileged container declared a container path that already exists on the host.
    #[error(
        "privileged container was configured with a device container path that already exists on the host: {container_path}"
    )]
    SecurityViolation {
        /// The colliding container-side path.
        container_path: PathBuf,
    },

    /// A path could not be resolved safely under the host root.
    #[error("failed to resolve {path} under {root}: {source}")]
    PathResolution {
        /// Root the path was scoped to.
        root: PathBuf,
        /// Path that was being resolved.
        path: PathBuf,
        /// Underlying lookup error.
        source: std::io::Error,
    },

    /// Reading device metadata failed for a reason other than "not a device".
    #[error("failed to read device {path}: {source}")]
    DeviceRead {
        /// Path of the device node.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Host-wide device enumeration failed.
    #[error("failed to enumerate host devices at {path}: {source}")]
    Enumeration {
        /// Path being enumerated when the failure occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },
}

impl DevspecError {
    /// Returns `true` for the privileged path-collision refusal.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::SecurityViolation { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DevspecError>;
