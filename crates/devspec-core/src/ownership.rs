//! Ownership of device nodes created inside the container.
//!
//! The runtime creates each node with `mknod(2)` and then changes its owner
//! to the ids chosen here. When user namespaces are in play devices are bind
//! mounted instead, and the ids only matter for the host-side permission
//! check.

/// Picks the owner id for a device node.
///
/// Returns `run_as` when it is present, positive, fits a `u32`, and
/// `from_security_context` is enabled. Falls back to `host_id` otherwise,
/// so root (`0`) and out-of-range overrides keep the host owner.
#[must_use]
pub fn resolve_owner(run_as: Option<i64>, host_id: u32, from_security_context: bool) -> u32 {
    match run_as.and_then(|id| u32::try_from(id).ok()) {
        Some(id) if id > 0 && from_security_context => id,
        _ => host_id,
    }
}
