//! Builds the device section of a container spec.
//!
//! Four sources are applied in a fixed order:
//! 1. administrator-configured devices,
//! 2. annotation devices,
//! 3. every host device, for privileged containers,
//! 4. the container's own device mappings.
//!
//! Later sources only append; nothing is deduplicated. Any fatal error
//! aborts the whole build.

use std::path::{Path, PathBuf};

use devspec_common::config::{DeviceOptions, DeviceString};
use devspec_common::error::{DevspecError, Result};
use devspec_common::types::{
    ConfiguredDevice, DeviceCgroupRule, DeviceMapping, DeviceNode, SecurityContext,
};

use crate::device::{DeviceReader, ReadError};
use crate::expand::expand_directory;
use crate::ownership::resolve_owner;
use crate::path::{lexical_join, secure_join};
use crate::spec::{DeviceSpec, DeviceSpecTarget};

/// Inputs of one build, borrowed for its duration.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSources<'a> {
    /// Devices from runtime configuration.
    pub configured: &'a [ConfiguredDevice],
    /// Devices from container annotations.
    pub annotations: &'a [ConfiguredDevice],
    /// Devices requested by the container.
    pub mappings: &'a [DeviceMapping],
    /// Identity and privilege of the container.
    pub security_context: &'a SecurityContext,
}

/// Builds device specs against a host root through a [`DeviceReader`].
///
/// The reader enumerates host devices on its own, so a builder with a
/// non-`/` host root should be paired with a reader for the same root,
/// such as [`HostDeviceReader::for_root`](crate::HostDeviceReader::for_root).
#[derive(Debug, Clone)]
pub struct DeviceSpecBuilder<R> {
    reader: R,
    host_root: PathBuf,
    options: DeviceOptions,
}

impl<R: DeviceReader> DeviceSpecBuilder<R> {
    /// Creates a builder rooted at `/` with default options.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            host_root: PathBuf::from(devspec_common::constants::DEFAULT_HOST_ROOT),
            options: DeviceOptions::default(),
        }
    }

    /// Sets the root host paths are resolved under.
    #[must_use]
    pub fn host_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.host_root = root.into();
        self
    }

    /// Sets the build flags.
    #[must_use]
    pub fn options(mut self, options: DeviceOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves configured or annotation device strings with this builder's
    /// reader and host root.
    ///
    /// # Errors
    ///
    /// Returns the first device that cannot be resolved.
    pub fn resolve_device_strings(
        &self,
        devices: &[DeviceString],
    ) -> Result<Vec<ConfiguredDevice>> {
        crate::configured::resolve_configured_devices(&self.reader, &self.host_root, devices)
    }

    /// Clears `target`, builds, and installs the result.
    ///
    /// On failure `target` is left with no devices and no device rules.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::build`].
    pub fn apply<T>(&self, target: &mut T, sources: &DeviceSources<'_>) -> Result<()>
    where
        T: DeviceSpecTarget + ?Sized,
    {
        target.clear_devices();
        let spec = self.build(sources)?;
        target.replace_devices(spec);
        Ok(())
    }

    /// Builds the device section for one container.
    ///
    /// # Errors
    ///
    /// Returns [`DevspecError::Enumeration`] if host devices are needed but
    /// cannot be listed, and any error from resolving a container mapping.
    pub fn build(&self, sources: &DeviceSources<'_>) -> Result<DeviceSpec> {
        let ctx = sources.security_context;
        tracing::info!(
            configured = sources.configured.len(),
            annotations = sources.annotations.len(),
            mappings = sources.mappings.len(),
            privileged = ctx.privileged,
            "building device spec"
        );

        let mut spec = DeviceSpec::default();
        add_configured(&mut spec, sources.configured, "configured");
        add_configured(&mut spec, sources.annotations, "annotation");
        self.add_host_devices(&mut spec, ctx)?;
        for mapping in sources.mappings {
            self.add_mapping(&mut spec, mapping, ctx)?;
        }

        tracing::info!(
            devices = spec.devices.len(),
            rules = spec.cgroup_rules.len(),
            skipped = spec.skipped.len(),
            "device spec built"
        );
        Ok(spec)
    }

    fn add_host_devices(&self, spec: &mut DeviceSpec, ctx: &SecurityContext) -> Result<()> {
        if !ctx.privileged || self.options.privileged_without_host_devices {
            return Ok(());
        }

        let mut added = 0usize;
        for device in self.reader.host_devices()? {
            if device.major == 0 && device.minor == 0 {
                tracing::debug!(path = %device.path.display(), "skipping 0:0 host device");
                continue;
            }
            spec.devices.push(DeviceNode {
                path: self.container_view(&device.path),
                kind: device.kind,
                major: device.major,
                minor: device.minor,
                uid: device.uid,
                gid: device.gid,
            });
            added += 1;
        }
        spec.cgroup_rules.push(DeviceCgroupRule::allow_all());
        tracing::debug!(added, "added host devices for privileged container");
        Ok(())
    }

    fn add_mapping(
        &self,
        spec: &mut DeviceSpec,
        mapping: &DeviceMapping,
        ctx: &SecurityContext,
    ) -> Result<()> {
        if ctx.privileged && mapping.container_path != mapping.host_path {
            self.ensure_absent_on_host(&mapping.container_path)?;
        }

        let path = secure_join(&self.host_root, &mapping.host_path)?;
        match self.reader.read_device(&path, &mapping.permissions) {
            Ok(device) => {
                let from_ctx = self.options.device_ownership_from_security_context;
                let node = DeviceNode {
                    path: mapping.container_path.clone(),
                    kind: device.kind,
                    major: device.major,
                    minor: device.minor,
                    uid: resolve_owner(ctx.run_as_user, device.uid, from_ctx),
                    gid: resolve_owner(ctx.run_as_group, device.gid, from_ctx),
                };
                tracing::debug!(
                    host = %path.display(),
                    container = %node.path.display(),
                    major = node.major,
                    minor = node.minor,
                    "added container device"
                );
                let rule = DeviceCgroupRule::allow_device(
                    device.kind,
                    device.major,
                    device.minor,
                    mapping.permissions.clone(),
                );
                spec.push(node, rule);
                Ok(())
            }
            Err(ReadError::NotADevice) => {
                if is_directory(&path) {
                    let before = spec.devices.len();
                    expand_directory(&self.reader, &path, mapping, spec);
                    tracing::debug!(
                        host = %path.display(),
                        added = spec.devices.len() - before,
                        "expanded device directory"
                    );
                }
                Ok(())
            }
            Err(ReadError::Io(source)) => Err(DevspecError::DeviceRead { path, source }),
        }
    }

    /// Maps a host path to where it appears for a container sharing the host tree.
    fn container_view(&self, host_path: &Path) -> PathBuf {
        host_path
            .strip_prefix(&self.host_root)
            .map_or_else(|_| host_path.to_path_buf(), |rel| Path::new("/").join(rel))
    }

    /// Refuses a container path that already exists on the host.
    ///
    /// A privileged container sees the host's device tree, so such a path
    /// would be shadowed by the host entry.
    fn ensure_absent_on_host(&self, container_path: &Path) -> Result<()> {
        let on_host = lexical_join(&self.host_root, container_path);
        match std::fs::metadata(&on_host) {
            Ok(_) => Err(DevspecError::SecurityViolation {
                container_path: container_path.to_path_buf(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(DevspecError::Io {
                path: on_host,
                source,
            }),
        }
    }
}

fn add_configured(spec: &mut DeviceSpec, devices: &[ConfiguredDevice], source: &'static str) {
    for device in devices {
        spec.push(device.node.clone(), device.rule.clone());
    }
    tracing::debug!(source, count = devices.len(), "added trusted devices");
}

fn is_directory(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_dir())
}
