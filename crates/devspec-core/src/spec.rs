//! The device section of a container runtime spec.
//!
//! [`DeviceSpec`] is the immutable result of a build. A [`DeviceSpecTarget`]
//! receives it in one replace so a failed build is never half-applied.

use std::path::PathBuf;

use devspec_common::types::{DeviceCgroupRule, DeviceNode};
use serde::{Deserialize, Serialize};

/// Why a descendant was left out during directory expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The directory walk could not visit the entry.
    Walk(String),
    /// The entry exists but is not a device node.
    NotADevice,
    /// The entry could not be inspected.
    Unreadable(String),
}

/// A descendant skipped during directory expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Host path of the skipped entry.
    pub path: PathBuf,
    /// Why it was skipped.
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Devices and cgroup rules produced by one build, in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Device nodes to create in the container.
    pub devices: Vec<DeviceNode>,
    /// Device cgroup rules.
    pub cgroup_rules: Vec<DeviceCgroupRule>,
    /// Descendants left out of directory expansion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

impl DeviceSpec {
    /// Appends a node together with the rule that grants access to it.
    pub fn push(&mut self, node: DeviceNode, rule: DeviceCgroupRule) {
        self.devices.push(node);
        self.cgroup_rules.push(rule);
    }

    /// Returns `true` if no device or rule was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.cgroup_rules.is_empty()
    }
}

/// A spec object that owns a device list and a device cgroup rule list.
pub trait DeviceSpecTarget {
    /// Removes every device and device cgroup rule.
    fn clear_devices(&mut self);

    /// Appends a device node.
    fn add_device(&mut self, node: DeviceNode);

    /// Appends a device cgroup rule.
    fn add_cgroup_rule(&mut self, rule: DeviceCgroupRule);

    /// Replaces the device section with `spec`.
    fn replace_devices(&mut self, spec: DeviceSpec) {
        self.clear_devices();
        for node in spec.devices {
            self.add_device(node);
        }
        for rule in spec.cgroup_rules {
            self.add_cgroup_rule(rule);
        }
    }
}

/// Resource section of [`LinuxSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxResources {
    /// Device cgroup rules.
    #[serde(default)]
    pub devices: Vec<DeviceCgroupRule>,
}

/// Linux section of [`RuntimeSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxSpec {
    /// Device nodes created in the container.
    #[serde(default)]
    pub devices: Vec<DeviceNode>,
    /// Resource limits.
    #[serde(default)]
    pub resources: LinuxResources,
}

/// The device-bearing part of an OCI runtime spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSpec {
    /// Linux-specific configuration.
    #[serde(default)]
    pub linux: LinuxSpec,
}

impl RuntimeSpec {
    /// Device nodes currently in the spec.
    #[must_use]
    pub fn devices(&self) -> &[DeviceNode] {
        &self.linux.devices
    }

    /// Device cgroup rules currently in the spec.
    #[must_use]
    pub fn cgroup_rules(&self) -> &[DeviceCgroupRule] {
        &self.linux.resources.devices
    }
}

impl DeviceSpecTarget for RuntimeSpec {
    fn clear_devices(&mut self) {
        self.linux.devices.clear();
        self.linux.resources.devices.clear();
    }

    fn add_device(&mut self, node: DeviceNode) {
        self.linux.devices.push(node);
    }

    fn add_cgroup_rule(&mut self, rule: DeviceCgroupRule) {
        self.linux.resources.devices.push(rule);
    }

    fn replace_devices(&mut self, spec: DeviceSpec) {
        self.linux.devices = spec.devices;
        self.linux.resources.devices = spec.cgroup_rules;
    }
}
