//! # devspec-core
//!
//! Builds the device section of a container runtime spec: which host
//! device nodes a container sees, at which path, owned by whom, and with
//! which device cgroup rules.
//!
//! This crate provides:
//! - **Builder**: the ordered four-source pipeline ([`builder`]).
//! - **Device reading**: `lstat`-based node inspection and `/dev` enumeration ([`device`]).
//! - **Secure paths**: symlink-safe resolution under a host root ([`path`]).
//! - **Directory expansion**: best-effort discovery of nested device nodes ([`expand`]).
//! - **Ownership**: run-as overrides for created nodes ([`ownership`]).
//!
//! The builder never mutates a spec until a build has fully succeeded.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod builder;
pub mod configured;
pub mod device;
pub mod expand;
pub mod ownership;
pub mod path;
pub mod spec;

pub use builder::{DeviceSources, DeviceSpecBuilder};
pub use device::{DeviceReader, HostDevice, HostDeviceReader, ReadError};
pub use spec::{DeviceSpec, DeviceSpecTarget, RuntimeSpec};
