//! `devspec build` — Build the device section for a container request.

use std::path::PathBuf;

use clap::Args;
use devspec_common::config::{ContainerDeviceRequest, RuntimeDeviceConfig};
use devspec_core::{
    DeviceSources, DeviceSpecBuilder, DeviceSpecTarget, HostDeviceReader, RuntimeSpec,
};

use crate::input::load_document;
use crate::output::BuildOutput;

/// Arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Container device request (JSON, or YAML with a .yaml/.yml extension).
    pub request: PathBuf,

    /// Runtime device configuration file.
    #[arg(long, env = "DEVSPEC_RUNTIME_CONFIG")]
    pub runtime_config: Option<PathBuf>,

    /// Resolve host paths under this directory instead of the configured root.
    #[arg(long)]
    pub host_root: Option<PathBuf>,

    /// Include directory entries that were skipped during expansion.
    #[arg(long)]
    pub show_skipped: bool,
}

/// Executes the `build` command.
///
/// Resolves configured and annotation devices, runs the builder, and
/// prints the resulting spec as JSON.
///
/// # Errors
///
/// Returns an error if an input cannot be loaded or the build fails.
pub fn execute(args: BuildArgs) -> anyhow::Result<()> {
    let mut runtime: RuntimeDeviceConfig = match &args.runtime_config {
        Some(path) => load_document(path)?,
        None => RuntimeDeviceConfig::default(),
    };
    if let Some(root) = args.host_root {
        runtime.host_root = root;
    }
    let request: ContainerDeviceRequest = load_document(&args.request)?;
    tracing::info!(
        request = %args.request.display(),
        host_root = %runtime.host_root.display(),
        "building device spec"
    );

    let reader = HostDeviceReader::for_root(&runtime.host_root);
    let builder = DeviceSpecBuilder::new(reader)
        .host_root(&runtime.host_root)
        .options(runtime.options);

    let configured = builder.resolve_device_strings(&runtime.parsed_additional_devices()?)?;
    let annotations = builder.resolve_device_strings(&request.parsed_annotation_devices()?)?;
    let sources = DeviceSources {
        configured: &configured,
        annotations: &annotations,
        mappings: &request.devices,
        security_context: &request.security_context,
    };

    let mut spec = builder.build(&sources)?;
    let skipped = std::mem::take(&mut spec.skipped);
    let mut target = RuntimeSpec::default();
    target.replace_devices(spec);

    let output = BuildOutput {
        spec: &target,
        skipped: args.show_skipped.then_some(skipped.as_slice()),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
