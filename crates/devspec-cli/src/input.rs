//! Loading of request and configuration documents.
//!
//! Files ending in `.yaml` or `.yml` are read as YAML; everything else is
//! read as JSON.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Reads and deserializes a JSON or YAML document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match `T`.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?
    };
    tracing::debug!(path = %path.display(), "loaded document");
    Ok(value)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}
