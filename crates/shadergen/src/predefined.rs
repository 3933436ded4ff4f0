//! Compiled-in default manifest
//!
//! The renderer's shared headers are generated from `manifests/shader_common.yaml`,
//! which is embedded into the crate so the generator runs without any input files.

use crate::error::Result;
use crate::manifest::Manifest;

/// Source text of the default manifest
pub const DEFAULT_MANIFEST_YAML: &str = include_str!("../manifests/shader_common.yaml");

/// Parses the embedded default manifest
pub fn default_manifest() -> Result<Manifest> {
    Manifest::from_yaml(DEFAULT_MANIFEST_YAML)
}
