//! Shared GPU data-layout generator
//!
//! This crate compiles a declarative manifest of constants, GPU-visible structs and
//! image resources into matching host (C/C++) and shader (GLSL) headers. Struct
//! layouts agree byte for byte across both languages, and the resource tables
//! (formats, flags, bindings, sampler bindings, debug names) are derived from a
//! single allocation pass so their entries stay positionally aligned.

pub mod constants;
pub mod emit;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod predefined;
pub mod resources;
pub mod types;

pub use emit::{CompiledManifest, GeneratedArtifacts, generate};
pub use error::{Error, Result};
pub use manifest::Manifest;

/// Generates all artifacts from the manifest at `manifest_path`, or from the
/// embedded default manifest when no path is given
///
/// # Arguments
/// * `manifest_path` - Optional path to a YAML manifest
///
/// # Returns
/// The four generated files, ready to be written
pub fn generate_from(manifest_path: Option<&std::path::Path>) -> Result<GeneratedArtifacts> {
    let manifest = match manifest_path {
        Some(path) => Manifest::from_file(path)?,
        None => predefined::default_manifest()?,
    };
    generate(&manifest)
}
