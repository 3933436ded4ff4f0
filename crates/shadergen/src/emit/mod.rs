//! Artifact emission
//!
//! [`CompiledManifest::compile`] runs every fallible step (constant resolution,
//! struct compilation for both targets, resource allocation). The emitters that
//! follow only format already validated data, so either all four files are
//! produced or none is.

mod host;
mod shader;

pub use host::{host_common_header, host_resource_header, host_resource_source};
pub use shader::shader_common_header;

use crate::constants::{ConstantTable, ResolvedConstant, resolve_constants};
use crate::error::Result;
use crate::layout::{CompiledStruct, compile_struct};
use crate::manifest::{EmitOptions, Manifest};
use crate::resources::{ImageResourceDescriptor, ResourceNaming, ResourceTable, allocate};
use crate::types::{Target, TypeVocabulary};
use serde::Serialize;
use std::path::Path;

/// File name of the host constants and structs header
pub const HOST_COMMON_HEADER: &str = "ShaderCommonC.h";
/// File name of the host resource table header
pub const HOST_RESOURCE_HEADER: &str = "ShaderCommonCFramebuf.h";
/// File name of the host resource table definitions
pub const HOST_RESOURCE_SOURCE: &str = "ShaderCommonCFramebuf.cpp";
/// File name of the shader header
pub const SHADER_COMMON_HEADER: &str = "ShaderCommonGLSL.h";

/// Everything the emitters need, compiled from one manifest
#[derive(Debug, Clone, Serialize)]
pub struct CompiledManifest {
    pub options: EmitOptions,
    pub naming: ResourceNaming,
    pub constants: ConstantTable,
    /// Host structs, without shader-only ones
    pub host_structs: Vec<CompiledStruct>,
    pub shader_structs: Vec<CompiledStruct>,
    pub resources: Vec<ImageResourceDescriptor>,
    pub table: ResourceTable,
}

impl CompiledManifest {
    /// Resolves constants, compiles every struct for both targets and allocates resource bindings
    ///
    /// # Arguments
    /// * `manifest` - Parsed generator input
    ///
    /// # Returns
    /// * `Result<CompiledManifest>` - Validated input for the emitters, or the first error found
    pub fn compile(manifest: &Manifest) -> Result<Self> {
        let constants = resolve_constants(&manifest.constants, &manifest.shader_constants, &manifest.guards)?;

        let host_vocabulary = manifest.options.host_vocabulary();
        let shader_vocabulary = TypeVocabulary::shader();

        let mut host_structs = Vec::new();
        let mut shader_structs = Vec::with_capacity(manifest.structs.len());
        for desc in &manifest.structs {
            if desc.applies_to(Target::Host) {
                host_structs.push(compile_struct(desc, &host_vocabulary)?);
            }
            shader_structs.push(compile_struct(desc, &shader_vocabulary)?);
        }

        let table = allocate(&manifest.resources, &manifest.naming)?;

        Ok(Self {
            options: manifest.options.clone(),
            naming: manifest.naming.clone(),
            constants,
            host_structs,
            shader_structs,
            resources: manifest.resources.clone(),
            table,
        })
    }

    /// Returns true if the image instance at `index` belongs to an attachment resource
    pub fn is_attachment(&self, index: usize) -> bool {
        self.resources[self.table.instances[index].descriptor].is_attachment()
    }
}

/// The four generated files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub host_common_header: String,
    pub host_resource_header: String,
    pub host_resource_source: String,
    pub shader_common_header: String,
}

impl GeneratedArtifacts {
    /// Pairs every artifact with its file name
    pub fn files(&self) -> [(&'static str, &str); 4] {
        [
            (HOST_COMMON_HEADER, &self.host_common_header),
            (HOST_RESOURCE_HEADER, &self.host_resource_header),
            (HOST_RESOURCE_SOURCE, &self.host_resource_source),
            (SHADER_COMMON_HEADER, &self.shader_common_header),
        ]
    }

    /// Writes every artifact into `dir`
    ///
    /// # Arguments
    /// * `dir` - Existing output directory
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        for (file_name, content) in self.files() {
            let path = dir.join(file_name);
            std::fs::write(&path, content)?;
            tracing::info!("Wrote {}", path.display());
        }
        Ok(())
    }
}

/// Compiles a manifest and renders all four artifacts
pub fn generate(manifest: &Manifest) -> Result<GeneratedArtifacts> {
    let compiled = CompiledManifest::compile(manifest)?;
    Ok(render(&compiled))
}

/// Renders all four artifacts from an already compiled manifest
pub fn render(compiled: &CompiledManifest) -> GeneratedArtifacts {
    GeneratedArtifacts {
        host_common_header: host_common_header(compiled),
        host_resource_header: host_resource_header(compiled),
        host_resource_source: host_resource_source(compiled),
        shader_common_header: shader_common_header(compiled),
    }
}

fn push_banner(output: &mut String, options: &EmitOptions) {
    output.push_str(&format!("{}\n\n", options.banner));
}

fn push_defines(output: &mut String, constants: &[ResolvedConstant]) {
    if constants.is_empty() {
        return;
    }
    for constant in constants {
        output.push_str(&constant.define());
        output.push('\n');
    }
    output.push('\n');
}

fn push_structs(output: &mut String, structs: &[CompiledStruct]) {
    for compiled in structs {
        output.push_str(&compiled.to_text());
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predefined::default_manifest;

    const SMALL_MANIFEST: &str = r#"
options:
  namespace: Test
constants:
  - { name: COUNT, value: 4 }
shader_constants:
  - { name: EPSILON, expr: "0.001" }
structs:
  - name: ShExample
    layout: std430
    members:
      - { type: float32, name: a }
      - { type: float32, dim: 3, name: b }
  - name: ShShaderSide
    shader_only: true
    members:
      - { type: uint32, name: x }
resources:
  - { name: A, type: float16, channels: rgba }
  - { name: B, type: uint32, channels: r, flags: [store_prev] }
"#;

    #[test]
    fn test_generate_small_manifest() {
        let manifest = Manifest::from_yaml(SMALL_MANIFEST).unwrap();
        let compiled = CompiledManifest::compile(&manifest).unwrap();

        assert_eq!(compiled.host_structs.len(), 1);
        assert_eq!(compiled.shader_structs.len(), 2);
        assert_eq!(compiled.host_structs[0].size, 32);
        assert_eq!(compiled.table.len(), 3);

        let artifacts = render(&compiled);
        assert!(artifacts.host_common_header.contains("#define COUNT (4)"));
        assert!(!artifacts.host_common_header.contains("EPSILON"));
        assert!(!artifacts.host_common_header.contains("ShShaderSide"));
        assert!(artifacts.shader_common_header.contains("#define EPSILON (0.001)"));
        assert!(artifacts.shader_common_header.contains("struct ShShaderSide"));
    }

    #[test]
    fn test_generation_is_idempotent() {
        let manifest = default_manifest().unwrap();
        let first = generate(&manifest).unwrap();
        let second = generate(&manifest).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_failure_produces_nothing() {
        let yaml = r#"
structs:
  - name: ShBroken
    members:
      - { type: float32, name: a, count: 0 }
"#;
        let manifest = Manifest::from_yaml(yaml).unwrap();
        assert!(generate(&manifest).is_err());
    }

    #[test]
    fn test_write_to_dir() {
        let manifest = Manifest::from_yaml(SMALL_MANIFEST).unwrap();
        let artifacts = generate(&manifest).unwrap();

        let dir = std::env::temp_dir().join(format!("shadergen-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        artifacts.write_to_dir(&dir).unwrap();

        for (file_name, content) in artifacts.files() {
            let written = std::fs::read_to_string(dir.join(file_name)).unwrap();
            assert_eq!(written, content);
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
