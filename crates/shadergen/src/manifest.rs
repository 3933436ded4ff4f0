//! Descriptor manifest parser
//!
//! A manifest is a YAML document holding every hand-authored table the generator
//! consumes: constants, structs, image resources and the naming options used when
//! emitting them. Optional sections default to empty lists.

use crate::constants::{ConstantDescriptor, ConstantGuard};
use crate::error::Result;
use crate::layout::StructDescriptor;
use crate::resources::{ImageResourceDescriptor, ResourceNaming};
use crate::types::TypeVocabulary;
use serde::{Deserialize, Serialize};

fn default_namespace() -> String {
    "RTGL1".to_string()
}

fn default_banner() -> String {
    "// This file was generated by shadergen".to_string()
}

fn default_host_includes() -> Vec<String> {
    vec!["../Common.h".to_string()]
}

/// Options that shape the emitted files rather than their content
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmitOptions {
    /// Host namespace wrapping every declaration
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// First line of every generated file
    #[serde(default = "default_banner")]
    pub banner: String,
    /// Headers included by the host resource header
    #[serde(default = "default_host_includes")]
    pub host_includes: Vec<String>,
    /// Declare host matrices as `[rows][cols]` instead of flat arrays
    #[serde(default)]
    pub multidimensional_arrays: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            banner: default_banner(),
            host_includes: default_host_includes(),
            multidimensional_arrays: false,
        }
    }
}

impl EmitOptions {
    /// Host vocabulary honoring the multidimensional array switch
    pub fn host_vocabulary(&self) -> TypeVocabulary {
        TypeVocabulary {
            multidimensional_arrays: self.multidimensional_arrays,
            ..TypeVocabulary::host()
        }
    }
}

/// Complete generator input
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub options: EmitOptions,
    /// Constants emitted into every artifact
    #[serde(default)]
    pub constants: Vec<ConstantDescriptor>,
    /// Constants emitted only into the shader artifact
    #[serde(default)]
    pub shader_constants: Vec<ConstantDescriptor>,
    #[serde(default)]
    pub guards: Vec<ConstantGuard>,
    #[serde(default)]
    pub structs: Vec<StructDescriptor>,
    /// Image resources in binding order
    #[serde(default)]
    pub resources: Vec<ImageResourceDescriptor>,
    #[serde(default)]
    pub naming: ResourceNaming,
}

impl Manifest {
    /// Parses a manifest from YAML content
    ///
    /// # Arguments
    /// * `yaml_content` - YAML string containing the manifest
    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        Ok(serde_norway::from_str(yaml_content)?)
    }

    /// Parses a manifest from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML manifest file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
