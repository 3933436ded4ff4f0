//! Struct descriptors
//!
//! Descriptors are plain data, normally deserialized from the YAML manifest.

use crate::types::{Dimension, ScalarType, Target};
use serde::{Deserialize, Serialize};

/// A single struct member
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemberDescriptor {
    /// Base element type
    #[serde(rename = "type")]
    pub base_type: ScalarType,
    /// Scalar, vector or matrix dimension code
    #[serde(rename = "dim", default = "default_dimension")]
    pub dimension: Dimension,
    /// Member name, identical in every target
    pub name: String,
    /// Number of repeated elements (must be at least 1)
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_dimension() -> Dimension {
    Dimension::SCALAR
}

fn default_count() -> u32 {
    1
}

impl MemberDescriptor {
    pub fn new(base_type: ScalarType, dimension: Dimension, name: &str, count: u32) -> Self {
        Self {
            base_type,
            dimension,
            name: name.to_string(),
            count,
        }
    }
}

/// How member offsets are established
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum LayoutPolicy {
    /// Members are emitted exactly as declared
    #[default]
    #[serde(rename = "none")]
    None,
    /// Storage-buffer rule: padding is computed and inserted automatically
    #[serde(rename = "std430")]
    Packed,
    /// Uniform-buffer rule: member order is trusted to be aligned already
    #[serde(rename = "std140")]
    Uniform,
}

/// Which targets flatten repeated vector and matrix members into scalar arrays
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum BreakPolicy {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "all")]
    All,
    #[serde(rename = "host_only")]
    HostOnly,
}

impl BreakPolicy {
    /// Returns true if repeated non-scalar members are flattened for `target`
    pub fn flattens(self, target: Target) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::HostOnly => target == Target::Host,
        }
    }
}

/// A GPU-visible struct
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StructDescriptor {
    /// Type name in every target
    pub name: String,
    /// Members in declaration order
    pub members: Vec<MemberDescriptor>,
    /// Emit only into shader artifacts
    #[serde(default)]
    pub shader_only: bool,
    #[serde(default)]
    pub layout: LayoutPolicy,
    #[serde(default, rename = "break")]
    pub break_policy: BreakPolicy,
}

impl StructDescriptor {
    /// Returns true if this struct is emitted for `target`
    pub fn applies_to(&self, target: Target) -> bool {
        !(self.shader_only && target == Target::Host)
    }
}
