//! Type registry
//!
//! This module catalogues the scalar, vector and matrix types that may appear in
//! GPU-visible structs, how each target language spells them, and how many bytes
//! they occupy natively and under the packed (std430) GPU rule.

pub mod image_formats;

use crate::error::UnknownType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base element type of a struct member or an image pixel
///
/// Only `Float32`, `Int32` and `Uint32` can be used in structs; the remaining
/// types describe image storage formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Float32,
    Int32,
    Uint32,
    Unorm8,
    Uint8,
    Uint16,
    Float16,
    /// R11G11B10 packed float
    Pack11,
    /// E5B9G9R9 shared exponent, packed manually into a 32-bit word
    PackE5,
}

impl ScalarType {
    /// Returns true if values of this type can be struct members
    pub fn is_struct_member_type(self) -> bool {
        matches!(self, Self::Float32 | Self::Int32 | Self::Uint32)
    }
}

/// The shape encoded by a [`Dimension`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    /// Vector with 2, 3 or 4 components
    Vector(u8),
    /// Column-major matrix, spelled `mat{columns}x{rows}` in GLSL
    Matrix { columns: u8, rows: u8 },
}

/// Member dimension: `1` for scalars, `2..=4` for vectors, and a two-digit code for
/// matrices (`44` is a 4x4 matrix, `23` is two columns of three rows)
///
/// Deserialization keeps the raw code; unsupported codes are rejected when the
/// owning struct is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "u8", into = "u8")]
pub struct Dimension(u8);

impl Dimension {
    pub const SCALAR: Self = Self(1);

    /// Creates a dimension from its numeric code, rejecting unknown codes
    pub fn new(code: u8) -> Result<Self, String> {
        let dimension = Self(code);
        if dimension.is_supported() { Ok(dimension) } else { Err(format!("unsupported dimension code {code}")) }
    }

    /// Returns true for scalar, vector and 2..=4 by 2..=4 matrix codes
    pub fn is_supported(self) -> bool {
        match self.0 {
            1..=4 => true,
            22..=44 => (2..=4).contains(&(self.0 / 10)) && (2..=4).contains(&(self.0 % 10)),
            _ => false,
        }
    }

    /// Numeric code of this dimension
    pub fn code(self) -> u8 {
        self.0
    }

    pub fn shape(self) -> Shape {
        match self.0 {
            1 => Shape::Scalar,
            n @ 2..=4 => Shape::Vector(n),
            n => Shape::Matrix { columns: n / 10, rows: n % 10 },
        }
    }

    pub fn is_scalar(self) -> bool {
        self.0 == 1
    }

    /// Number of scalar components
    pub fn components(self) -> u32 {
        match self.shape() {
            Shape::Scalar => 1,
            Shape::Vector(n) => n as u32,
            Shape::Matrix { columns, rows } => columns as u32 * rows as u32,
        }
    }
}

impl From<u8> for Dimension {
    fn from(code: u8) -> Self {
        Self(code)
    }
}

impl From<Dimension> for u8 {
    fn from(value: Dimension) -> Self {
        value.0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output language of a generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Target {
    /// C/C++ host code
    Host,
    /// GLSL shader code
    Shader,
}

impl Target {
    pub fn label(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Shader => "shader",
        }
    }
}

/// Type spellings of one target language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeVocabulary {
    pub target: Target,
    /// Spell matrices without a named type as `[columns][rows]` instead of a flat array
    pub multidimensional_arrays: bool,
}

impl TypeVocabulary {
    pub fn host() -> Self {
        Self { target: Target::Host, multidimensional_arrays: false }
    }

    pub fn shader() -> Self {
        Self { target: Target::Shader, multidimensional_arrays: false }
    }

    /// Looks up the spelling of a scalar type
    pub fn lookup_scalar(&self, scalar: ScalarType) -> Result<&'static str, UnknownType> {
        let name = match (self.target, scalar) {
            (Target::Host, ScalarType::Float32) => "float",
            (Target::Host, ScalarType::Int32) => "int32_t",
            (Target::Host, ScalarType::Uint32) => "uint32_t",
            (Target::Shader, ScalarType::Float32) => "float",
            (Target::Shader, ScalarType::Int32) => "int",
            (Target::Shader, ScalarType::Uint32) => "uint",
            _ => {
                return Err(UnknownType::Scalar {
                    target: self.target.label(),
                    scalar,
                });
            }
        };
        Ok(name)
    }

    /// Looks up the named spelling of a vector or matrix type
    ///
    /// Returns `None` when the target has no named type for the pair; callers then
    /// fall back to an array of the scalar type.
    pub fn lookup_composite(&self, scalar: ScalarType, dimension: Dimension) -> Option<&'static str> {
        if self.target == Target::Host {
            return None;
        }
        let name = match (scalar, dimension.code()) {
            (ScalarType::Float32, 2) => "vec2",
            (ScalarType::Float32, 3) => "vec3",
            (ScalarType::Float32, 4) => "vec4",
            (ScalarType::Int32, 2) => "ivec2",
            (ScalarType::Int32, 3) => "ivec3",
            (ScalarType::Int32, 4) => "ivec4",
            (ScalarType::Uint32, 2) => "uvec2",
            (ScalarType::Uint32, 3) => "uvec3",
            (ScalarType::Uint32, 4) => "uvec4",
            (ScalarType::Float32, 22) => "mat2",
            (ScalarType::Float32, 23) => "mat2x3",
            (ScalarType::Float32, 24) => "mat2x4",
            (ScalarType::Float32, 32) => "mat3x2",
            (ScalarType::Float32, 33) => "mat3",
            (ScalarType::Float32, 34) => "mat3x4",
            (ScalarType::Float32, 42) => "mat4x2",
            (ScalarType::Float32, 43) => "mat4x3",
            (ScalarType::Float32, 44) => "mat4",
            _ => return None,
        };
        Some(name)
    }
}

fn require_struct_type(scalar: ScalarType, dimension: Dimension) -> Result<(), UnknownType> {
    if scalar.is_struct_member_type() { Ok(()) } else { Err(UnknownType::Sized { scalar, dimension }) }
}

fn vector_packed_size(components: u8) -> u32 {
    match components {
        1 => 4,
        2 => 8,
        _ => 16,
    }
}

/// Size in bytes of a value laid out contiguously, as the host sees it
pub fn native_size(scalar: ScalarType, dimension: Dimension) -> Result<u32, UnknownType> {
    require_struct_type(scalar, dimension)?;
    Ok(4 * dimension.components())
}

/// Size in bytes of a value under the packed GPU rule
///
/// Three-component vectors occupy a four-component slot, and matrix columns are
/// padded the same way.
pub fn packed_size(scalar: ScalarType, dimension: Dimension) -> Result<u32, UnknownType> {
    require_struct_type(scalar, dimension)?;
    Ok(match dimension.shape() {
        Shape::Scalar => 4,
        Shape::Vector(n) => vector_packed_size(n),
        Shape::Matrix { columns, rows } => columns as u32 * vector_packed_size(rows),
    })
}

/// Required start-offset alignment under the packed GPU rule
pub fn packed_alignment(scalar: ScalarType, dimension: Dimension) -> Result<u32, UnknownType> {
    require_struct_type(scalar, dimension)?;
    Ok(match dimension.shape() {
        Shape::Scalar => 4,
        Shape::Vector(n) => vector_packed_size(n),
        Shape::Matrix { rows, .. } => vector_packed_size(rows),
    })
}
