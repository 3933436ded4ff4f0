//! Struct layout compiler
//!
//! Compiles a [`StructDescriptor`] into the declaration text of one target. Under the
//! packed rule, spellings without a named type pad 3-component vector elements and
//! 3-row matrix columns to four scalars, so the emitted declaration occupies exactly
//! the packed GPU footprint and every target receives the same padding fields.

use super::{LayoutPolicy, MemberDescriptor, StructDescriptor};
use crate::error::{Error, Result};
use crate::types::{self, Shape, Target, TypeVocabulary};
use serde::Serialize;
use std::collections::HashSet;

/// Total size of a packed struct must be a multiple of this
pub const PACKED_STRUCT_ALIGNMENT: u32 = 16;

/// Every struct-capable scalar is 32 bits wide
const SCALAR_SIZE: u32 = 4;

/// A field of a compiled struct, either a declared member or inserted padding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledField {
    pub name: String,
    /// Target spelling of the element type
    pub type_name: &'static str,
    /// Array extents, outermost first; empty for a plain value
    pub extents: Vec<u32>,
    /// Byte offset of the field under the struct's layout rule
    pub offset: u32,
    /// Bytes occupied by the emitted declaration
    pub size: u32,
    pub is_padding: bool,
}

impl CompiledField {
    /// Declaration line without indentation, e.g. `float position[3];`
    pub fn declaration(&self) -> String {
        let extents: String = self.extents.iter().map(|extent| format!("[{extent}]")).collect();
        format!("{} {}{};", self.type_name, self.name, extents)
    }
}

/// Result of compiling one struct for one target
#[derive(Debug, Clone, Serialize)]
pub struct CompiledStruct {
    pub name: String,
    pub target: Target,
    pub layout: LayoutPolicy,
    pub fields: Vec<CompiledField>,
    /// Total size in bytes, including trailing padding
    pub size: u32,
    /// Non-fatal diagnostics raised while compiling
    pub advisories: Vec<String>,
}

impl CompiledStruct {
    /// Renders the struct declaration
    pub fn to_text(&self) -> String {
        let mut output = format!("struct {}\n{{\n", self.name);
        for field in &self.fields {
            output.push_str("    ");
            output.push_str(&field.declaration());
            output.push('\n');
        }
        output.push_str("};\n");
        output
    }

    /// Fields that correspond to descriptor members
    pub fn members(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields.iter().filter(|field| !field.is_padding)
    }
}

/// Rounds `value` up to a multiple of `alignment`
pub fn align(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// Rounds an element count up to a multiple of 4
pub fn align4(value: u32) -> u32 {
    align(value, 4)
}

/// Compiles a struct descriptor into the declarations of one target
///
/// # Arguments
/// * `desc` - The struct to compile
/// * `vocabulary` - Type spellings of the target
///
/// # Returns
/// The compiled struct, or an error if a type is unknown, the descriptor is
/// malformed, or the packed layout cannot be completed
pub fn compile_struct(desc: &StructDescriptor, vocabulary: &TypeVocabulary) -> Result<CompiledStruct> {
    let compiler = StructCompiler::new(desc, vocabulary);
    compiler.compile()
}

/// Per-invocation state: padding numbering and the running offset start at zero for
/// every struct
struct StructCompiler<'a> {
    desc: &'a StructDescriptor,
    vocabulary: &'a TypeVocabulary,
    fields: Vec<CompiledField>,
    offset: u32,
    pad_index: u32,
}

impl<'a> StructCompiler<'a> {
    fn new(desc: &'a StructDescriptor, vocabulary: &'a TypeVocabulary) -> Self {
        Self {
            desc,
            vocabulary,
            fields: Vec::with_capacity(desc.members.len()),
            offset: 0,
            pad_index: 0,
        }
    }

    fn compile(mut self) -> Result<CompiledStruct> {
        self.validate()?;

        let mut advisories = Vec::new();
        if self.desc.layout == LayoutPolicy::Uniform && self.vocabulary.target == Target::Host {
            let advisory = format!("struct \"{}\" is using std140, alignment must be set manually", self.desc.name);
            tracing::warn!("{advisory}");
            advisories.push(advisory);
        }

        for member in &self.desc.members {
            self.push_member(member)?;
        }

        if self.desc.layout == LayoutPolicy::Packed && self.offset % PACKED_STRUCT_ALIGNMENT != 0 {
            let gap = align(self.offset, PACKED_STRUCT_ALIGNMENT) - self.offset;
            if gap % 4 != 0 {
                return Err(self.layout_error(format!("size {} is not 4-byte aligned", self.offset)));
            }
            self.push_padding(gap / 4)?;
        }

        tracing::debug!(name = %self.desc.name, target = self.vocabulary.target.label(), size = self.offset, "compiled struct");

        Ok(CompiledStruct {
            name: self.desc.name.clone(),
            target: self.vocabulary.target,
            layout: self.desc.layout,
            fields: self.fields,
            size: self.offset,
            advisories,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.desc.members.is_empty() {
            return Err(self.invariant_error("struct has no members".to_string()));
        }

        let mut names = HashSet::new();
        for member in &self.desc.members {
            if !member.dimension.is_supported() {
                return Err(self.invariant_error(format!("member `{}` has unsupported dimension code {}", member.name, member.dimension)));
            }
            if member.count == 0 {
                return Err(self.invariant_error(format!("member `{}` has a repeat count of 0", member.name)));
            }
            if !names.insert(member.name.as_str()) {
                return Err(self.invariant_error(format!("member `{}` is declared twice", member.name)));
            }
        }

        Ok(())
    }

    fn push_member(&mut self, member: &MemberDescriptor) -> Result<()> {
        let (type_name, extents, named) = self.declare(member)?;
        let (footprint, alignment) = self.member_footprint(member)?;

        // Named types follow the GPU rule; scalar arrays occupy exactly what they declare
        let size = if named { footprint } else { SCALAR_SIZE * extents.iter().product::<u32>() };

        if self.desc.layout == LayoutPolicy::Packed {
            if size != footprint {
                return Err(self.layout_error(format!(
                    "`{}` is declared with {size} bytes but occupies {footprint} bytes on the GPU",
                    member.name
                )));
            }

            let aligned = align(self.offset, alignment);
            let gap = aligned - self.offset;
            if gap % 4 != 0 {
                return Err(self.layout_error(format!("gap of {gap} bytes before `{}` is not 4-byte aligned", member.name)));
            }
            self.push_padding(gap / 4)?;
        }

        self.fields.push(CompiledField {
            name: member.name.clone(),
            type_name,
            extents,
            offset: self.offset,
            size,
            is_padding: false,
        });
        self.offset += size;

        Ok(())
    }

    /// Scalars per vector element or matrix column in a scalar-array spelling
    fn slot(&self, components: u8) -> u32 {
        if self.desc.layout == LayoutPolicy::Packed && components == 3 { 4 } else { components as u32 }
    }

    /// Chooses the element type spelling and array extents of a member
    ///
    /// The flag is true when the target spells the member with a named vector or
    /// matrix type.
    fn declare(&self, member: &MemberDescriptor) -> Result<(&'static str, Vec<u32>, bool)> {
        let scalar_name = self.vocabulary.lookup_scalar(member.base_type)?;
        let shape = member.dimension.shape();
        let named = match shape {
            Shape::Scalar => None,
            _ => self.vocabulary.lookup_composite(member.base_type, member.dimension),
        };
        let multidimensional = self.vocabulary.multidimensional_arrays;

        if member.count == 1 {
            return Ok(match (shape, named) {
                (Shape::Scalar, _) => (scalar_name, vec![], false),
                (_, Some(name)) => (name, vec![], true),
                (Shape::Vector(n), None) => (scalar_name, vec![n as u32], false),
                (Shape::Matrix { columns, rows }, None) => {
                    let slot = self.slot(rows);
                    if multidimensional {
                        (scalar_name, vec![columns as u32, slot], false)
                    } else {
                        (scalar_name, vec![columns as u32 * slot], false)
                    }
                }
            });
        }

        let count = member.count;
        if shape != Shape::Scalar && self.desc.break_policy.flattens(self.vocabulary.target) {
            // A 3-vector occupies a 4-vector slot on the GPU
            return Ok((scalar_name, vec![align4(count * member.dimension.components())], false));
        }

        Ok(match (shape, named) {
            (Shape::Scalar, _) => (scalar_name, vec![count], false),
            (_, Some(name)) => (name, vec![count], true),
            (Shape::Vector(n), None) => (scalar_name, vec![count, self.slot(n)], false),
            (Shape::Matrix { columns, rows }, None) => {
                let slot = self.slot(rows);
                if multidimensional {
                    (scalar_name, vec![count, columns as u32, slot], false)
                } else {
                    (scalar_name, vec![count, columns as u32 * slot], false)
                }
            }
        })
    }

    /// Size and alignment of a member under the packed GPU rule
    fn member_footprint(&self, member: &MemberDescriptor) -> Result<(u32, u32)> {
        let alignment = types::packed_alignment(member.base_type, member.dimension)?;
        let packed = types::packed_size(member.base_type, member.dimension)?;

        let size = if member.count > 1 {
            member.count * packed
        } else if let Shape::Vector(_) = member.dimension.shape() {
            // A lone vector ends right after its last component
            types::native_size(member.base_type, member.dimension)?
        } else {
            packed
        };

        Ok((size, alignment))
    }

    fn push_padding(&mut self, uint32_count: u32) -> Result<()> {
        let type_name = self.vocabulary.lookup_scalar(types::ScalarType::Uint32)?;
        for _ in 0..uint32_count {
            self.fields.push(CompiledField {
                name: format!("__pad{}", self.pad_index),
                type_name,
                extents: vec![],
                offset: self.offset,
                size: 4,
                is_padding: true,
            });
            self.pad_index += 1;
            self.offset += 4;
        }
        Ok(())
    }

    fn layout_error(&self, reason: String) -> Error {
        Error::Layout {
            struct_name: self.desc.name.clone(),
            reason,
        }
    }

    fn invariant_error(&self, reason: String) -> Error {
        Error::DescriptorInvariant {
            descriptor: self.desc.name.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BreakPolicy;
    use crate::types::{Dimension, ScalarType};

    fn member(base_type: ScalarType, dim: u8, name: &str, count: u32) -> MemberDescriptor {
        MemberDescriptor::new(base_type, Dimension::new(dim).unwrap(), name, count)
    }

    fn packed(name: &str, members: Vec<MemberDescriptor>) -> StructDescriptor {
        StructDescriptor {
            name: name.to_string(),
            members,
            shader_only: false,
            layout: LayoutPolicy::Packed,
            break_policy: BreakPolicy::None,
        }
    }

    /// Checks the packed-rule invariants: gapless fields and a size multiple of 16
    fn assert_packed_invariants(compiled: &CompiledStruct) {
        assert_eq!(compiled.size % PACKED_STRUCT_ALIGNMENT, 0, "size of {} is {}", compiled.name, compiled.size);
        let mut expected_offset = 0;
        for field in &compiled.fields {
            assert_eq!(field.offset, expected_offset, "field {} of {} is misplaced", field.name, compiled.name);
            expected_offset = field.offset + field.size;
        }
        assert_eq!(expected_offset, compiled.size);
    }

    #[test]
    fn test_scalar_then_vec3_is_padded() {
        let desc = packed("ShExample", vec![member(ScalarType::Float32, 1, "a", 1), member(ScalarType::Float32, 3, "b", 1)]);

        let compiled = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        assert_packed_invariants(&compiled);

        let a = &compiled.fields[0];
        assert_eq!((a.name.as_str(), a.offset, a.size), ("a", 0, 4));

        let pads: Vec<_> = compiled.fields[1..4].iter().map(|field| field.name.as_str()).collect();
        assert_eq!(pads, ["__pad0", "__pad1", "__pad2"]);

        let b = &compiled.fields[4];
        assert_eq!((b.name.as_str(), b.offset, b.size), ("b", 16, 12));

        assert_eq!(compiled.fields[5].name, "__pad3");
        assert_eq!(compiled.fields.len(), 6);
        assert_eq!(compiled.size, 32);

        assert_eq!(
            compiled.to_text(),
            "struct ShExample\n{\n    float a;\n    uint32_t __pad0;\n    uint32_t __pad1;\n    uint32_t __pad2;\n    float b[3];\n    uint32_t __pad3;\n};\n"
        );
    }

    #[test]
    fn test_shader_uses_named_types() {
        let desc = packed("ShExample", vec![member(ScalarType::Float32, 1, "a", 1), member(ScalarType::Float32, 3, "b", 1)]);

        let compiled = compile_struct(&desc, &TypeVocabulary::shader()).unwrap();
        assert_eq!(
            compiled.to_text(),
            "struct ShExample\n{\n    float a;\n    uint __pad0;\n    uint __pad1;\n    uint __pad2;\n    vec3 b;\n    uint __pad3;\n};\n"
        );
    }

    #[test]
    fn test_padding_resets_per_struct() {
        let desc = packed("ShOne", vec![member(ScalarType::Uint32, 1, "x", 1)]);

        let first = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        let second = compile_struct(&desc, &TypeVocabulary::host()).unwrap();

        let names: Vec<_> = second.fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, ["x", "__pad0", "__pad1", "__pad2"]);
        assert_eq!(first.to_text(), second.to_text());
    }

    #[test]
    fn test_vec2_alignment() {
        let desc = packed(
            "ShVec2",
            vec![
                member(ScalarType::Uint32, 1, "flags", 1),
                member(ScalarType::Float32, 2, "uv", 1),
                member(ScalarType::Float32, 4, "color", 1),
            ],
        );

        let compiled = compile_struct(&desc, &TypeVocabulary::shader()).unwrap();
        assert_packed_invariants(&compiled);

        let offsets: Vec<_> = compiled.members().map(|field| (field.name.as_str(), field.offset)).collect();
        assert_eq!(offsets, [("flags", 0), ("uv", 8), ("color", 16)]);
        assert_eq!(compiled.size, 32);
    }

    #[test]
    fn test_already_aligned_struct_has_no_padding() {
        let desc = packed(
            "ShPortal",
            vec![member(ScalarType::Float32, 4, "inPosition", 1), member(ScalarType::Float32, 4, "outPosition", 1)],
        );

        let compiled = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        assert!(compiled.fields.iter().all(|field| !field.is_padding));
        assert_eq!(compiled.size, 32);
    }

    #[test]
    fn test_matrix_declarations() {
        let desc = StructDescriptor {
            layout: LayoutPolicy::None,
            ..packed("ShMatrices", vec![member(ScalarType::Float32, 44, "model", 1), member(ScalarType::Float32, 32, "uvTransform", 1)])
        };

        let host = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        assert_eq!(host.fields[0].declaration(), "float model[16];");
        assert_eq!(host.fields[1].declaration(), "float uvTransform[6];");

        let multidimensional = TypeVocabulary {
            multidimensional_arrays: true,
            ..TypeVocabulary::host()
        };
        let host = compile_struct(&desc, &multidimensional).unwrap();
        assert_eq!(host.fields[0].declaration(), "float model[4][4];");
        assert_eq!(host.fields[1].declaration(), "float uvTransform[3][2];");

        let shader = compile_struct(&desc, &TypeVocabulary::shader()).unwrap();
        assert_eq!(shader.fields[0].declaration(), "mat4 model;");
        assert_eq!(shader.fields[1].declaration(), "mat3x2 uvTransform;");
    }

    #[test]
    fn test_repeated_members() {
        let desc = StructDescriptor {
            layout: LayoutPolicy::None,
            ..packed(
                "ShRepeated",
                vec![
                    member(ScalarType::Uint32, 1, "histogram", 256),
                    member(ScalarType::Float32, 3, "points", 2),
                    member(ScalarType::Float32, 44, "cubemapViews", 6),
                ],
            )
        };

        let host = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        let declarations: Vec<_> = host.fields.iter().map(CompiledField::declaration).collect();
        assert_eq!(declarations, ["uint32_t histogram[256];", "float points[2][3];", "float cubemapViews[6][16];"]);

        let shader = compile_struct(&desc, &TypeVocabulary::shader()).unwrap();
        let declarations: Vec<_> = shader.fields.iter().map(CompiledField::declaration).collect();
        assert_eq!(declarations, ["uint histogram[256];", "vec3 points[2];", "mat4 cubemapViews[6];"]);
    }

    #[test]
    fn test_break_policy_flattens_repeated_members() {
        let desc = StructDescriptor {
            layout: LayoutPolicy::Uniform,
            break_policy: BreakPolicy::HostOnly,
            ..packed(
                "ShGlobalUniform",
                vec![
                    member(ScalarType::Float32, 44, "viewProjCubemap", 6),
                    member(ScalarType::Float32, 3, "points", 3),
                    member(ScalarType::Uint32, 1, "ids", 5),
                ],
            )
        };

        let host = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        let declarations: Vec<_> = host.fields.iter().map(CompiledField::declaration).collect();
        assert_eq!(declarations, ["float viewProjCubemap[96];", "float points[12];", "uint32_t ids[5];"]);

        let shader = compile_struct(&desc, &TypeVocabulary::shader()).unwrap();
        let declarations: Vec<_> = shader.fields.iter().map(CompiledField::declaration).collect();
        assert_eq!(declarations, ["mat4 viewProjCubemap[6];", "vec3 points[3];", "uint ids[5];"]);
    }

    #[test]
    fn test_uniform_on_host_is_advisory() {
        let desc = StructDescriptor {
            layout: LayoutPolicy::Uniform,
            ..packed("ShUniform", vec![member(ScalarType::Float32, 3, "position", 1), member(ScalarType::Uint32, 1, "normal", 1)])
        };

        let host = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        assert_eq!(host.advisories.len(), 1);
        assert!(host.fields.iter().all(|field| !field.is_padding));

        let shader = compile_struct(&desc, &TypeVocabulary::shader()).unwrap();
        assert!(shader.advisories.is_empty());
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let desc = packed("ShBroken", vec![member(ScalarType::Float32, 1, "value", 0)]);
        let result = compile_struct(&desc, &TypeVocabulary::host());
        assert!(matches!(result, Err(Error::DescriptorInvariant { .. })));
    }

    #[test]
    fn test_duplicate_member_is_rejected() {
        let desc = packed("ShBroken", vec![member(ScalarType::Float32, 1, "value", 1), member(ScalarType::Uint32, 1, "value", 1)]);
        let result = compile_struct(&desc, &TypeVocabulary::shader());
        assert!(matches!(result, Err(Error::DescriptorInvariant { .. })));
    }

    #[test]
    fn test_image_only_type_is_unknown() {
        let desc = packed("ShBroken", vec![member(ScalarType::Float16, 1, "half", 1)]);
        let result = compile_struct(&desc, &TypeVocabulary::host());
        assert!(matches!(result, Err(Error::UnknownType(_))));
    }

    #[test]
    fn test_packed_three_row_matrix_pads_host_columns() {
        let desc = packed("ShBasis", vec![member(ScalarType::Float32, 1, "scale", 1), member(ScalarType::Float32, 33, "basis", 1)]);

        let host = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        assert_packed_invariants(&host);
        let basis = host.members().nth(1).unwrap();
        assert_eq!(basis.declaration(), "float basis[12];");
        assert_eq!((basis.offset, basis.size), (16, 48));
        assert_eq!(host.size, 64);

        let multidimensional = TypeVocabulary {
            multidimensional_arrays: true,
            ..TypeVocabulary::host()
        };
        let host = compile_struct(&desc, &multidimensional).unwrap();
        assert_eq!(host.members().nth(1).unwrap().declaration(), "float basis[3][4];");

        let shader = compile_struct(&desc, &TypeVocabulary::shader()).unwrap();
        assert_packed_invariants(&shader);
        assert_eq!(shader.members().nth(1).unwrap().declaration(), "mat3 basis;");
        assert_eq!(shader.size, 64);
    }

    #[test]
    fn test_packed_repeated_vec3_pads_host_elements() {
        let desc = packed("ShPoints", vec![member(ScalarType::Float32, 3, "d", 2), member(ScalarType::Float32, 1, "x", 1)]);

        let host = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        assert_packed_invariants(&host);
        let declarations: Vec<_> = host.fields.iter().map(CompiledField::declaration).collect();
        assert_eq!(declarations, ["float d[2][4];", "float x;", "uint32_t __pad0;", "uint32_t __pad1;", "uint32_t __pad2;"]);
        assert_eq!(host.fields[0].size, 32);
        assert_eq!(host.size, 48);

        let shader = compile_struct(&desc, &TypeVocabulary::shader()).unwrap();
        assert_eq!(shader.fields[0].declaration(), "vec3 d[2];");
        assert_eq!(shader.size, 48);
    }

    #[test]
    fn test_packed_flattening_must_match_gpu_stride() {
        let desc = StructDescriptor {
            break_policy: BreakPolicy::HostOnly,
            ..packed("ShFlattened", vec![member(ScalarType::Float32, 2, "uv", 3)])
        };
        let result = compile_struct(&desc, &TypeVocabulary::host());
        assert!(matches!(result, Err(Error::Layout { .. })), "{result:?}");

        let desc = StructDescriptor {
            break_policy: BreakPolicy::HostOnly,
            ..packed("ShFlattened", vec![member(ScalarType::Float32, 3, "points", 3), member(ScalarType::Float32, 44, "views", 2)])
        };
        let host = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        assert_packed_invariants(&host);
        let declarations: Vec<_> = host.fields.iter().map(CompiledField::declaration).collect();
        assert_eq!(declarations, ["float points[12];", "float views[32];"]);
    }

    #[test]
    fn test_unpacked_sizes_follow_declarations() {
        let desc = StructDescriptor {
            layout: LayoutPolicy::None,
            ..packed("ShLoose", vec![member(ScalarType::Float32, 3, "points", 2)])
        };

        let host = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        assert_eq!(host.fields[0].declaration(), "float points[2][3];");
        assert_eq!(host.size, 24);
    }

    #[test]
    fn test_host_and_shader_share_offsets() {
        let desc = packed(
            "ShGeometryInstance",
            vec![
                member(ScalarType::Float32, 4, "model_0", 1),
                member(ScalarType::Uint32, 1, "flags", 1),
                member(ScalarType::Float32, 3, "tint", 1),
                member(ScalarType::Float32, 2, "uv", 1),
                member(ScalarType::Float32, 44, "transform", 1),
                member(ScalarType::Int32, 1, "vertexOffset", 1),
            ],
        );

        let host = compile_struct(&desc, &TypeVocabulary::host()).unwrap();
        let shader = compile_struct(&desc, &TypeVocabulary::shader()).unwrap();
        assert_packed_invariants(&host);
        assert_packed_invariants(&shader);

        let host_layout: Vec<_> = host.fields.iter().map(|field| (field.name.clone(), field.offset, field.size)).collect();
        let shader_layout: Vec<_> = shader.fields.iter().map(|field| (field.name.clone(), field.offset, field.size)).collect();
        assert_eq!(host_layout, shader_layout);
        assert_eq!(host.size, shader.size);
    }
}
