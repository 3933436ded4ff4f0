//! Cross-artifact comparison utilities
//!
//! This module compares host and shader struct layouts read back from generated
//! headers, and checks the invariants that keep the resource tables usable.

use crate::struct_parser::ParsedStruct;
use regex::Regex;
use shadergen::resources::{ResourceTable, SamplerBinding};
use std::collections::HashMap;
use std::sync::LazyLock;

static IMAGE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"layout\(set = \w+, binding = (\d+)(?:, \w+)?\) uniform \w+ (\w+);").unwrap());

/// Result of comparing one struct across the host and shader headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareResult {
    /// Same members, in the same order, with the same sizes
    Match,
    /// The struct is declared on the host but not in the shader header
    MissingInShader,
    /// The two declarations have a different number of fields
    FieldCountMismatch {
        /// Field count in the host header
        host_fields: usize,
        /// Field count in the shader header
        shader_fields: usize,
    },
    /// The first field whose name or size differs
    FieldMismatch {
        /// Position of the field, padding included
        index: usize,
        /// (name, size) on the host
        host: (String, u32),
        /// (name, size) in the shader
        shader: (String, u32),
    },
}

/// Compares every host struct against the shader struct of the same name
///
/// Shader-only structs have no host counterpart and are skipped.
///
/// # Arguments
/// * `host` - Structs parsed from the host header
/// * `shader` - Structs parsed from the shader header
///
/// # Returns
/// One (struct name, result) pair per host struct
pub fn compare_layouts(host: &[ParsedStruct], shader: &[ParsedStruct]) -> Vec<(String, CompareResult)> {
    let shader_by_name: HashMap<&str, &ParsedStruct> = shader.iter().map(|s| (s.name.as_str(), s)).collect();

    host.iter()
        .map(|host_struct| {
            let result = match shader_by_name.get(host_struct.name.as_str()) {
                Some(shader_struct) => compare_struct(host_struct, shader_struct),
                None => CompareResult::MissingInShader,
            };
            (host_struct.name.clone(), result)
        })
        .collect()
}

fn compare_struct(host: &ParsedStruct, shader: &ParsedStruct) -> CompareResult {
    for (index, (h, s)) in host.members.iter().zip(&shader.members).enumerate() {
        if h.name != s.name || h.size != s.size {
            return CompareResult::FieldMismatch {
                index,
                host: (h.name.clone(), h.size),
                shader: (s.name.clone(), s.size),
            };
        }
    }

    if host.members.len() != shader.members.len() {
        return CompareResult::FieldCountMismatch {
            host_fields: host.members.len(),
            shader_fields: shader.members.len(),
        };
    }

    CompareResult::Match
}

/// Checks the structural invariants of an allocated resource table
///
/// # Returns
/// A description of every violated invariant; empty when the table is consistent
pub fn check_resource_table(table: &ResourceTable) -> Vec<String> {
    let mut violations = Vec::new();
    let len = table.len();

    let lengths = [
        ("formats", table.formats.len()),
        ("shader_formats", table.shader_formats.len()),
        ("flags", table.flags.len()),
        ("bindings", table.bindings.len()),
        ("bindings_swapped", table.bindings_swapped.len()),
        ("sampler_bindings", table.sampler_bindings.len()),
        ("sampler_bindings_swapped", table.sampler_bindings_swapped.len()),
        ("debug_names", table.debug_names.len()),
    ];
    for (name, table_len) in lengths {
        if table_len != len {
            violations.push(format!("{name} has {table_len} entries, expected {len}"));
        }
    }
    if !violations.is_empty() {
        return violations;
    }

    for i in 0..len {
        if table.bindings[i] != i as u32 {
            violations.push(format!("binding of instance {i} is {}", table.bindings[i]));
        }

        let partner = table.bindings_swapped[i] as usize;
        if table.bindings_swapped.get(partner) != Some(&(i as u32)) {
            violations.push(format!("swapped binding of instance {i} is not an involution"));
        }

        let (current, swapped) = (table.sampler_bindings[i], table.sampler_bindings_swapped[i]);
        if current.is_valid() != swapped.is_valid() {
            violations.push(format!("sampler bindings of instance {i} disagree on validity"));
        }
        if let SamplerBinding::Bound(binding) = current {
            if (binding as usize) < len {
                violations.push(format!("sampler binding {binding} of instance {i} overlaps the image bindings"));
            }
        }
    }

    violations
}

/// Reads `identifier -> binding` for every image and sampler declaration in a shader header
pub fn parse_shader_bindings(text: &str) -> HashMap<String, u32> {
    IMAGE_DECLARATION
        .captures_iter(text)
        .filter_map(|captures| Some((captures[2].to_string(), captures[1].parse().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::struct_parser::{Language, parse_structs};
    use shadergen::resources::{ImageResourceDescriptor, ResourceInstance, ResourceNaming, allocate};
    use shadergen::types::{ScalarType, image_formats::ChannelLayout};

    const HOST: &str = r#"
struct ShExample
{
    float a;
    uint32_t __pad0;
    uint32_t __pad1;
    uint32_t __pad2;
    float b[3];
    uint32_t __pad3;
};
"#;

    #[test]
    fn test_matching_layouts() {
        let shader = HOST.replace("uint32_t", "uint").replace("float b[3]", "vec3 b");
        let host = parse_structs(HOST, Language::C).unwrap();
        let shader = parse_structs(&shader, Language::Glsl).unwrap();

        let results = compare_layouts(&host, &shader);
        assert_eq!(results, [("ShExample".to_string(), CompareResult::Match)]);
    }

    #[test]
    fn test_vec3_array_mismatch() {
        let host = parse_structs("struct S\n{\n    float d[2][3];\n};\n", Language::C).unwrap();
        let shader = parse_structs("struct S\n{\n    vec3 d[2];\n};\n", Language::Glsl).unwrap();

        let results = compare_layouts(&host, &shader);
        assert_eq!(
            results[0].1,
            CompareResult::FieldMismatch {
                index: 0,
                host: ("d".to_string(), 24),
                shader: ("d".to_string(), 32),
            }
        );
    }

    #[test]
    fn test_missing_and_count_mismatch() {
        let host = parse_structs("struct A\n{\n    float x;\n};\nstruct B\n{\n    float x;\n    float y;\n};\n", Language::C).unwrap();
        let shader = parse_structs("struct B\n{\n    float x;\n};\n", Language::Glsl).unwrap();

        let results = compare_layouts(&host, &shader);
        assert_eq!(results[0].1, CompareResult::MissingInShader);
        assert_eq!(results[1].1, CompareResult::FieldCountMismatch { host_fields: 2, shader_fields: 1 });
    }

    fn instance(name: &str) -> ResourceInstance {
        ResourceInstance {
            descriptor: 0,
            name: name.to_string(),
            enum_name: name.to_uppercase(),
            is_history: false,
        }
    }

    #[test]
    fn test_broken_table_reported() {
        let table = ResourceTable {
            instances: vec![instance("A"), instance("B")],
            formats: vec!["VK_FORMAT_R8_UNORM"; 2],
            shader_formats: vec!["r8"; 2],
            flags: vec![Default::default(); 2],
            bindings: vec![0, 1],
            bindings_swapped: vec![1, 1],
            sampler_bindings: vec![SamplerBinding::Bound(1), SamplerBinding::Invalid],
            sampler_bindings_swapped: vec![SamplerBinding::Bound(1), SamplerBinding::Bound(2)],
            debug_names: vec!["A".to_string(), "B".to_string()],
        };

        let violations = check_resource_table(&table);
        assert_eq!(violations.len(), 3, "{violations:?}");
        assert!(violations[0].contains("involution"));
        assert!(violations[1].contains("overlaps"));
        assert!(violations[2].contains("validity"));
    }

    #[test]
    fn test_length_mismatch_reported() {
        let mut table = allocate(&[ImageResourceDescriptor::new("A", ScalarType::Float16, ChannelLayout::Rgba, &[])], &ResourceNaming::default()).unwrap();
        assert!(check_resource_table(&table).is_empty());

        table.debug_names.pop();
        assert_eq!(check_resource_table(&table), ["debug_names has 0 entries, expected 1"]);
    }

    #[test]
    fn test_parse_shader_bindings() {
        let text = "\
layout(set = DESC_SET_FRAMEBUFFERS, binding = 0, r32ui) uniform uimage2D framebufNormal;
layout(set = DESC_SET_FRAMEBUFFERS, binding = 3) uniform usampler2D framebufNormal_Sampler;
";
        let bindings = parse_shader_bindings(text);
        assert_eq!(bindings["framebufNormal"], 0);
        assert_eq!(bindings["framebufNormal_Sampler"], 3);
    }
}
