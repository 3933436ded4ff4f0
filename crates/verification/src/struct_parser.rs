//! Struct declaration parser for generated headers
//!
//! Re-reads emitted C and GLSL struct declarations and measures every member with
//! an independent size table, so layout agreement is checked against the text that
//! is actually shipped rather than the generator's own bookkeeping.

use regex::Regex;
use std::sync::LazyLock;

static STRUCT_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^struct\s+(\w+)\s*\{([^}]*)\};").unwrap());
static MEMBER_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\w+)\s+(\w+)((?:\[\d+\])*)\s*;\s*$").unwrap());
static EXTENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d+)\]").unwrap());

/// Errors raised while reading generated declarations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A member line could not be read as `type name[extents];`
    #[error("malformed member in struct `{struct_name}`: `{line}`")]
    MalformedMember { struct_name: String, line: String },

    /// A member uses a type with no known size
    #[error("unknown type `{type_name}` in struct `{struct_name}`")]
    UnknownType { struct_name: String, type_name: String },
}

/// Language a header was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    C,
    Glsl,
}

/// A struct member as it appears in the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMember {
    pub type_name: String,
    pub name: String,
    pub extents: Vec<u32>,
    /// Bytes occupied in memory
    pub size: u32,
}

/// A struct declaration read back from a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStruct {
    pub name: String,
    pub members: Vec<ParsedMember>,
}

impl ParsedStruct {
    /// Total size in bytes
    pub fn size(&self) -> u32 {
        self.members.iter().map(|member| member.size).sum()
    }
}

/// Parses every struct declaration in a generated header
///
/// # Arguments
/// * `text` - Header contents
/// * `language` - Which size table applies
///
/// # Returns
/// Structs in declaration order
pub fn parse_structs(text: &str, language: Language) -> Result<Vec<ParsedStruct>, ParseError> {
    let mut structs = Vec::new();

    for captures in STRUCT_BLOCK.captures_iter(text) {
        let struct_name = captures[1].to_string();
        let mut members = Vec::new();

        for line in captures[2].lines().filter(|line| !line.trim().is_empty()) {
            let member = MEMBER_LINE.captures(line).ok_or_else(|| ParseError::MalformedMember {
                struct_name: struct_name.clone(),
                line: line.trim().to_string(),
            })?;

            let type_name = member[1].to_string();
            // Digits only, as guaranteed by the member pattern
            let extents: Vec<u32> = EXTENT.captures_iter(&member[3]).filter_map(|extent| extent[1].parse().ok()).collect();
            let size = member_size(language, &type_name, &extents).ok_or_else(|| ParseError::UnknownType {
                struct_name: struct_name.clone(),
                type_name: type_name.clone(),
            })?;

            members.push(ParsedMember {
                type_name,
                name: member[2].to_string(),
                extents,
                size,
            });
        }

        structs.push(ParsedStruct { name: struct_name, members });
    }

    Ok(structs)
}

/// (size, array stride) of a GLSL type in a storage buffer
fn glsl_type_size(type_name: &str) -> Option<(u32, u32)> {
    let vector = |components: u32| match components {
        2 => (8, 8),
        3 => (12, 16),
        _ => (16, 16),
    };

    match type_name {
        "float" | "int" | "uint" => return Some((4, 4)),
        "vec2" | "ivec2" | "uvec2" => return Some(vector(2)),
        "vec3" | "ivec3" | "uvec3" => return Some(vector(3)),
        "vec4" | "ivec4" | "uvec4" => return Some(vector(4)),
        _ => {}
    }

    // matC and matCxR: C columns, each an R-component vector
    let dims = type_name.strip_prefix("mat")?;
    let (columns, rows) = match dims.split_once('x') {
        Some((columns, rows)) => (columns.parse::<u32>().ok()?, rows.parse::<u32>().ok()?),
        None => {
            let n = dims.parse::<u32>().ok()?;
            (n, n)
        }
    };
    if !(2..=4).contains(&columns) || !(2..=4).contains(&rows) {
        return None;
    }
    let size = columns * vector(rows).1;
    Some((size, size))
}

fn c_type_size(type_name: &str) -> Option<u32> {
    match type_name {
        "float" | "int32_t" | "uint32_t" => Some(4),
        _ => None,
    }
}

fn member_size(language: Language, type_name: &str, extents: &[u32]) -> Option<u32> {
    let elements: u32 = extents.iter().product();
    match language {
        Language::C => Some(c_type_size(type_name)? * elements),
        Language::Glsl => {
            let (size, stride) = glsl_type_size(type_name)?;
            Some(if extents.is_empty() { size } else { stride * elements })
        }
    }
}
