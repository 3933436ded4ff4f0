//! Verification utilities for shadergen
//!
//! This crate checks generated artifacts independently of the generator: struct
//! declarations are parsed back out of the emitted host and shader headers and
//! compared member by member, and resource tables are checked against the
//! bindings the shader header actually declares.

pub mod compare;
pub mod struct_parser;

use shadergen::{CompiledManifest, GeneratedArtifacts};
use struct_parser::{Language, ParseError, parse_structs};

/// Outcome of verifying one generated artifact set
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// (struct name, result) for every host struct
    pub layouts: Vec<(String, compare::CompareResult)>,
    /// Violated resource table invariants
    pub table_violations: Vec<String>,
    /// Identifiers whose declared shader binding disagrees with the table
    pub binding_mismatches: Vec<String>,
}

impl VerificationReport {
    /// Returns true if nothing disagrees
    pub fn is_clean(&self) -> bool {
        self.layouts.iter().all(|(_, result)| *result == compare::CompareResult::Match) && self.table_violations.is_empty() && self.binding_mismatches.is_empty()
    }
}

/// Verifies rendered artifacts against the compiled manifest they came from
///
/// # Arguments
/// * `compiled` - Compiled manifest the artifacts were rendered from
/// * `artifacts` - Rendered files
///
/// # Returns
/// A report listing every disagreement, or an error if a header cannot be parsed
pub fn verify(compiled: &CompiledManifest, artifacts: &GeneratedArtifacts) -> Result<VerificationReport, ParseError> {
    let host = parse_structs(&artifacts.host_common_header, Language::C)?;
    let shader = parse_structs(&artifacts.shader_common_header, Language::Glsl)?;

    let declared = compare::parse_shader_bindings(&artifacts.shader_common_header);
    let mut binding_mismatches = Vec::new();
    for (index, instance) in compiled.table.instances.iter().enumerate() {
        let image = compiled.naming.image_identifier(&instance.name);
        if declared.get(&image) != Some(&compiled.table.bindings[index]) {
            binding_mismatches.push(image);
        }

        let sampler = compiled.naming.sampler_identifier(&instance.name);
        let expected = compiled.table.sampler_bindings[index];
        let matches = match declared.get(&sampler) {
            Some(binding) => expected.is_valid() && expected.value() == *binding,
            None => !expected.is_valid(),
        };
        if !matches {
            binding_mismatches.push(sampler);
        }
    }

    let report = VerificationReport {
        layouts: compare::compare_layouts(&host, &shader),
        table_violations: compare::check_resource_table(&compiled.table),
        binding_mismatches,
    };
    tracing::debug!("Verified {} structs and {} image instances", report.layouts.len(), compiled.table.len());

    Ok(report)
}
