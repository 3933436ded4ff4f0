//! Layout verification binary
//!
//! This binary generates the artifacts of a manifest in memory and verifies that
//! host and shader struct layouts agree and that the resource tables match the
//! shader declarations.

use shadergen::{CompiledManifest, Manifest, emit::render, predefined};
use shadergen_verification::{compare::CompareResult, verify};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [manifest_file]", args[0]);
        std::process::exit(1);
    }

    let manifest = match args.get(1) {
        Some(path) => Manifest::from_file(path)?,
        None => predefined::default_manifest()?,
    };
    let compiled = CompiledManifest::compile(&manifest)?;
    let artifacts = render(&compiled);
    let report = verify(&compiled, &artifacts)?;

    for (name, result) in &report.layouts {
        match result {
            CompareResult::Match => {
                println!("✓ Layouts match for struct {name}");
            }
            CompareResult::MissingInShader => {
                println!("✗ Struct {name} is missing from the shader header");
            }
            CompareResult::FieldCountMismatch { host_fields, shader_fields } => {
                println!("✗ Field count mismatch for struct {name}: host {host_fields}, shader {shader_fields}");
            }
            CompareResult::FieldMismatch { index, host, shader } => {
                println!("✗ Field {index} of struct {name} differs: host {} ({} bytes), shader {} ({} bytes)", host.0, host.1, shader.0, shader.1);
            }
        }
    }

    for violation in &report.table_violations {
        println!("✗ Resource table: {violation}");
    }
    for identifier in &report.binding_mismatches {
        println!("✗ Shader binding of {identifier} disagrees with the resource table");
    }

    if report.is_clean() {
        println!("✓ {} image instances verified", compiled.table.len());
        Ok(())
    } else {
        std::process::exit(1);
    }
}
