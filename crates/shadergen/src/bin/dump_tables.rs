//! Compiled table dumping tool
//!
//! This binary compiles a descriptor manifest and dumps the resolved constants,
//! compiled struct layouts (fields, offsets, sizes) for both targets and the
//! resource tables to a single JSON file.

use shadergen::{CompiledManifest, Manifest, predefined};
use std::{env, fs, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 && args.len() != 3 {
        eprintln!("Usage: {} <output_file> [manifest_file]", args[0]);
        eprintln!("Compiles a manifest and dumps its layouts and resource tables to a JSON file");
        eprintln!("  output_file:   Path to the output JSON file");
        eprintln!("  manifest_file: Optional YAML manifest (default is the embedded manifest)");
        process::exit(1);
    }

    let subscriber = tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).with_writer(std::io::stderr).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error installing logger: {e}");
    }

    let output_file = &args[1];
    let manifest = match args.get(2) {
        Some(path) => Manifest::from_file(path),
        None => predefined::default_manifest(),
    };

    let compiled = match manifest.and_then(|manifest| CompiledManifest::compile(&manifest)) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Error compiling manifest: {e}");
            process::exit(1);
        }
    };

    // Serialize to JSON
    match serde_json::to_string_pretty(&compiled) {
        Ok(json) => {
            if let Err(e) = fs::write(output_file, json) {
                eprintln!("Error writing output file '{output_file}': {e}");
                process::exit(1);
            }
            println!("Successfully wrote {} structs and {} image instances to '{}'", compiled.shader_structs.len(), compiled.table.len(), output_file);
        }
        Err(e) => {
            eprintln!("Error serializing tables to JSON: {e}");
            process::exit(1);
        }
    }
}
