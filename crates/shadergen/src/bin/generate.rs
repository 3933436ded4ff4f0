//! Header generation tool
//!
//! Compiles a descriptor manifest and writes the host and shader headers into the
//! target folder. Nothing is written unless every artifact compiles.
//!
//! # Usage
//! ```bash
//! generate --path Source/Generated/ --manifest shader_common.yaml
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process;

/// Command-line arguments for the header generator
#[derive(Parser)]
#[command(version, about = "Generate shared host/shader layout headers")]
struct Args {
    /// Target folder for the generated files
    #[arg(long, short, default_value = ".")]
    path: PathBuf,

    /// Descriptor manifest (defaults to the embedded manifest)
    #[arg(long, short)]
    manifest: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let subscriber = tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error installing logger: {e}");
    }

    if !args.path.is_dir() {
        eprintln!("Error: Folder '{}' doesn't exist", args.path.display());
        process::exit(1);
    }

    let artifacts = match shadergen::generate_from(args.manifest.as_deref()) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = artifacts.write_to_dir(&args.path) {
        eprintln!("Error writing generated files: {e}");
        process::exit(1);
    }
}
