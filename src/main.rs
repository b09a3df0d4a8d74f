use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

/// Generate TypeScript type definitions for the canonical protobuf JSON mapping.
///
/// Reads a fully-resolved protobuf schema model (JSON) and generates one
/// deterministic index.ts per package, describing the JSON encoding of every
/// message and enum.
#[derive(Parser)]
#[command(name = "proto-tsjson-gen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate TypeScript declarations from a schema model.
    Generate {
        /// Path to the schema model JSON file.
        #[arg(long, env = "PROTO_TSJSON_SCHEMA")]
        schema: PathBuf,

        /// Output directory for generated TypeScript files.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Suppress non-error output.
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");

        // Print cause chain.
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = std::error::Error::source(cause);
        }

        process::exit(1);
    }
}

fn run(cli: Cli) -> proto_tsjson_gen::error::Result<()> {
    match cli.command {
        Commands::Generate {
            schema,
            output_dir,
            quiet,
        } => {
            if !quiet {
                eprintln!("Loading schema model from {}", schema.display());
            }
            let set = proto_tsjson_gen::schema::load_schema(&schema)?;
            if !quiet {
                let files = set.files.len();
                eprintln!("Loaded {files} schema files");
            }

            let stats = proto_tsjson_gen::codegen::generate(&set, &output_dir)?;

            if !quiet {
                eprintln!(
                    "Generated {} packages, {} messages, {} enums",
                    stats.packages_generated, stats.messages_generated, stats.enums_generated
                );
                if stats.well_known_emitted > 0 {
                    eprintln!(
                        "Emitted {} well-known type declarations",
                        stats.well_known_emitted
                    );
                }
                if stats.shadowed_declarations > 0 {
                    eprintln!(
                        "Resolved {} well-known shadowing ambiguities",
                        stats.shadowed_declarations
                    );
                }
                eprintln!("Done.");
            }
        }
    }

    Ok(())
}
