//! The Manaknight compiler CLI.
//!
//! Provides the `mkc` command:
//!
//! - `mkc compile <input.mk>` - compile one file and its imports
//!
//! Options:
//! - `-o, --output`  - path for the emitted JavaScript (default: input
//!   with a `.js` extension); the effect manifest lands next to it
//! - `-a, --openapi` - also emit the OpenAPI JSON document
//! - `-f, --format`  - print canonical formatting to stdout instead of
//!   compiling
//! - `-c, --check`   - type-check without emitting
//! - `-v, --verbose` - labeled source reports instead of one-line errors
//! - `--json`        - machine-readable diagnostics on stdout
//!
//! Anything after `--` is ignored. Exit code 0 on success, 1 on any
//! diagnostic.

mod driver;
mod report;
mod resolver;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mkc", version, about = "The Manaknight compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a Manaknight source file to sandboxed JavaScript
    Compile {
        /// Path to the entry source file
        input: PathBuf,

        /// Output path for the emitted JavaScript
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also emit an OpenAPI JSON document to this path
        #[arg(short = 'a', long = "openapi")]
        openapi: Option<PathBuf>,

        /// Print canonical formatting to stdout instead of compiling
        #[arg(short = 'f', long = "format")]
        format: bool,

        /// Type-check without emitting
        #[arg(short = 'c', long = "check")]
        check: bool,

        /// Labeled source reports instead of one-line errors
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,

        /// Emit the diagnostic list as JSON on stdout
        #[arg(long = "json")]
        json: bool,

        /// Ignored; reserved for host-side options
        #[arg(last = true)]
        rest: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Compile {
            input,
            output,
            openapi,
            format,
            check,
            verbose,
            json,
            rest: _,
        } => {
            let code = compile(
                &input,
                output.as_deref(),
                openapi.as_deref(),
                format,
                check,
                verbose,
                json,
            );
            process::exit(code);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn compile(
    input: &std::path::Path,
    output: Option<&std::path::Path>,
    openapi: Option<&std::path::Path>,
    format: bool,
    check: bool,
    verbose: bool,
    json: bool,
) -> i32 {
    let resolution = match resolver::resolve(input) {
        Ok(resolution) => resolution,
        Err(message) => {
            eprintln!("error: {message}");
            return 1;
        }
    };

    let checked = driver::check_program(&resolution);

    if !checked.diagnostics.is_empty() {
        if json {
            match serde_json::to_string_pretty(&checked.diagnostics) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => eprintln!("error: cannot serialize diagnostics: {e}"),
            }
        }
        if verbose {
            for diagnostic in &checked.file_diagnostics {
                let source = resolution
                    .modules
                    .iter()
                    .find(|m| m.display_path == diagnostic.file)
                    .map(|m| m.source.as_str())
                    .unwrap_or("");
                eprint!("{}", report::render_verbose(diagnostic, source));
            }
        } else {
            for diagnostic in &checked.diagnostics {
                eprintln!("{}", report::render_plain(diagnostic));
            }
        }
        return 1;
    }

    let entry = &resolution.modules[0];

    if format {
        print!(
            "{}",
            mk_fmt::format_source(&entry.source, &mk_fmt::FormatConfig::default())
        );
        return 0;
    }

    if check {
        return 0;
    }

    let Some(typeck) = checked.entry_typeck.as_ref() else {
        // Unreachable with an empty diagnostic list; be safe anyway.
        eprintln!("error: nothing to emit");
        return 1;
    };

    let emitted = mk_codegen::emit_module(&entry.parse, typeck);
    let out_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension("js"));
    if let Err(e) = std::fs::write(&out_path, &emitted.js) {
        eprintln!("error: cannot write '{}': {e}", out_path.display());
        return 1;
    }

    if !emitted.manifest.entries.is_empty() {
        let manifest_path = out_path.with_extension("manifest.json");
        let rendered = match serde_json::to_string_pretty(&emitted.manifest) {
            Ok(rendered) => rendered,
            Err(e) => {
                eprintln!("error: cannot serialize manifest: {e}");
                return 1;
            }
        };
        if let Err(e) = std::fs::write(&manifest_path, rendered) {
            eprintln!("error: cannot write '{}': {e}", manifest_path.display());
            return 1;
        }
    }

    if let Some(openapi_path) = openapi {
        let document = mk_codegen::openapi_document(&entry.parse.source_file(), &typeck.registry);
        let rendered = match serde_json::to_string_pretty(&document) {
            Ok(rendered) => rendered,
            Err(e) => {
                eprintln!("error: cannot serialize OpenAPI document: {e}");
                return 1;
            }
        };
        if let Err(e) = std::fs::write(openapi_path, rendered) {
            eprintln!("error: cannot write '{}': {e}", openapi_path.display());
            return 1;
        }
    }

    0
}
