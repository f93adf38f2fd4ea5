//! Command-line front end: parse a document and emit it as HTML, as a JSON
//! dump of the AST, or as a human-readable tree visualization.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use doctree::convert::html::HtmlConverter;
use doctree::convert::{Converter, ConvertOptions};
use doctree::parser::{Parser, ParserOptions, SafeMode};
use doctree::tools::dump::dump_document;

#[derive(ClapParser, Debug)]
#[command(name = "doctree", version, about = "Parse and convert structured text documents")]
struct Args {
    /// Path to the document to process
    path: PathBuf,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Pretty-print the output where the format supports it
    #[arg(long)]
    pretty: bool,

    /// Emit a full HTML document (with <html>/<head>) instead of a fragment
    #[arg(long)]
    full_document: bool,

    /// Restrict includes and link/image schemes per the given policy
    #[arg(long, value_enum, default_value_t = CliSafeMode::Safe)]
    safe_mode: CliSafeMode,

    /// Disable `include::` directive expansion entirely
    #[arg(long)]
    no_includes: bool,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum Format {
    Html,
    Json,
    Tree,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum CliSafeMode {
    Unsafe,
    Safe,
    Server,
    Secure,
}

impl From<CliSafeMode> for SafeMode {
    fn from(mode: CliSafeMode) -> Self {
        match mode {
            CliSafeMode::Unsafe => SafeMode::Unsafe,
            CliSafeMode::Safe => SafeMode::Safe,
            CliSafeMode::Server => SafeMode::Server,
            CliSafeMode::Secure => SafeMode::Secure,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut parser_options = ParserOptions::default();
    parser_options.safe_mode = args.safe_mode.into();
    parser_options.include_directives_enabled = !args.no_includes;
    if let Some(parent) = args.path.parent() {
        parser_options.base_directory = parent.to_path_buf();
    }

    let text = match std::fs::read_to_string(&args.path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error: failed to read {}: {err}", args.path.display());
            return ExitCode::FAILURE;
        }
    };

    let (document, diagnostics) = Parser::new(parser_options).parse(&text);
    for diagnostic in &diagnostics {
        eprintln!("{diagnostic}");
    }

    let output = match args.format {
        Format::Tree => dump_document(&document),
        Format::Json => {
            let result = if args.pretty {
                serde_json::to_string_pretty(&document)
            } else {
                serde_json::to_string(&document)
            };
            match result {
                Ok(json) => json,
                Err(err) => {
                    eprintln!("error: failed to serialize document: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        Format::Html => {
            let convert_options = ConvertOptions {
                pretty_print: args.pretty,
                output_full_document: args.full_document,
                safe_mode: args.safe_mode.into(),
                ..ConvertOptions::default()
            };
            HtmlConverter.convert_with(&document, &convert_options)
        }
    };

    println!("{output}");

    if diagnostics.iter().any(|d| d.severity == doctree::parser::Severity::Error) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
