//! Command-line interface for tokenfold
//! This binary extracts comment blocks from source files and folds token streams into node trees.
//!
//! Usage:
//!   tokenfold blocks `<path>`                                         - Print the comment blocks of a file
//!   tokenfold parse `<tokens>` --grammar `<grammar>` [--format `<format>`] - Fold a JSON token stream
//!   tokenfold list-formats                                          - List available output formats
//!
//! Settings are layered: built-in defaults, then `tokenfold.toml` in the working directory if
//! present, then the file given with `--config`, then `--format`.
//!
//! Logging goes to stderr and is controlled by `TOKENFOLD_LOG` (or `RUST_LOG`), default `warn`.

use clap::{Arg, ArgMatches, Command};
use std::process;
use tokenfold::fold::assembly::assemble;
use tokenfold::fold::config::{GrammarConfig, Loader, Settings};
use tokenfold::fold::parser::Parser;
use tokenfold::fold::source::CommentSource;
use tokenfold::fold::token;
use tokenfold::fold::view::FormatRegistry;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let matches = Command::new("tokenfold")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fold classified token streams into shallow node trees")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the built-in defaults"),
        )
        .subcommand(
            Command::new("blocks")
                .about("Print the comment blocks found in a source file as JSON")
                .arg(
                    Arg::new("path")
                        .help("Path to the source file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Fold a JSON token stream with a grammar file")
                .arg(
                    Arg::new("tokens")
                        .help("Path to a JSON array of {\"value\", \"data\"} tokens")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("grammar")
                        .long("grammar")
                        .short('g')
                        .help("TOML file declaring the node kinds")
                        .required(true),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g., 'json', 'yaml'); defaults to the configured one"),
                ),
        )
        .subcommand(Command::new("list-formats").about("List available output formats"))
        .get_matches();

    match matches.subcommand() {
        Some(("blocks", blocks_matches)) => {
            let settings = load_settings(&matches, None);
            let path = required(blocks_matches, "path");
            handle_blocks_command(&settings, path);
        }
        Some(("parse", parse_matches)) => {
            let format = parse_matches.get_one::<String>("format").map(String::as_str);
            let settings = load_settings(&matches, format);
            let tokens = required(parse_matches, "tokens");
            let grammar = required(parse_matches, "grammar");
            handle_parse_command(tokens, grammar, &settings.output.format);
        }
        Some(("list-formats", _)) => handle_list_formats_command(),
        _ => unreachable!(),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TOKENFOLD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_else(|| fail(format!("missing argument '{name}'")))
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}

const PROJECT_CONFIG: &str = "tokenfold.toml";

fn load_settings(matches: &ArgMatches, format: Option<&str>) -> Settings {
    let mut loader = Loader::new().with_optional_file(PROJECT_CONFIG);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(format) = format {
        loader = loader
            .set_override("output.format", format)
            .unwrap_or_else(|e| fail(e));
    }
    loader.build().unwrap_or_else(|e| fail(e))
}

/// Handle the blocks command
fn handle_blocks_command(settings: &Settings, path: &str) {
    let source = CommentSource::from_path(path, &settings.extractor).unwrap_or_else(|e| fail(e));
    let output = serde_json::to_string_pretty(source.blocks()).unwrap_or_else(|e| fail(e));
    println!("{output}");
}

/// Handle the parse command
fn handle_parse_command(tokens_path: &str, grammar_path: &str, format: &str) {
    let formats = FormatRegistry::with_defaults();
    if !formats.has(format) {
        eprintln!("Format '{format}' not found");
        eprintln!("Available formats: {}", formats.list_formats().join(", "));
        process::exit(1);
    }

    let registry = GrammarConfig::from_path(grammar_path)
        .and_then(GrammarConfig::into_registry)
        .unwrap_or_else(|e| fail(e));
    let source = std::fs::read_to_string(tokens_path)
        .unwrap_or_else(|e| fail(format!("could not read '{tokens_path}': {e}")));
    let tokens = token::from_json(&source).unwrap_or_else(|e| fail(e));

    let mut parser = Parser::new();
    parser.parse(tokens);
    let doc = assemble(parser.sequence_mut(), &registry);

    let output = formats.serialize(&doc, format).unwrap_or_else(|e| fail(e));
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    if !doc.validate() {
        fail("document failed validation");
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let formats = FormatRegistry::with_defaults();
    println!("Available output formats:\n");
    for name in formats.list_formats() {
        let description = formats
            .get(&name)
            .map(|formatter| formatter.description())
            .unwrap_or_default();
        println!("  {name}");
        println!("    {description}");
        println!();
    }
}
