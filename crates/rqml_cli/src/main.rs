//! rqml: parse a QML document and print its syntax tree as JSON.
//!
//! Usage:
//!   rqml [options] <FILE>
//!
//! A parse error prints its message to stdout and exits with status 1.

use clap::Parser as ClapParser;
use miette::{IntoDiagnostic, WrapErr};
use rqml_ast::node::Program;
use rqml_ast::serialize::AstSerializer;
use rqml_core::text::LineMap;
use rqml_core::SyntaxArena;
use rqml_diagnostics::ParseError;
use rqml_options::ParseOptions;
use rqml_parser::{parse, parse_loose_with_diagnostics, tokenize};
use serde_json::Value;
use std::process;
use tracing::{debug, warn};

#[derive(ClapParser, Debug)]
#[command(name = "rqml", about = "Parse QML documents into ESTree-style JSON", version)]
struct Cli {
    /// QML file to parse.
    #[arg(value_name = "FILE")]
    file: String,

    /// ECMAScript version of embedded JavaScript.
    #[arg(long, value_name = "VERSION", default_value_t = 5, value_parser = clap::value_parser!(u32).range(3..=6))]
    ecma: u32,

    /// Print the token stream instead of the syntax tree.
    #[arg(long)]
    tokenize: bool,

    /// Print JSON on a single line.
    #[arg(long)]
    compact: bool,

    /// Attach line/column locations to every node.
    #[arg(long)]
    locations: bool,

    /// Use the error-tolerant grammar.
    #[arg(long)]
    loose: bool,

    /// Parse only; print nothing on success.
    #[arg(long)]
    silent: bool,
}

impl Cli {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            ecma_version: self.ecma,
            locations: self.locations,
            allow_reserved: false,
            loose: self.loose,
        }
    }
}

/// Parse with the selected grammar. Errors the loose grammar recovered from
/// are logged as warnings.
fn parse_document<'a>(source: &str, options: &ParseOptions, arena: &'a SyntaxArena) -> Result<&'a Program<'a>, ParseError> {
    if !options.loose {
        return parse(source, options, arena.bump());
    }
    let (program, diagnostics) = parse_loose_with_diagnostics(source, options, arena.bump())?;
    for diagnostic in diagnostics.diagnostics() {
        warn!("{}", diagnostic);
    }
    Ok(program)
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = std::fs::read_to_string(&cli.file)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", cli.file))?;
    let options = cli.parse_options();
    debug!(file = %cli.file, tokenize = cli.tokenize, loose = cli.loose, "parsing");

    let output = if cli.tokenize {
        tokenize(&source, &options).map(|tokens| {
            let records = tokens.iter().map(|t| t.to_record()).collect::<Vec<_>>();
            serde_json::to_value(records).unwrap_or(Value::Null)
        })
    } else {
        let arena = SyntaxArena::for_source(source.len());
        let line_map = LineMap::new(&source);
        parse_document(&source, &options, &arena).map(|program| {
            let serializer = if options.locations {
                AstSerializer::with_locations(&line_map)
            } else {
                AstSerializer::new()
            };
            serializer.program(program)
        })
    };

    let value = match output {
        Ok(value) => value,
        Err(err) => {
            println!("{}", err);
            process::exit(1);
        }
    };

    if !cli.silent {
        let text = if cli.compact {
            serde_json::to_string(&value)
        } else {
            serde_json::to_string_pretty(&value)
        };
        println!("{}", text.into_diagnostic()?);
    }
    Ok(())
}
