//! rqml_parser: Recursive descent parsers for QML documents.
//!
//! [`QmlParser`] is the strict grammar: it stops at the first syntax error.
//! [`LooseParser`] always produces a tree, inventing dummy nodes where the
//! input is incomplete. Both delegate embedded JavaScript to [`JsParser`].

mod loose;
mod parser;
mod precedence;
mod qml;
mod utilities;

use bumpalo::Bump;
use rqml_ast::node::Program;
use rqml_ast::syntax_kind::SyntaxKind;
use rqml_core::text::{LineMap, Position};
use rqml_diagnostics::{messages, DiagnosticCollection, ParseError};
use rqml_options::{ParseOptions, MAX_LOOSE_ECMA_VERSION};
use rqml_scanner::{Scanner, TokenInfo};
use tracing::debug;

pub use loose::LooseParser;
pub use parser::{Checkpoint, JsParser, ParseResult};
pub use qml::QmlParser;

/// Parse a QML document with the grammar `options` selects.
pub fn parse<'a>(source: &str, options: &ParseOptions, arena: &'a Bump) -> ParseResult<&'a Program<'a>> {
    check_ecma_version(options)?;
    debug!(loose = options.loose, ecma_version = options.ecma_version, chars = source.chars().count(), "parsing QML document");
    if options.loose {
        Ok(LooseParser::new(arena, source, options).parse_program())
    } else {
        QmlParser::new(arena, source, options).parse_program()
    }
}

/// Parse with the error-tolerant grammar regardless of `options.loose`.
pub fn parse_loose<'a>(source: &str, options: &ParseOptions, arena: &'a Bump) -> ParseResult<&'a Program<'a>> {
    check_ecma_version(options)?;
    debug!(ecma_version = options.ecma_version, "parsing QML document loosely");
    Ok(LooseParser::new(arena, source, options).parse_program())
}

/// Loose parse that also returns the lexical errors recovered from, such as
/// unterminated strings.
pub fn parse_loose_with_diagnostics<'a>(
    source: &str,
    options: &ParseOptions,
    arena: &'a Bump,
) -> ParseResult<(&'a Program<'a>, DiagnosticCollection)> {
    check_ecma_version(options)?;
    Ok(LooseParser::new(arena, source, options).parse_program_with_diagnostics())
}

/// Scan `source` into tokens. Lexical errors are fatal unless `options.loose`.
pub fn tokenize(source: &str, options: &ParseOptions) -> ParseResult<Vec<TokenInfo>> {
    check_ecma_version(options)?;
    let line_map = LineMap::new(source);
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan();
        if let Some(err) = scanner.token_error() {
            if !options.loose {
                return Err(ParseError::new(err.message.clone(), err.pos, line_map.position_of(err.pos)));
            }
        }
        if kind == SyntaxKind::EndOfFileToken {
            return Ok(tokens);
        }
        tokens.push(scanner.token_info());
    }
}

/// QML embeds ECMAScript 5 at most.
fn check_ecma_version(options: &ParseOptions) -> ParseResult<()> {
    if options.ecma_version > MAX_LOOSE_ECMA_VERSION {
        return Err(ParseError::from_message(
            &messages::UNSUPPORTED_ECMA_VERSION,
            &[],
            0,
            Position::new(1, 0),
        ));
    }
    Ok(())
}
