//! Token information produced by the scanner.

use rqml_ast::syntax_kind::SyntaxKind;
use rqml_ast::types::TokenFlags;
use serde::Serialize;

/// A scanned token: kind, literal value and character range.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub kind: SyntaxKind,
    /// Start offset (inclusive).
    pub pos: u32,
    /// End offset (exclusive).
    pub end: u32,
    /// Cooked value: identifier name, decoded string contents, or the raw
    /// text of numbers and regular expressions.
    pub value: String,
    pub flags: TokenFlags,
}

impl TokenInfo {
    pub fn len(&self) -> u32 {
        self.end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    pub fn has_preceding_line_break(&self) -> bool {
        self.flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }
}

/// Wire form of a token for tokenize-only output.
#[derive(Debug, Serialize)]
pub struct TokenRecord<'t> {
    #[serde(rename = "type")]
    pub label: &'static str,
    pub value: &'t str,
    pub range: [u32; 2],
}

impl TokenInfo {
    pub fn to_record(&self) -> TokenRecord<'_> {
        TokenRecord {
            label: self.kind.token_label(),
            value: &self.value,
            range: [self.pos, self.end],
        }
    }
}
