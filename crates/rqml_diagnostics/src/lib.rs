//! rqml_diagnostics: Diagnostic messages and error types for the QML parser.
//!
//! Fatal parse failures are reported as a [`ParseError`]; recoverable issues
//! (e.g. an unterminated string scanned in loose mode) accumulate as
//! [`Diagnostic`]s in a [`DiagnosticCollection`].

use rqml_core::text::{Position, TextPos, TextRange};
use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    /// Message template. May contain `{0}`, `{1}`, ... placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with its resolved text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub range: Option<TextRange>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            range: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn with_range(range: TextRange, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            range: Some(range),
            ..Self::new(message, args)
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(range) = self.range {
            write!(f, "({}): ", range.pos)?;
        }
        write!(f, "{} QML{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated during a parse.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Drop diagnostics recorded after `len`; used when a speculative parse is
    /// rolled back.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

// ============================================================================
// Fatal errors
// ============================================================================

/// A fatal parse error: the first syntax error in strict mode, or a
/// configuration error in loose mode.
///
/// Renders as `"<message> (<line>:<column>)"` with a 1-based line and 0-based
/// column, e.g. `Unexpected token (1:15)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({loc})")]
pub struct ParseError {
    /// Message without the location suffix.
    pub message: String,
    /// Character offset the error refers to.
    pub pos: TextPos,
    pub loc: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, pos: TextPos, loc: Position) -> Self {
        Self {
            message: message.into(),
            pos,
            loc,
        }
    }

    /// Build from a message template.
    pub fn from_message(message: &DiagnosticMessage, args: &[&str], pos: TextPos, loc: Position) -> Self {
        Self::new(format_message(message.message, args), pos, loc)
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Scanner (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_CONSTANT: DiagnosticMessage = diag!(1001, Error, "Unterminated string constant");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1002, Error, "Unterminated comment");
    pub const UNTERMINATED_REGULAR_EXPRESSION: DiagnosticMessage = diag!(1003, Error, "Unterminated regular expression");
    pub const INVALID_NUMBER: DiagnosticMessage = diag!(1004, Error, "Invalid number");
    pub const EXPECTED_HEXADECIMAL_NUMBER: DiagnosticMessage = diag!(1005, Error, "Expected hexadecimal number");
    pub const IDENTIFIER_DIRECTLY_AFTER_NUMBER: DiagnosticMessage = diag!(1006, Error, "Identifier directly after number");
    pub const UNEXPECTED_CHARACTER: DiagnosticMessage = diag!(1007, Error, "Unexpected character '{0}'");
    pub const BAD_ESCAPE_SEQUENCE: DiagnosticMessage = diag!(1008, Error, "Bad character escape sequence");

    // ========================================================================
    // Parser (1100-1199)
    // ========================================================================
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(1100, Error, "Unexpected token");
    pub const KEYWORD_IS_RESERVED: DiagnosticMessage = diag!(1101, Error, "The keyword '{0}' is reserved");
    pub const QML_MODULE_VERSION_REQUIRED: DiagnosticMessage = diag!(1102, Error, "QML module must specify major and minor version");
    pub const ASSIGNING_TO_RVALUE: DiagnosticMessage = diag!(1103, Error, "Assigning to rvalue");
    pub const RETURN_OUTSIDE_FUNCTION: DiagnosticMessage = diag!(1104, Error, "'return' outside of function");
    pub const UNSYNTACTIC_BREAK: DiagnosticMessage = diag!(1105, Error, "Unsyntactic {0}");
    pub const LABEL_ALREADY_DECLARED: DiagnosticMessage = diag!(1106, Error, "Label '{0}' is already declared");
    pub const MULTIPLE_DEFAULT_CLAUSES: DiagnosticMessage = diag!(1107, Error, "Multiple default clauses");
    pub const MISSING_CATCH_OR_FINALLY: DiagnosticMessage = diag!(1108, Error, "Missing catch or finally clause");
    pub const ILLEGAL_NEWLINE_AFTER_THROW: DiagnosticMessage = diag!(1109, Error, "Illegal newline after throw");

    // ========================================================================
    // Configuration (1200-1299)
    // ========================================================================
    pub const UNSUPPORTED_ECMA_VERSION: DiagnosticMessage = diag!(1200, Error, "QML only supports ECMA Script Language Specification 5 or older");
}
