//! The ES5 scanner.
//!
//! Converts source text into the token stream the QML and JavaScript parsers
//! consume. Source text is held as `Vec<char>` so that every position is a
//! character offset.

use crate::char_codes::*;
use crate::token::TokenInfo;
use rqml_ast::syntax_kind::SyntaxKind;
use rqml_ast::types::TokenFlags;
use rqml_core::text::TextRange;
use rqml_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// A lexical error attached to the token that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub message: String,
    pub pos: u32,
}

/// Saved scanner state for lookahead and rollback.
#[derive(Debug, Clone)]
pub struct ScannerState {
    pos: usize,
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    token_flags: TokenFlags,
    error: Option<ScanError>,
    diagnostics_len: usize,
}

/// The scanner converts source text into tokens.
pub struct Scanner {
    text: Vec<char>,
    /// Current position; the end of the current token after `scan`.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    token_flags: TokenFlags,
    /// First lexical error of the current token.
    error: Option<ScanError>,
    diagnostics: DiagnosticCollection,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            token_flags: TokenFlags::NONE,
            error: None,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Source length in characters.
    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    /// The source as characters.
    pub fn chars(&self) -> &[char] {
        &self.text
    }

    /// Look ahead: save state, call f, restore state and return the result.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    /// Try scanning: save state, call f, and restore state if f returns None.
    pub fn try_scan<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let state = self.save_state();
        let result = f(self);
        if result.is_none() {
            self.restore_state(state);
        }
        result
    }

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// The lexical error of the current token, if any.
    pub fn token_error(&self) -> Option<&ScanError> {
        self.error.as_ref()
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn token_info(&self) -> TokenInfo {
        TokenInfo {
            kind: self.token,
            pos: self.token_start as u32,
            end: self.pos as u32,
            value: self.token_value.clone(),
            flags: self.token_flags,
        }
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            token_flags: self.token_flags,
            error: self.error.clone(),
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
        self.token_flags = state.token_flags;
        self.error = state.error;
        self.diagnostics.truncate(state.diagnostics_len);
    }

    /// Substring of the source by character offsets, clamped to the text.
    pub fn text_slice(&self, start: usize, end: usize) -> String {
        let s = start.min(self.text.len());
        let e = end.min(self.text.len()).max(s);
        self.text[s..e].iter().collect()
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    fn report(&mut self, message: &DiagnosticMessage, args: &[&str], pos: usize) {
        let diagnostic = Diagnostic::with_range(TextRange::new(pos as u32, self.pos.max(pos) as u32), message, args);
        if self.error.is_none() {
            self.error = Some(ScanError {
                message: diagnostic.message_text.clone(),
                pos: pos as u32,
            });
        }
        self.diagnostics.add(diagnostic);
    }

    /// Skip whitespace and comments, recording line breaks in the token flags.
    fn skip_trivia(&mut self) {
        loop {
            let Some(ch) = self.current_char() else {
                return;
            };
            match ch {
                '\r' | '\n' | '\u{2028}' | '\u{2029}' => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                '/' if self.char_at(1) == Some('/') => {
                    self.pos += 2;
                    while let Some(c) = self.current_char() {
                        if is_line_break(c) {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                '/' if self.char_at(1) == Some('*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match self.current_char() {
                            None => {
                                self.report(&messages::UNTERMINATED_COMMENT, &[], start);
                                return;
                            }
                            Some('*') if self.char_at(1) == Some('/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(c) => {
                                if is_line_break(c) {
                                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                                }
                                self.pos += 1;
                            }
                        }
                    }
                }
                c if is_white_space_single_line(c) => {
                    self.pos += 1;
                }
                _ => return,
            }
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_flags = TokenFlags::NONE;
        self.token_value.clear();
        self.error = None;

        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.current_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '(' => self.single(SyntaxKind::OpenParenToken),
            ')' => self.single(SyntaxKind::CloseParenToken),
            '{' => self.single(SyntaxKind::OpenBraceToken),
            '}' => self.single(SyntaxKind::CloseBraceToken),
            '[' => self.single(SyntaxKind::OpenBracketToken),
            ']' => self.single(SyntaxKind::CloseBracketToken),
            ';' => self.single(SyntaxKind::SemicolonToken),
            ',' => self.single(SyntaxKind::CommaToken),
            '~' => self.single(SyntaxKind::TildeToken),
            '?' => self.single(SyntaxKind::QuestionToken),
            ':' => self.single(SyntaxKind::ColonToken),

            '.' => {
                if self.char_at(1).map_or(false, is_digit) {
                    self.scan_number()
                } else {
                    self.single(SyntaxKind::DotToken)
                }
            }
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equality(SyntaxKind::EqualsToken, SyntaxKind::EqualsEqualsToken, SyntaxKind::EqualsEqualsEqualsToken),
            '!' => self.scan_equality(
                SyntaxKind::ExclamationToken,
                SyntaxKind::ExclamationEqualsToken,
                SyntaxKind::ExclamationEqualsEqualsToken,
            ),
            '+' => self.scan_doubled('+', SyntaxKind::PlusToken, SyntaxKind::PlusPlusToken, SyntaxKind::PlusEqualsToken),
            '-' => self.scan_doubled('-', SyntaxKind::MinusToken, SyntaxKind::MinusMinusToken, SyntaxKind::MinusEqualsToken),
            '&' => self.scan_doubled(
                '&',
                SyntaxKind::AmpersandToken,
                SyntaxKind::AmpersandAmpersandToken,
                SyntaxKind::AmpersandEqualsToken,
            ),
            '|' => self.scan_doubled('|', SyntaxKind::BarToken, SyntaxKind::BarBarToken, SyntaxKind::BarEqualsToken),
            '*' => self.scan_compound(SyntaxKind::AsteriskToken, SyntaxKind::AsteriskEqualsToken),
            '/' => self.scan_compound(SyntaxKind::SlashToken, SyntaxKind::SlashEqualsToken),
            '%' => self.scan_compound(SyntaxKind::PercentToken, SyntaxKind::PercentEqualsToken),
            '^' => self.scan_compound(SyntaxKind::CaretToken, SyntaxKind::CaretEqualsToken),

            '\'' | '"' => self.scan_string_literal(ch),

            '0'..='9' => self.scan_number(),

            '\\' => self.scan_identifier(),
            _ if is_identifier_start(ch) => self.scan_identifier(),

            _ => {
                self.pos += 1;
                self.token_value.push(ch);
                let text = ch.to_string();
                self.report(&messages::UNEXPECTED_CHARACTER, &[&text], self.token_start);
                SyntaxKind::Unknown
            }
        };

        self.token
    }

    // ========================================================================
    // Punctuation
    // ========================================================================

    #[inline]
    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    /// `x` or `x=`.
    fn scan_compound(&mut self, plain: SyntaxKind, assign: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some('=') {
            self.pos += 2;
            assign
        } else {
            self.pos += 1;
            plain
        }
    }

    /// `x`, `xx` or `x=`.
    fn scan_doubled(&mut self, ch: char, plain: SyntaxKind, doubled: SyntaxKind, assign: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some(ch) {
            self.pos += 2;
            doubled
        } else {
            self.scan_compound(plain, assign)
        }
    }

    /// `=`/`!`, then `==`/`!=`, then `===`/`!==`.
    fn scan_equality(&mut self, plain: SyntaxKind, loose: SyntaxKind, strict: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some('=') {
            if self.char_at(2) == Some('=') {
                self.pos += 3;
                strict
            } else {
                self.pos += 2;
                loose
            }
        } else {
            self.pos += 1;
            plain
        }
    }

    fn scan_less_than(&mut self) -> SyntaxKind {
        match (self.char_at(1), self.char_at(2)) {
            (Some('<'), Some('=')) => {
                self.pos += 3;
                SyntaxKind::LessThanLessThanEqualsToken
            }
            (Some('<'), _) => {
                self.pos += 2;
                SyntaxKind::LessThanLessThanToken
            }
            (Some('='), _) => {
                self.pos += 2;
                SyntaxKind::LessThanEqualsToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::LessThanToken
            }
        }
    }

    fn scan_greater_than(&mut self) -> SyntaxKind {
        match (self.char_at(1), self.char_at(2), self.char_at(3)) {
            (Some('>'), Some('>'), Some('=')) => {
                self.pos += 4;
                SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken
            }
            (Some('>'), Some('>'), _) => {
                self.pos += 3;
                SyntaxKind::GreaterThanGreaterThanGreaterThanToken
            }
            (Some('>'), Some('='), _) => {
                self.pos += 3;
                SyntaxKind::GreaterThanGreaterThanEqualsToken
            }
            (Some('>'), _, _) => {
                self.pos += 2;
                SyntaxKind::GreaterThanGreaterThanToken
            }
            (Some('='), _, _) => {
                self.pos += 2;
                SyntaxKind::GreaterThanEqualsToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::GreaterThanToken
            }
        }
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn scan_string_literal(&mut self, quote: char) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        let mut result = String::new();
        loop {
            let Some(ch) = self.current_char() else {
                self.report(&messages::UNTERMINATED_STRING_CONSTANT, &[], start);
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            };
            if ch == quote {
                self.pos += 1;
                break;
            }
            if is_line_break(ch) {
                self.report(&messages::UNTERMINATED_STRING_CONSTANT, &[], start);
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            }
            if ch == '\\' {
                self.pos += 1;
                self.scan_escape(&mut result);
                continue;
            }
            result.push(ch);
            self.pos += 1;
        }
        self.token_value = result;
        SyntaxKind::StringLiteral
    }

    /// Decode one escape sequence; `pos` is just past the backslash.
    fn scan_escape(&mut self, out: &mut String) {
        let Some(ch) = self.current_char() else {
            return;
        };
        self.pos += 1;
        match ch {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{0008}'),
            'v' => out.push('\u{000B}'),
            'f' => out.push('\u{000C}'),
            '\r' => {
                // Line continuation.
                if self.current_char() == Some('\n') {
                    self.pos += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => match self.scan_hex_escape(2) {
                Some(c) => out.push(c),
                None => self.report(&messages::BAD_ESCAPE_SEQUENCE, &[], self.pos),
            },
            'u' => match self.scan_hex_escape(4) {
                Some(c) => out.push(c),
                None => self.report(&messages::BAD_ESCAPE_SEQUENCE, &[], self.pos),
            },
            '0'..='7' => {
                // Legacy octal escape, up to three digits with value <= 0o377.
                let mut value = ch.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.current_char().and_then(|c| c.to_digit(8)) {
                        Some(d) if value * 8 + d <= 0o377 => {
                            value = value * 8 + d;
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
            }
            other => out.push(other),
        }
    }

    /// Read exactly `digits` hex digits as a code point.
    fn scan_hex_escape(&mut self, digits: usize) -> Option<char> {
        let mut value = 0u32;
        for i in 0..digits {
            let d = self.char_at(i)?.to_digit(16)?;
            value = value * 16 + d;
        }
        self.pos += digits;
        Some(char::from_u32(value).unwrap_or('\u{FFFD}'))
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;

        if self.current_char() == Some('0') {
            match self.char_at(1) {
                Some('x') | Some('X') => {
                    self.pos += 2;
                    self.token_flags |= TokenFlags::HEX_SPECIFIER;
                    let digits_start = self.pos;
                    while self.current_char().map_or(false, is_hex_digit) {
                        self.pos += 1;
                    }
                    if self.pos == digits_start {
                        self.report(&messages::EXPECTED_HEXADECIMAL_NUMBER, &[], start);
                    }
                    return self.finish_number(start);
                }
                Some(c) if is_digit(c) => {
                    // Legacy octal (`017`), or decimal if an 8 or 9 shows up.
                    let mut digits = 1;
                    while self.char_at(digits).map_or(false, is_digit) {
                        digits += 1;
                    }
                    let all_octal = (1..digits).all(|i| self.char_at(i).map_or(false, is_octal_digit));
                    if all_octal {
                        self.pos += digits;
                        self.token_flags |= TokenFlags::OCTAL;
                        return self.finish_number(start);
                    }
                }
                _ => {}
            }
        }

        self.scan_digits();
        if self.current_char() == Some('.') {
            self.pos += 1;
            self.scan_digits();
        }

        if let Some('e') | Some('E') = self.current_char() {
            self.pos += 1;
            self.token_flags |= TokenFlags::SCIENTIFIC;
            if let Some('+') | Some('-') = self.current_char() {
                self.pos += 1;
            }
            let exp_start = self.pos;
            self.scan_digits();
            if self.pos == exp_start {
                self.report(&messages::INVALID_NUMBER, &[], start);
            }
        }

        self.finish_number(start)
    }

    fn finish_number(&mut self, start: usize) -> SyntaxKind {
        if self.current_char().map_or(false, is_identifier_start) {
            self.report(&messages::IDENTIFIER_DIRECTLY_AFTER_NUMBER, &[], self.pos);
        }
        self.token_value = self.text_slice(start, self.pos);
        SyntaxKind::NumericLiteral
    }

    fn scan_digits(&mut self) {
        while self.current_char().map_or(false, is_digit) {
            self.pos += 1;
        }
    }

    /// Rescan the current `/` or `/=` token as a regular expression literal.
    /// Called by the parser where an expression operand is expected.
    pub fn rescan_slash_token(&mut self) -> SyntaxKind {
        let start = self.token_start;
        self.pos = start + 1;
        self.error = None;
        let mut in_character_class = false;

        loop {
            let Some(ch) = self.current_char() else {
                self.report(&messages::UNTERMINATED_REGULAR_EXPRESSION, &[], start);
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            };
            if is_line_break(ch) {
                self.report(&messages::UNTERMINATED_REGULAR_EXPRESSION, &[], start);
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            }
            self.pos += 1;
            match ch {
                '\\' => {
                    if self.current_char().map_or(false, |c| !is_line_break(c)) {
                        self.pos += 1;
                    }
                }
                '[' => in_character_class = true,
                ']' => in_character_class = false,
                '/' if !in_character_class => {
                    while self.current_char().map_or(false, is_identifier_part) {
                        self.pos += 1;
                    }
                    break;
                }
                _ => {}
            }
        }

        self.token_value = self.text_slice(start, self.pos);
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn scan_identifier(&mut self) -> SyntaxKind {
        let mut name = String::new();
        let mut first = true;
        loop {
            match self.current_char() {
                Some('\\') => {
                    let escape_start = self.pos;
                    self.token_flags |= TokenFlags::UNICODE_ESCAPE;
                    if self.char_at(1) != Some('u') {
                        self.pos += 1;
                        self.report(&messages::BAD_ESCAPE_SEQUENCE, &[], escape_start);
                        break;
                    }
                    self.pos += 2;
                    match self.scan_hex_escape(4) {
                        Some(c) if (first && is_identifier_start(c)) || (!first && is_identifier_part(c)) => name.push(c),
                        _ => {
                            self.report(&messages::BAD_ESCAPE_SEQUENCE, &[], escape_start);
                            break;
                        }
                    }
                }
                Some(c) if (first && is_identifier_start(c)) || (!first && is_identifier_part(c)) => {
                    name.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
            first = false;
        }

        // An escaped keyword is an identifier.
        let kind = if self.token_flags.contains(TokenFlags::UNICODE_ESCAPE) {
            None
        } else {
            SyntaxKind::from_keyword(&name)
        };
        self.token_value = name;
        kind.unwrap_or(SyntaxKind::Identifier)
    }
}

/// Numeric value of a number token's raw text.
pub fn numeric_value(raw: &str) -> Option<f64> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }
    if raw.len() > 1 && raw.starts_with('0') && raw.chars().all(is_octal_digit) {
        return u64::from_str_radix(&raw[1..], 8).ok().map(|v| v as f64);
    }
    raw.parse::<f64>().ok()
}
