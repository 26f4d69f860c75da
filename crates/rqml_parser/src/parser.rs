//! The ES5 host parser.
//!
//! `JsParser` owns the scanner and the arena and parses JavaScript
//! expressions and statements. Both QML grammars wrap one and call into it
//! for every script position: binding values, statement blocks and function
//! members. It also provides the token plumbing (lookahead, checkpoints,
//! automatic semicolon insertion) the QML layers share.

use bumpalo::Bump;
use rqml_ast::node::*;
use rqml_ast::syntax_kind::{ContextualKeyword, SyntaxKind};
use rqml_core::arena::alloc_slice;
use rqml_core::text::{LineMap, TextPos};
use rqml_diagnostics::{messages, DiagnosticCollection, DiagnosticMessage, ParseError};
use rqml_scanner::{numeric_value, IdentifierRules, Scanner, ScannerState};
use tracing::trace;

use crate::precedence::{get_binary_operator_precedence, is_logical_operator, OperatorPrecedence};

/// Maximum expression nesting before the parser gives up.
const MAX_RECURSION_DEPTH: u32 = 200;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Loop,
    Switch,
    Plain,
}

#[derive(Debug, Clone, Copy)]
struct Label<'a> {
    name: Option<&'a str>,
    kind: LabelKind,
}

/// A saved parser position for speculative parsing.
pub struct Checkpoint<'a> {
    scanner: ScannerState,
    prev_end: TextPos,
    prev_token: SyntaxKind,
    in_function: bool,
    labels: Vec<Label<'a>>,
    recursion_depth: u32,
}

pub struct JsParser<'a> {
    arena: &'a Bump,
    scanner: Scanner,
    line_map: LineMap,
    rules: IdentifierRules,
    /// End of the last consumed token; finished nodes end here.
    prev_end: TextPos,
    prev_token: SyntaxKind,
    in_function: bool,
    labels: Vec<Label<'a>>,
    recursion_depth: u32,
    /// Whether lexical errors abort the parse.
    fatal_scan_errors: bool,
}

impl<'a> JsParser<'a> {
    pub fn new(arena: &'a Bump, source: &str, rules: IdentifierRules) -> Self {
        Self {
            arena,
            scanner: Scanner::new(source),
            line_map: LineMap::new(source),
            rules,
            prev_end: 0,
            prev_token: SyntaxKind::Unknown,
            in_function: false,
            labels: Vec::new(),
            recursion_depth: 0,
            fatal_scan_errors: true,
        }
    }

    /// Keep going past lexical errors; they are still recorded as diagnostics.
    pub fn tolerate_scan_errors(mut self) -> Self {
        self.fatal_scan_errors = false;
        self
    }

    #[inline]
    pub fn arena(&self) -> &'a Bump { self.arena }

    #[inline]
    pub fn line_map(&self) -> &LineMap { &self.line_map }

    #[inline]
    pub fn chars(&self) -> &[char] { self.scanner.chars() }

    #[inline]
    pub fn source_len(&self) -> TextPos { self.scanner.text_len() as TextPos }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        self.scanner.take_diagnostics()
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub fn token(&self) -> SyntaxKind { self.scanner.token() }

    #[inline]
    pub fn token_pos(&self) -> TextPos { self.scanner.token_start() as TextPos }

    #[inline]
    pub fn token_end(&self) -> TextPos { self.scanner.token_end() as TextPos }

    #[inline]
    pub fn token_value(&self) -> &str { self.scanner.token_value() }

    #[inline]
    pub fn prev_end(&self) -> TextPos { self.prev_end }

    #[inline]
    pub fn prev_token(&self) -> SyntaxKind { self.prev_token }

    #[inline]
    pub fn at(&self, kind: SyntaxKind) -> bool { self.token() == kind }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool { self.scanner.has_preceding_line_break() }

    /// 0-based line of a character offset.
    #[inline]
    pub fn line_of(&self, pos: TextPos) -> u32 { self.line_map.line_of(pos) }

    /// Move to the next token without checking it for lexical errors.
    pub fn advance(&mut self) {
        self.prev_end = self.token_end();
        self.prev_token = self.token();
        self.scanner.scan();
    }

    /// Move to the next token, failing on a lexical error when those are fatal.
    pub fn next_token(&mut self) -> ParseResult<()> {
        self.advance();
        self.check_scan_error()
    }

    fn check_scan_error(&self) -> ParseResult<()> {
        if !self.fatal_scan_errors {
            return Ok(());
        }
        match self.scanner.token_error() {
            Some(err) => Err(ParseError::new(err.message.clone(), err.pos, self.line_map.position_of(err.pos))),
            None => Ok(()),
        }
    }

    pub fn eat(&mut self, kind: SyntaxKind) -> ParseResult<bool> {
        if self.at(kind) {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn expect(&mut self, kind: SyntaxKind) -> ParseResult<()> {
        if self.eat(kind)? {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    pub fn is_contextual(&self, keyword: ContextualKeyword) -> bool {
        self.at(SyntaxKind::Identifier) && self.token_value() == keyword.as_str()
    }

    pub fn eat_contextual(&mut self, keyword: ContextualKeyword) -> ParseResult<bool> {
        if self.is_contextual(keyword) {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn expect_contextual(&mut self, keyword: ContextualKeyword) -> ParseResult<()> {
        if self.eat_contextual(keyword)? {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    /// Whether a semicolon may be inserted before the current token.
    pub fn can_insert_semicolon(&self) -> bool {
        matches!(self.token(), SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken)
            || self.has_preceding_line_break()
    }

    /// Consume a statement terminator, inserting one where the rules allow.
    pub fn semicolon(&mut self) -> ParseResult<()> {
        if self.eat(SyntaxKind::SemicolonToken)? || self.can_insert_semicolon() {
            Ok(())
        } else {
            self.unexpected()
        }
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub fn error_at(&self, pos: TextPos, message: &DiagnosticMessage, args: &[&str]) -> ParseError {
        ParseError::from_message(message, args, pos, self.line_map.position_of(pos))
    }

    pub fn unexpected<T>(&self) -> ParseResult<T> {
        self.unexpected_at(self.token_pos())
    }

    pub fn unexpected_at<T>(&self, pos: TextPos) -> ParseResult<T> {
        Err(self.error_at(pos, &messages::UNEXPECTED_TOKEN, &[]))
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Node data running from `start` to the end of the last consumed token.
    #[inline]
    pub fn finish(&self, kind: SyntaxKind, start: TextPos) -> NodeData {
        NodeData::new(kind, start, self.prev_end.max(start))
    }

    #[inline]
    pub fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    #[inline]
    pub fn alloc_slice<T>(&self, items: Vec<T>) -> &'a [T] {
        alloc_slice(self.arena, items)
    }

    #[inline]
    pub fn alloc_str(&self, text: &str) -> &'a str {
        self.arena.alloc_str(text)
    }

    /// Source text between two character offsets, copied into the arena.
    pub fn source_slice(&self, start: TextPos, end: TextPos) -> &'a str {
        let text = self.scanner.text_slice(start as usize, end as usize);
        self.arena.alloc_str(&text)
    }

    // ========================================================================
    // Speculative parsing
    // ========================================================================

    pub fn checkpoint(&self) -> Checkpoint<'a> {
        Checkpoint {
            scanner: self.scanner.save_state(),
            prev_end: self.prev_end,
            prev_token: self.prev_token,
            in_function: self.in_function,
            labels: self.labels.clone(),
            recursion_depth: self.recursion_depth,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint<'a>) {
        self.scanner.restore_state(checkpoint.scanner);
        self.prev_end = checkpoint.prev_end;
        self.prev_token = checkpoint.prev_token;
        self.in_function = checkpoint.in_function;
        self.labels = checkpoint.labels;
        self.recursion_depth = checkpoint.recursion_depth;
    }

    /// Run `f` and rewind to the current position afterwards.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let checkpoint = self.checkpoint();
        let result = f(self);
        self.restore(checkpoint);
        result
    }

    /// Run `f`, rewinding to the current position if it fails.
    pub fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let checkpoint = self.checkpoint();
        let result = f(self);
        if let Err(err) = &result {
            trace!(pos = err.pos, message = %err.message, "rolling back speculative parse");
            self.restore(checkpoint);
        }
        result
    }

    /// Enter or leave a function body; returns the previous state.
    pub fn set_in_function(&mut self, in_function: bool) -> bool {
        std::mem::replace(&mut self.in_function, in_function)
    }

    /// Parse `f` as the body of a function: `return` is allowed and enclosing
    /// labels are not visible.
    pub fn in_function_body<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved_in_function = self.set_in_function(true);
        let saved_labels = std::mem::take(&mut self.labels);
        let result = f(self);
        self.in_function = saved_in_function;
        self.labels = saved_labels;
        result
    }

    // ========================================================================
    // Identifiers & literals
    // ========================================================================

    /// Parse an identifier. With `liberal`, keywords and reserved words are
    /// accepted as names (property keys, member names).
    pub fn parse_ident(&mut self, liberal: bool) -> ParseResult<Identifier<'a>> {
        let start = self.token_pos();
        let end = self.token_end();
        let name = match self.token() {
            SyntaxKind::Identifier => {
                let value = self.token_value();
                if !liberal {
                    if value == ContextualKeyword::Var.as_str() {
                        return self.unexpected();
                    }
                    if self.rules.is_reserved(value) {
                        return Err(self.error_at(start, &messages::KEYWORD_IS_RESERVED, &[value]));
                    }
                }
                self.alloc_str(value)
            }
            kind if liberal && kind.is_keyword() => kind.keyword_text().unwrap_or_default(),
            _ => return self.unexpected(),
        };
        self.next_token()?;
        Ok(Identifier::new(start, end, name))
    }

    /// The current token as a literal, without consuming it.
    pub fn token_literal(&self) -> Option<Literal<'a>> {
        let start = self.token_pos();
        let end = self.token_end();
        let value = match self.token() {
            SyntaxKind::NumericLiteral => LiteralValue::Number(numeric_value(self.token_value()).unwrap_or(0.0)),
            SyntaxKind::StringLiteral => LiteralValue::String(self.alloc_str(self.token_value())),
            SyntaxKind::NullKeyword => LiteralValue::Null,
            SyntaxKind::TrueKeyword => LiteralValue::Boolean(true),
            SyntaxKind::FalseKeyword => LiteralValue::Boolean(false),
            SyntaxKind::RegularExpressionLiteral => {
                let raw = self.token_value();
                let (pattern, flags) = match raw.rfind('/') {
                    Some(close) if close > 0 => (&raw[1..close], &raw[close + 1..]),
                    _ => (raw.get(1..).unwrap_or_default(), ""),
                };
                LiteralValue::RegExp {
                    pattern: self.alloc_str(pattern),
                    flags: self.alloc_str(flags),
                }
            }
            _ => return None,
        };
        Some(Literal {
            data: NodeData::new(SyntaxKind::Literal, start, end),
            value,
            raw: self.source_slice(start, end),
        })
    }

    pub fn parse_literal(&mut self) -> ParseResult<Literal<'a>> {
        let Some(literal) = self.token_literal() else {
            return self.unexpected();
        };
        self.next_token()?;
        Ok(literal)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse a full expression, including comma sequences.
    pub fn parse_expression(&mut self) -> ParseResult<Expression<'a>> {
        self.parse_expression_in(true)
    }

    fn parse_expression_in(&mut self, allow_in: bool) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        let first = self.parse_assignment_in(allow_in)?;
        if !self.at(SyntaxKind::CommaToken) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(SyntaxKind::CommaToken)? {
            expressions.push(self.parse_assignment_in(allow_in)?);
        }
        Ok(Expression::Sequence(self.alloc(SequenceExpression {
            data: self.finish(SyntaxKind::SequenceExpression, start),
            expressions: self.alloc_slice(expressions),
        })))
    }

    pub fn parse_assignment_expression(&mut self) -> ParseResult<Expression<'a>> {
        self.parse_assignment_in(true)
    }

    fn parse_assignment_in(&mut self, allow_in: bool) -> ParseResult<Expression<'a>> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return self.unexpected();
        }
        let result = self.parse_assignment_inner(allow_in);
        self.recursion_depth -= 1;
        result
    }

    fn parse_assignment_inner(&mut self, allow_in: bool) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        let left = self.parse_conditional(allow_in)?;
        if !self.token().is_assignment_operator() {
            return Ok(left);
        }
        if !left.is_assignment_target() {
            return Err(self.error_at(left.range().pos, &messages::ASSIGNING_TO_RVALUE, &[]));
        }
        let operator = self.token();
        self.next_token()?;
        let right = self.parse_assignment_in(allow_in)?;
        Ok(Expression::Assignment(self.alloc(AssignmentExpression {
            data: self.finish(SyntaxKind::AssignmentExpression, start),
            operator,
            left,
            right,
        })))
    }

    fn parse_conditional(&mut self, allow_in: bool) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        let test = self.parse_binary(allow_in)?;
        if !self.eat(SyntaxKind::QuestionToken)? {
            return Ok(test);
        }
        let consequent = self.parse_assignment_in(true)?;
        self.expect(SyntaxKind::ColonToken)?;
        let alternate = self.parse_assignment_in(allow_in)?;
        Ok(Expression::Conditional(self.alloc(ConditionalExpression {
            data: self.finish(SyntaxKind::ConditionalExpression, start),
            test,
            consequent,
            alternate,
        })))
    }

    fn parse_binary(&mut self, allow_in: bool) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        let left = self.parse_unary()?;
        self.parse_binary_rest(left, start, OperatorPrecedence::Lowest, allow_in)
    }

    /// Precedence climbing: fold operators binding tighter than `min`.
    fn parse_binary_rest(
        &mut self,
        mut left: Expression<'a>,
        left_start: TextPos,
        min: OperatorPrecedence,
        allow_in: bool,
    ) -> ParseResult<Expression<'a>> {
        loop {
            let operator = self.token();
            let precedence = get_binary_operator_precedence(operator, allow_in);
            if precedence == OperatorPrecedence::Invalid || precedence <= min {
                return Ok(left);
            }
            self.next_token()?;
            let right_start = self.token_pos();
            let operand = self.parse_unary()?;
            let right = self.parse_binary_rest(operand, right_start, precedence, allow_in)?;
            let kind = if is_logical_operator(operator) {
                SyntaxKind::LogicalExpression
            } else {
                SyntaxKind::BinaryExpression
            };
            left = Expression::Binary(self.alloc(BinaryExpression {
                data: self.finish(kind, left_start),
                operator,
                left,
                right,
            }));
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        let operator = self.token();
        match operator {
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                self.next_token()?;
                let argument = self.parse_unary()?;
                self.check_update_target(&argument)?;
                Ok(Expression::Update(self.alloc(UpdateExpression {
                    data: self.finish(SyntaxKind::UpdateExpression, start),
                    operator,
                    prefix: true,
                    argument,
                })))
            }
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken
            | SyntaxKind::TypeOfKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::DeleteKeyword => {
                self.next_token()?;
                let argument = self.parse_unary()?;
                Ok(Expression::Unary(self.alloc(UnaryExpression {
                    data: self.finish(SyntaxKind::UnaryExpression, start),
                    operator,
                    argument,
                })))
            }
            _ => {
                let expr = self.parse_expr_subscripts()?;
                let postfix = self.token();
                if matches!(postfix, SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken)
                    && !self.has_preceding_line_break()
                {
                    self.check_update_target(&expr)?;
                    self.next_token()?;
                    return Ok(Expression::Update(self.alloc(UpdateExpression {
                        data: self.finish(SyntaxKind::UpdateExpression, start),
                        operator: postfix,
                        prefix: false,
                        argument: expr,
                    })));
                }
                Ok(expr)
            }
        }
    }

    fn check_update_target(&self, argument: &Expression<'a>) -> ParseResult<()> {
        if argument.is_assignment_target() {
            Ok(())
        } else {
            Err(self.error_at(argument.range().pos, &messages::ASSIGNING_TO_RVALUE, &[]))
        }
    }

    fn parse_expr_subscripts(&mut self) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        let base = self.parse_expr_atom()?;
        self.parse_subscripts(base, start, false)
    }

    fn parse_subscripts(&mut self, mut base: Expression<'a>, start: TextPos, no_calls: bool) -> ParseResult<Expression<'a>> {
        loop {
            if self.eat(SyntaxKind::DotToken)? {
                let property = Expression::Identifier(self.parse_ident(true)?);
                base = self.member_expression(start, base, property, false);
            } else if self.eat(SyntaxKind::OpenBracketToken)? {
                let property = self.parse_expression()?;
                self.expect(SyntaxKind::CloseBracketToken)?;
                base = self.member_expression(start, base, property, true);
            } else if !no_calls && self.eat(SyntaxKind::OpenParenToken)? {
                let arguments = self.parse_expression_list(SyntaxKind::CloseParenToken)?;
                base = Expression::Call(self.alloc(CallExpression {
                    data: self.finish(SyntaxKind::CallExpression, start),
                    callee: base,
                    arguments,
                }));
            } else {
                return Ok(base);
            }
        }
    }

    fn member_expression(&self, start: TextPos, object: Expression<'a>, property: Expression<'a>, computed: bool) -> Expression<'a> {
        Expression::Member(self.alloc(MemberExpression {
            data: self.finish(SyntaxKind::MemberExpression, start),
            object,
            property,
            computed,
        }))
    }

    fn parse_expr_atom(&mut self) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::ThisKeyword => {
                self.next_token()?;
                Ok(Expression::This(self.finish(SyntaxKind::ThisExpression, start)))
            }
            SyntaxKind::Identifier => Ok(Expression::Identifier(self.parse_ident(false)?)),
            SyntaxKind::NumericLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::NullKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword => Ok(Expression::Literal(self.parse_literal()?)),
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.scanner.rescan_slash_token();
                self.check_scan_error()?;
                Ok(Expression::Literal(self.parse_literal()?))
            }
            SyntaxKind::OpenParenToken => {
                self.next_token()?;
                let expr = self.parse_expression()?;
                self.expect(SyntaxKind::CloseParenToken)?;
                Ok(expr)
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_expression(),
            SyntaxKind::FunctionKeyword => {
                self.next_token()?;
                Ok(Expression::Function(self.parse_function(start, false)?))
            }
            SyntaxKind::NewKeyword => self.parse_new(),
            _ => self.unexpected(),
        }
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        self.expect(SyntaxKind::OpenBracketToken)?;
        let mut elements = Vec::new();
        while !self.eat(SyntaxKind::CloseBracketToken)? {
            if self.eat(SyntaxKind::CommaToken)? {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_assignment_in(true)?));
            if !self.at(SyntaxKind::CloseBracketToken) {
                self.expect(SyntaxKind::CommaToken)?;
            }
        }
        Ok(Expression::Array(self.alloc(ArrayExpression {
            data: self.finish(SyntaxKind::ArrayExpression, start),
            elements: self.alloc_slice(elements),
        })))
    }

    fn parse_object_expression(&mut self) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        self.expect(SyntaxKind::OpenBraceToken)?;
        let mut properties = Vec::new();
        while !self.eat(SyntaxKind::CloseBraceToken)? {
            if !properties.is_empty() {
                self.expect(SyntaxKind::CommaToken)?;
                if self.eat(SyntaxKind::CloseBraceToken)? {
                    break;
                }
            }
            properties.push(self.parse_object_property()?);
        }
        Ok(Expression::Object(self.alloc(ObjectExpression {
            data: self.finish(SyntaxKind::ObjectExpression, start),
            properties: self.alloc_slice(properties),
        })))
    }

    fn parse_object_property(&mut self) -> ParseResult<ObjectProperty<'a>> {
        let start = self.token_pos();
        let accessor = match self.token_value() {
            "get" if self.at(SyntaxKind::Identifier) => Some(PropertyKind::Get),
            "set" if self.at(SyntaxKind::Identifier) => Some(PropertyKind::Set),
            _ => None,
        };
        if let Some(kind) = accessor {
            let is_accessor = self.look_ahead(|p| {
                p.next_token().is_ok()
                    && !matches!(
                        p.token(),
                        SyntaxKind::ColonToken | SyntaxKind::CommaToken | SyntaxKind::CloseBraceToken
                    )
            });
            if is_accessor {
                self.next_token()?;
                let key = self.parse_property_key()?;
                let function_start = self.token_pos();
                let value = self.parse_function_rest(function_start, None, SyntaxKind::FunctionExpression)?;
                return Ok(ObjectProperty {
                    data: self.finish(SyntaxKind::Property, start),
                    key,
                    value: Expression::Function(value),
                    kind,
                });
            }
        }
        let key = self.parse_property_key()?;
        self.expect(SyntaxKind::ColonToken)?;
        let value = self.parse_assignment_in(true)?;
        Ok(ObjectProperty {
            data: self.finish(SyntaxKind::Property, start),
            key,
            value,
            kind: PropertyKind::Init,
        })
    }

    fn parse_property_key(&mut self) -> ParseResult<PropertyKey<'a>> {
        match self.token() {
            SyntaxKind::NumericLiteral | SyntaxKind::StringLiteral => Ok(PropertyKey::Literal(self.parse_literal()?)),
            _ => Ok(PropertyKey::Identifier(self.parse_ident(true)?)),
        }
    }

    fn parse_new(&mut self) -> ParseResult<Expression<'a>> {
        let start = self.token_pos();
        self.expect(SyntaxKind::NewKeyword)?;
        let callee_start = self.token_pos();
        let callee = if self.at(SyntaxKind::NewKeyword) {
            self.parse_new()?
        } else {
            self.parse_expr_atom()?
        };
        let callee = self.parse_subscripts(callee, callee_start, true)?;
        let arguments = if self.eat(SyntaxKind::OpenParenToken)? {
            self.parse_expression_list(SyntaxKind::CloseParenToken)?
        } else {
            &[]
        };
        Ok(Expression::Call(self.alloc(CallExpression {
            data: self.finish(SyntaxKind::NewExpression, start),
            callee,
            arguments,
        })))
    }

    /// Comma-separated expressions up to and including `close`.
    fn parse_expression_list(&mut self, close: SyntaxKind) -> ParseResult<&'a [Expression<'a>]> {
        let mut items = Vec::new();
        while !self.eat(close)? {
            if !items.is_empty() {
                self.expect(SyntaxKind::CommaToken)?;
            }
            items.push(self.parse_assignment_in(true)?);
        }
        Ok(self.alloc_slice(items))
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Parse a function whose `function` keyword starts at `start` and has
    /// already been consumed. Declarations require a name.
    pub fn parse_function(&mut self, start: TextPos, is_statement: bool) -> ParseResult<&'a Function<'a>> {
        let id = if is_statement || self.at(SyntaxKind::Identifier) {
            Some(self.parse_ident(false)?)
        } else {
            None
        };
        let kind = if is_statement {
            SyntaxKind::FunctionDeclaration
        } else {
            SyntaxKind::FunctionExpression
        };
        self.parse_function_rest(start, id, kind)
    }

    /// Parameters and body of a function.
    pub fn parse_function_rest(
        &mut self,
        start: TextPos,
        id: Option<Identifier<'a>>,
        kind: SyntaxKind,
    ) -> ParseResult<&'a Function<'a>> {
        self.expect(SyntaxKind::OpenParenToken)?;
        let mut params = Vec::new();
        while !self.eat(SyntaxKind::CloseParenToken)? {
            if !params.is_empty() {
                self.expect(SyntaxKind::CommaToken)?;
            }
            params.push(self.parse_ident(false)?);
        }
        let body = self.in_function_body(|p| p.parse_block())?;
        Ok(self.alloc(Function {
            data: self.finish(kind, start),
            id,
            params: self.alloc_slice(params),
            body,
            scope: scope_slot(),
        }))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn parse_statement(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => self.parse_break_continue(),
            SyntaxKind::DebuggerKeyword => {
                self.next_token()?;
                self.semicolon()?;
                Ok(Statement::Debugger(self.finish(SyntaxKind::DebuggerStatement, start)))
            }
            SyntaxKind::DoKeyword => self.parse_do(),
            SyntaxKind::ForKeyword => self.parse_for(),
            SyntaxKind::FunctionKeyword => {
                self.next_token()?;
                Ok(Statement::FunctionDeclaration(self.parse_function(start, true)?))
            }
            SyntaxKind::IfKeyword => self.parse_if(),
            SyntaxKind::ReturnKeyword => self.parse_return(),
            SyntaxKind::SwitchKeyword => self.parse_switch(),
            SyntaxKind::ThrowKeyword => self.parse_throw(),
            SyntaxKind::TryKeyword => self.parse_try(),
            SyntaxKind::WhileKeyword => self.parse_while(),
            SyntaxKind::WithKeyword => self.parse_with(),
            SyntaxKind::OpenBraceToken => Ok(Statement::Block(self.parse_block()?)),
            SyntaxKind::SemicolonToken => {
                self.next_token()?;
                Ok(Statement::Empty(self.finish(SyntaxKind::EmptyStatement, start)))
            }
            SyntaxKind::Identifier if self.is_contextual(ContextualKeyword::Var) => {
                self.next_token()?;
                let declarations = self.parse_var_declarators(true)?;
                self.semicolon()?;
                Ok(Statement::VariableDeclaration(self.variable_declaration(start, declarations)))
            }
            _ => {
                let expression = self.parse_expression()?;
                if let Expression::Identifier(label) = expression {
                    if self.eat(SyntaxKind::ColonToken)? {
                        return self.parse_labeled(start, label);
                    }
                }
                self.semicolon()?;
                Ok(Statement::Expression(self.alloc(ExpressionStatement {
                    data: self.finish(SyntaxKind::ExpressionStatement, start),
                    expression,
                })))
            }
        }
    }

    pub fn parse_block(&mut self) -> ParseResult<&'a BlockStatement<'a>> {
        let start = self.token_pos();
        self.expect(SyntaxKind::OpenBraceToken)?;
        let mut body = Vec::new();
        while !self.eat(SyntaxKind::CloseBraceToken)? {
            body.push(self.parse_statement()?);
        }
        Ok(self.alloc(BlockStatement {
            data: self.finish(SyntaxKind::BlockStatement, start),
            body: self.alloc_slice(body),
        }))
    }

    fn parse_paren_expression(&mut self) -> ParseResult<Expression<'a>> {
        self.expect(SyntaxKind::OpenParenToken)?;
        let expr = self.parse_expression()?;
        self.expect(SyntaxKind::CloseParenToken)?;
        Ok(expr)
    }

    fn parse_break_continue(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        let is_break = self.at(SyntaxKind::BreakKeyword);
        self.next_token()?;
        let label = if self.eat(SyntaxKind::SemicolonToken)? || self.can_insert_semicolon() {
            None
        } else if self.at(SyntaxKind::Identifier) {
            let label = self.parse_ident(false)?;
            self.semicolon()?;
            Some(label)
        } else {
            return self.unexpected();
        };

        let valid = self.labels.iter().any(|l| {
            let matches_label = match label {
                Some(label) => l.name == Some(label.name),
                None => true,
            };
            matches_label && ((label.is_some() && is_break) || (l.kind != LabelKind::Plain && (is_break || l.kind == LabelKind::Loop)))
        });
        if !valid {
            let keyword = if is_break { "break" } else { "continue" };
            return Err(self.error_at(start, &messages::UNSYNTACTIC_BREAK, &[keyword]));
        }

        let node = self.alloc(JumpStatement {
            data: self.finish(
                if is_break { SyntaxKind::BreakStatement } else { SyntaxKind::ContinueStatement },
                start,
            ),
            label,
        });
        Ok(if is_break { Statement::Break(node) } else { Statement::Continue(node) })
    }

    fn parse_labeled(&mut self, start: TextPos, label: Identifier<'a>) -> ParseResult<Statement<'a>> {
        if self.labels.iter().any(|l| l.name == Some(label.name)) {
            return Err(self.error_at(label.data.range.pos, &messages::LABEL_ALREADY_DECLARED, &[label.name]));
        }
        let kind = match self.token() {
            SyntaxKind::ForKeyword | SyntaxKind::WhileKeyword | SyntaxKind::DoKeyword => LabelKind::Loop,
            SyntaxKind::SwitchKeyword => LabelKind::Switch,
            _ => LabelKind::Plain,
        };
        self.labels.push(Label { name: Some(label.name), kind });
        let body = self.parse_statement()?;
        self.labels.pop();
        Ok(Statement::Labeled(self.alloc(LabeledStatement {
            data: self.finish(SyntaxKind::LabeledStatement, start),
            label,
            body,
        })))
    }

    /// Parse a loop body with an anonymous loop label in scope.
    fn parse_loop_body(&mut self) -> ParseResult<Statement<'a>> {
        self.labels.push(Label { name: None, kind: LabelKind::Loop });
        let body = self.parse_statement()?;
        self.labels.pop();
        Ok(body)
    }

    fn parse_do(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        self.next_token()?;
        let body = self.parse_loop_body()?;
        self.expect(SyntaxKind::WhileKeyword)?;
        let test = self.parse_paren_expression()?;
        self.semicolon()?;
        Ok(Statement::DoWhile(self.alloc(WhileStatement {
            data: self.finish(SyntaxKind::DoWhileStatement, start),
            test,
            body,
        })))
    }

    fn parse_while(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        self.next_token()?;
        let test = self.parse_paren_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Statement::While(self.alloc(WhileStatement {
            data: self.finish(SyntaxKind::WhileStatement, start),
            test,
            body,
        })))
    }

    fn parse_for(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        self.next_token()?;
        self.expect(SyntaxKind::OpenParenToken)?;
        if self.at(SyntaxKind::SemicolonToken) {
            return self.parse_for_rest(start, None);
        }
        if self.is_contextual(ContextualKeyword::Var) {
            let init_start = self.token_pos();
            self.next_token()?;
            let declarations = self.parse_var_declarators(false)?;
            let single = declarations.len() == 1;
            let declaration = self.variable_declaration(init_start, declarations);
            if single && self.eat(SyntaxKind::InKeyword)? {
                return self.parse_for_in(start, ForInit::Declaration(declaration));
            }
            return self.parse_for_rest(start, Some(ForInit::Declaration(declaration)));
        }
        let init = self.parse_expression_in(false)?;
        if self.at(SyntaxKind::InKeyword) {
            if !init.is_assignment_target() {
                return Err(self.error_at(init.range().pos, &messages::ASSIGNING_TO_RVALUE, &[]));
            }
            self.next_token()?;
            return self.parse_for_in(start, ForInit::Expression(init));
        }
        self.parse_for_rest(start, Some(ForInit::Expression(init)))
    }

    fn parse_for_rest(&mut self, start: TextPos, init: Option<ForInit<'a>>) -> ParseResult<Statement<'a>> {
        self.expect(SyntaxKind::SemicolonToken)?;
        let test = if self.at(SyntaxKind::SemicolonToken) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(SyntaxKind::SemicolonToken)?;
        let update = if self.at(SyntaxKind::CloseParenToken) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(SyntaxKind::CloseParenToken)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::For(self.alloc(ForStatement {
            data: self.finish(SyntaxKind::ForStatement, start),
            init,
            test,
            update,
            body,
        })))
    }

    fn parse_for_in(&mut self, start: TextPos, left: ForInit<'a>) -> ParseResult<Statement<'a>> {
        let right = self.parse_expression()?;
        self.expect(SyntaxKind::CloseParenToken)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::ForIn(self.alloc(ForInStatement {
            data: self.finish(SyntaxKind::ForInStatement, start),
            left,
            right,
            body,
        })))
    }

    fn parse_if(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        self.next_token()?;
        let test = self.parse_paren_expression()?;
        let consequent = self.parse_statement()?;
        let alternate = if self.eat(SyntaxKind::ElseKeyword)? {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(Statement::If(self.alloc(IfStatement {
            data: self.finish(SyntaxKind::IfStatement, start),
            test,
            consequent,
            alternate,
        })))
    }

    fn parse_return(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        if !self.in_function {
            return Err(self.error_at(start, &messages::RETURN_OUTSIDE_FUNCTION, &[]));
        }
        self.next_token()?;
        let argument = if self.eat(SyntaxKind::SemicolonToken)? || self.can_insert_semicolon() {
            None
        } else {
            let argument = self.parse_expression()?;
            self.semicolon()?;
            Some(argument)
        };
        Ok(Statement::Return(self.alloc(ReturnStatement {
            data: self.finish(SyntaxKind::ReturnStatement, start),
            argument,
        })))
    }

    fn parse_switch(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        self.next_token()?;
        let discriminant = self.parse_paren_expression()?;
        self.expect(SyntaxKind::OpenBraceToken)?;
        self.labels.push(Label { name: None, kind: LabelKind::Switch });

        let mut cases = Vec::new();
        let mut saw_default = false;
        while !self.eat(SyntaxKind::CloseBraceToken)? {
            let case_start = self.token_pos();
            let test = if self.eat(SyntaxKind::CaseKeyword)? {
                Some(self.parse_expression()?)
            } else if self.at(SyntaxKind::DefaultKeyword) {
                if saw_default {
                    return Err(self.error_at(case_start, &messages::MULTIPLE_DEFAULT_CLAUSES, &[]));
                }
                saw_default = true;
                self.next_token()?;
                None
            } else {
                return self.unexpected();
            };
            self.expect(SyntaxKind::ColonToken)?;
            let mut consequent = Vec::new();
            while !matches!(
                self.token(),
                SyntaxKind::CaseKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::EndOfFileToken
            ) {
                consequent.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                data: self.finish(SyntaxKind::SwitchCase, case_start),
                test,
                consequent: self.alloc_slice(consequent),
            });
        }
        self.labels.pop();

        Ok(Statement::Switch(self.alloc(SwitchStatement {
            data: self.finish(SyntaxKind::SwitchStatement, start),
            discriminant,
            cases: self.alloc_slice(cases),
        })))
    }

    fn parse_throw(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        self.next_token()?;
        if self.has_preceding_line_break() {
            return Err(self.error_at(self.prev_end, &messages::ILLEGAL_NEWLINE_AFTER_THROW, &[]));
        }
        let argument = self.parse_expression()?;
        self.semicolon()?;
        Ok(Statement::Throw(self.alloc(ThrowStatement {
            data: self.finish(SyntaxKind::ThrowStatement, start),
            argument,
        })))
    }

    fn parse_try(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        self.next_token()?;
        let block = self.parse_block()?;
        let handler = if self.at(SyntaxKind::CatchKeyword) {
            let catch_start = self.token_pos();
            self.next_token()?;
            self.expect(SyntaxKind::OpenParenToken)?;
            let param = self.parse_ident(false)?;
            self.expect(SyntaxKind::CloseParenToken)?;
            let body = self.parse_block()?;
            Some(self.alloc(CatchClause {
                data: self.finish(SyntaxKind::CatchClause, catch_start),
                param,
                body,
            }))
        } else {
            None
        };
        let finalizer = if self.eat(SyntaxKind::FinallyKeyword)? {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error_at(start, &messages::MISSING_CATCH_OR_FINALLY, &[]));
        }
        Ok(Statement::Try(self.alloc(TryStatement {
            data: self.finish(SyntaxKind::TryStatement, start),
            block,
            handler,
            finalizer,
        })))
    }

    fn parse_with(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.token_pos();
        self.next_token()?;
        let object = self.parse_paren_expression()?;
        let body = self.parse_statement()?;
        Ok(Statement::With(self.alloc(WithStatement {
            data: self.finish(SyntaxKind::WithStatement, start),
            object,
            body,
        })))
    }

    fn parse_var_declarators(&mut self, allow_in: bool) -> ParseResult<Vec<VariableDeclarator<'a>>> {
        let mut declarations = Vec::new();
        loop {
            let start = self.token_pos();
            let id = self.parse_ident(false)?;
            let init = if self.eat(SyntaxKind::EqualsToken)? {
                Some(self.parse_assignment_in(allow_in)?)
            } else {
                None
            };
            declarations.push(VariableDeclarator {
                data: self.finish(SyntaxKind::VariableDeclarator, start),
                id,
                init,
            });
            if !self.eat(SyntaxKind::CommaToken)? {
                return Ok(declarations);
            }
        }
    }

    fn variable_declaration(&self, start: TextPos, declarations: Vec<VariableDeclarator<'a>>) -> &'a VariableDeclaration<'a> {
        self.alloc(VariableDeclaration {
            data: self.finish(SyntaxKind::VariableDeclaration, start),
            declarations: self.alloc_slice(declarations),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser<'a>(arena: &'a Bump, source: &str) -> JsParser<'a> {
        let mut parser = JsParser::new(arena, source, IdentifierRules::default());
        parser.advance();
        parser
    }

    #[test]
    fn test_precedence() {
        let arena = Bump::new();
        let mut p = parser(&arena, "a + b * c");
        let Expression::Binary(sum) = p.parse_expression().unwrap() else {
            panic!("expected binary expression");
        };
        assert_eq!(sum.operator, SyntaxKind::PlusToken);
        assert!(matches!(sum.right, Expression::Binary(b) if b.operator == SyntaxKind::AsteriskToken));
    }

    #[test]
    fn test_left_associative() {
        let arena = Bump::new();
        let mut p = parser(&arena, "a - b - c");
        let Expression::Binary(outer) = p.parse_expression().unwrap() else {
            panic!("expected binary expression");
        };
        assert!(matches!(outer.left, Expression::Binary(_)));
        assert!(matches!(outer.right, Expression::Identifier(id) if id.name == "c"));
    }

    #[test]
    fn test_logical_kind() {
        let arena = Bump::new();
        let mut p = parser(&arena, "a || b && c");
        let expr = p.parse_expression().unwrap();
        assert_eq!(expr.data().kind, SyntaxKind::LogicalExpression);
    }

    #[test]
    fn test_checkpoint_restores_position() {
        let arena = Bump::new();
        let mut p = parser(&arena, "foo(");
        let result = p.attempt(|p| p.parse_expression());
        assert!(result.is_err());
        assert_eq!(p.token(), SyntaxKind::Identifier);
        assert_eq!(p.token_value(), "foo");
    }

    #[test]
    fn test_return_needs_function() {
        let arena = Bump::new();
        let mut p = parser(&arena, "return 1");
        let err = p.parse_statement().unwrap_err();
        assert_eq!(err.to_string(), "'return' outside of function (1:0)");
    }

    #[test]
    fn test_regex_literal() {
        let arena = Bump::new();
        let mut p = parser(&arena, "/ab+c/gi");
        let Expression::Literal(lit) = p.parse_expression().unwrap() else {
            panic!("expected literal");
        };
        assert_eq!(lit.value, LiteralValue::RegExp { pattern: "ab+c", flags: "gi" });
        assert_eq!(lit.raw, "/ab+c/gi");
    }
}
