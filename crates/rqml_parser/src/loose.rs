//! The error-tolerant QML grammar.
//!
//! Mirrors the strict grammar but never fails: missing names become dummy
//! identifiers (`✖`), missing braces are inferred from indentation, and
//! script that does not parse is rolled back and skipped. The result is a
//! best-effort tree for editor features on half-typed documents.

use bumpalo::Bump;
use rqml_ast::node::*;
use rqml_ast::syntax_kind::{ContextualKeyword, SyntaxKind};
use rqml_ast::types::DUMMY_IDENTIFIER;
use rqml_core::text::{TextPos, TextRange};
use rqml_diagnostics::DiagnosticCollection;
use rqml_options::ParseOptions;
use rqml_scanner::numeric_value;
use tracing::trace;

use crate::parser::JsParser;
use crate::utilities::{indentation_at, is_builtin_type_name, is_primitive_type_name, split_version, starts_line};

pub struct LooseParser<'a> {
    js: JsParser<'a>,
}

impl<'a> LooseParser<'a> {
    pub fn new(arena: &'a Bump, source: &str, options: &ParseOptions) -> Self {
        Self {
            js: JsParser::new(arena, source, options.identifier_rules()).tolerate_scan_errors(),
        }
    }

    pub fn parse_program(self) -> &'a Program<'a> {
        self.parse_program_with_diagnostics().0
    }

    /// Parse, also returning the lexical errors the scanner recovered from.
    pub fn parse_program_with_diagnostics(mut self) -> (&'a Program<'a>, DiagnosticCollection) {
        self.js.advance();
        let header_statements = self.parse_header_statements();
        while !matches!(
            self.js.token(),
            SyntaxKind::Identifier | SyntaxKind::OpenBraceToken | SyntaxKind::EndOfFileToken
        ) {
            self.js.advance();
        }
        let root_object = if self.js.at(SyntaxKind::EndOfFileToken) {
            None
        } else {
            Some(self.parse_object_literal())
        };
        let program = self.js.alloc(Program {
            data: NodeData::new(SyntaxKind::QmlProgram, 0, self.js.source_len()),
            header_statements,
            root_object,
        });
        (program, self.js.take_diagnostics())
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.js.at(kind) {
            self.js.advance();
            true
        } else {
            false
        }
    }

    fn eat_contextual(&mut self, keyword: ContextualKeyword) -> bool {
        if self.js.is_contextual(keyword) {
            self.js.advance();
            true
        } else {
            false
        }
    }

    /// Expect a contextual keyword, skipping up to two stray tokens to find it.
    fn expect_contextual(&mut self, keyword: ContextualKeyword) -> bool {
        if self.eat_contextual(keyword) {
            return true;
        }
        for distance in 1..=2 {
            let found = self.js.look_ahead(|p| {
                for _ in 0..distance {
                    p.advance();
                }
                p.is_contextual(keyword)
            });
            if found {
                for _ in 0..=distance {
                    self.js.advance();
                }
                return true;
            }
        }
        false
    }

    fn current_line(&self) -> u32 {
        self.js.line_of(self.js.token_pos())
    }

    /// Whether the current token sits on `line`.
    fn on_line(&self, line: u32) -> bool {
        !self.js.at(SyntaxKind::EndOfFileToken) && self.current_line() == line
    }

    fn indentation_of(&self, pos: TextPos) -> u32 {
        let line = self.js.line_of(pos);
        indentation_at(self.js.chars(), self.js.line_map().line_start(line) as usize)
    }

    fn token_starts_line(&self) -> bool {
        let line_start = self.js.line_map().line_start(self.current_line());
        starts_line(self.js.chars(), line_start as usize, self.js.token_pos() as usize)
    }

    /// Whether the block opened at `line` with indentation `indent` ends here:
    /// at its closing token, at EOF, or at a line that dedents below it.
    fn closes(&self, close: SyntaxKind, indent: u32, line: u32) -> bool {
        if self.js.at(close) || self.js.at(SyntaxKind::EndOfFileToken) {
            return true;
        }
        let pos = self.js.token_pos();
        self.js.line_of(pos) != line && self.indentation_of(pos) < indent && self.token_starts_line()
    }

    /// Where a dummy for the current token goes: at the token when it is on
    /// the same line, otherwise right after the last consumed token.
    fn dummy_pos(&self) -> TextPos {
        if self.js.has_preceding_line_break() || self.js.at(SyntaxKind::EndOfFileToken) {
            self.js.prev_end()
        } else {
            self.js.token_pos()
        }
    }

    /// Kind of the token after a dotted identifier chain.
    fn chain_end_token(&mut self) -> SyntaxKind {
        self.js.look_ahead(|p| {
            if p.at(SyntaxKind::Identifier) {
                p.advance();
            }
            while p.at(SyntaxKind::DotToken) {
                p.advance();
                if p.at(SyntaxKind::Identifier) {
                    p.advance();
                }
            }
            p.token()
        })
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn parse_ident(&mut self) -> Identifier<'a> {
        if !self.js.at(SyntaxKind::Identifier) {
            return Identifier::dummy(self.dummy_pos());
        }
        let id = Identifier::new(
            self.js.token_pos(),
            self.js.token_end(),
            self.js.alloc_str(self.js.token_value()),
        );
        self.js.advance();
        id
    }

    /// An identifier that must appear on `line`.
    fn parse_ident_on_line(&mut self, line: u32) -> Identifier<'a> {
        if self.js.at(SyntaxKind::Identifier) && self.on_line(line) {
            self.parse_ident()
        } else {
            Identifier::dummy(self.js.prev_end())
        }
    }

    fn parse_qualified_id(&mut self) -> QualifiedId<'a> {
        let mut parts = vec![self.parse_ident()];
        while self.eat(SyntaxKind::DotToken) {
            parts.push(self.parse_ident());
        }
        let start = parts[0].range().pos;
        let end = parts.iter().map(|p| p.range().end).fold(self.js.prev_end(), TextPos::max).max(start);
        QualifiedId::new(self.js.arena(), TextRange::new(start, end), self.js.alloc_slice(parts))
    }

    fn dummy_qualified_id(&self, pos: TextPos) -> QualifiedId<'a> {
        QualifiedId::new(
            self.js.arena(),
            TextRange::empty(pos),
            self.js.alloc_slice(vec![Identifier::dummy(pos)]),
        )
    }

    // ========================================================================
    // Header statements
    // ========================================================================

    fn parse_header_statements(&mut self) -> HeaderStatements<'a> {
        let start = self.js.token_pos();
        let mut statements = Vec::new();
        loop {
            if self.js.at(SyntaxKind::ImportKeyword) {
                statements.push(HeaderStatement::Import(self.parse_import_statement()));
            } else if self.is_pragma_start() {
                statements.push(HeaderStatement::Pragma(self.parse_pragma_statement()));
            } else {
                break;
            }
        }
        let end = if statements.is_empty() { start } else { self.js.prev_end() };
        HeaderStatements {
            data: NodeData::new(SyntaxKind::QmlHeaderStatements, start, end),
            statements: self.js.alloc_slice(statements),
        }
    }

    fn is_pragma_start(&mut self) -> bool {
        self.js.is_contextual(ContextualKeyword::Pragma)
            && self.js.look_ahead(|p| {
                p.advance();
                p.at(SyntaxKind::Identifier) && !p.has_preceding_line_break()
            })
    }

    fn parse_import_statement(&mut self) -> &'a ImportStatement<'a> {
        let start = self.js.token_pos();
        let line = self.current_line();
        self.js.advance();
        let directory = if self.js.at(SyntaxKind::StringLiteral) && self.on_line(line) {
            self.js.token_literal()
        } else {
            None
        };
        let source = match directory {
            Some(literal) => {
                self.js.advance();
                ImportSource::Directory(literal)
            }
            None => ImportSource::Module(self.parse_module(line)),
        };
        let qualifier = if self.js.is_contextual(ContextualKeyword::As) && self.on_line(line) {
            self.js.advance();
            Some(self.parse_ident_on_line(line))
        } else {
            None
        };
        self.eat(SyntaxKind::SemicolonToken);
        self.js.alloc(ImportStatement {
            data: self.js.finish(SyntaxKind::QmlImportStatement, start),
            source,
            qualifier,
        })
    }

    fn parse_module(&mut self, line: u32) -> Module<'a> {
        let id = if self.js.at(SyntaxKind::Identifier) && self.on_line(line) {
            self.parse_qualified_id()
        } else {
            self.dummy_qualified_id(self.dummy_pos())
        };
        let version = self.parse_version_literal(line);
        let start = id.data.range.pos;
        Module {
            data: NodeData::new(SyntaxKind::QmlModule, start, version.data.range.end.max(start)),
            id,
            version,
        }
    }

    /// A version on the import's line; `0.0` with an empty range when absent.
    fn parse_version_literal(&mut self, line: u32) -> VersionLiteral<'a> {
        if !(self.js.at(SyntaxKind::NumericLiteral) && self.on_line(line)) {
            let pos = self.js.prev_end();
            return VersionLiteral {
                data: NodeData::new(SyntaxKind::QmlVersionLiteral, pos, pos),
                major: 0,
                minor: 0,
                value: 0.0,
                raw: "0.0",
            };
        }
        let start = self.js.token_pos();
        let end = self.js.token_end();
        let raw = self.js.token_value();
        let value = numeric_value(raw).unwrap_or_default();
        let (major, minor) = split_version(raw).unwrap_or((value as u32, 0));
        let raw = self.js.alloc_str(raw);
        self.js.advance();
        VersionLiteral {
            data: NodeData::new(SyntaxKind::QmlVersionLiteral, start, end),
            major,
            minor,
            value,
            raw,
        }
    }

    fn parse_pragma_statement(&mut self) -> &'a PragmaStatement<'a> {
        let start = self.js.token_pos();
        self.js.advance();
        let id = self.parse_qualified_id();
        self.eat(SyntaxKind::SemicolonToken);
        self.js.alloc(PragmaStatement {
            data: self.js.finish(SyntaxKind::QmlPragmaStatement, start),
            id,
        })
    }

    // ========================================================================
    // Objects & members
    // ========================================================================

    fn parse_object_literal(&mut self) -> &'a ObjectLiteral<'a> {
        let start = self.js.token_pos();
        let id = self.parse_qualified_id();
        self.parse_object_literal_rest(start, id)
    }

    fn parse_object_literal_rest(&mut self, start: TextPos, id: QualifiedId<'a>) -> &'a ObjectLiteral<'a> {
        let block = self.parse_member_block(start);
        self.js.alloc(ObjectLiteral {
            data: self.js.finish(SyntaxKind::QmlObjectLiteral, start),
            id,
            block,
            scope: scope_slot(),
        })
    }

    fn parse_member_block(&mut self, object_start: TextPos) -> MemberBlock<'a> {
        let start = self.js.token_pos();
        let anchor = if self.js.at(SyntaxKind::OpenBraceToken) { start } else { object_start };
        let indent = self.indentation_of(anchor);
        let line = self.js.line_of(anchor);
        self.eat(SyntaxKind::OpenBraceToken);

        let mut members = Vec::new();
        while !self.closes(SyntaxKind::CloseBraceToken, indent, line) {
            let before = self.js.token_pos();
            if let Some(member) = self.parse_member() {
                members.push(member);
            }
            if self.js.token_pos() == before && !self.closes(SyntaxKind::CloseBraceToken, indent, line) {
                self.js.advance();
            }
        }
        self.eat(SyntaxKind::CloseBraceToken);

        MemberBlock {
            data: NodeData::new(SyntaxKind::QmlMemberBlock, start, self.js.prev_end().max(start)),
            members: self.js.alloc_slice(members),
            scope: scope_slot(),
        }
    }

    fn parse_member(&mut self) -> Option<Member<'a>> {
        match self.js.token() {
            SyntaxKind::FunctionKeyword => Some(Member::Function(self.parse_function_member())),
            SyntaxKind::DefaultKeyword => Some(Member::Property(self.parse_property_declaration())),
            SyntaxKind::Identifier
                if (self.js.is_contextual(ContextualKeyword::Property)
                    || self.js.is_contextual(ContextualKeyword::Readonly))
                    && self.is_keyword_use() =>
            {
                Some(Member::Property(self.parse_property_declaration()))
            }
            SyntaxKind::Identifier if self.js.is_contextual(ContextualKeyword::Signal) && self.is_keyword_use() => {
                Some(Member::Signal(self.parse_signal_definition()))
            }
            SyntaxKind::Identifier | SyntaxKind::DotToken | SyntaxKind::ColonToken | SyntaxKind::OpenBraceToken => self
                .try_property_modifier()
                .or_else(|| self.try_object_literal_or_binding())
                .or_else(|| self.parse_untyped_member()),
            _ => {
                trace!(pos = self.js.token_pos(), "skipping token in member block");
                self.js.advance();
                None
            }
        }
    }

    fn is_keyword_use(&mut self) -> bool {
        self.js.look_ahead(|p| {
            p.advance();
            !matches!(
                p.token(),
                SyntaxKind::ColonToken | SyntaxKind::OpenBraceToken | SyntaxKind::DotToken
            )
        })
    }

    /// An object literal or binding, decided by the token after the dotted
    /// chain. `None` when that token is neither `{` nor `:`.
    fn try_object_literal_or_binding(&mut self) -> Option<Member<'a>> {
        let start = self.js.token_pos();
        match self.chain_end_token() {
            SyntaxKind::OpenBraceToken => {
                let id = self.parse_qualified_id();
                let object = self.parse_object_literal_rest(start, id);
                self.eat(SyntaxKind::SemicolonToken);
                Some(Member::Object(object))
            }
            SyntaxKind::ColonToken => {
                let id = self.parse_qualified_id();
                self.js.advance();
                let binding = self.parse_property_assignment();
                self.eat(SyntaxKind::SemicolonToken);
                Some(Member::Binding(self.js.alloc(PropertyBinding {
                    data: self.js.finish(SyntaxKind::QmlPropertyBinding, start),
                    id,
                    binding,
                    scope: scope_slot(),
                })))
            }
            _ => None,
        }
    }

    /// `Type on property { ... }`, recognized by the `on` after the type's
    /// dotted chain and a name after `on`, all on one line.
    fn try_property_modifier(&mut self) -> Option<Member<'a>> {
        if !self.js.at(SyntaxKind::Identifier) {
            return None;
        }
        let is_modifier = self.js.look_ahead(|p| {
            p.advance();
            while p.at(SyntaxKind::DotToken) {
                p.advance();
                if p.at(SyntaxKind::Identifier) {
                    p.advance();
                }
            }
            if !(p.at(SyntaxKind::Identifier) && p.token_value() == "on" && !p.has_preceding_line_break()) {
                return false;
            }
            p.advance();
            p.at(SyntaxKind::Identifier) && !p.has_preceding_line_break()
        });
        if !is_modifier {
            return None;
        }
        let start = self.js.token_pos();
        let kind = self.parse_qualified_id();
        self.js.advance();
        let id = self.parse_qualified_id();
        let block = self.parse_member_block(start);
        let modifier = self.js.alloc(PropertyModifier {
            data: self.js.finish(SyntaxKind::QmlPropertyModifier, start),
            kind,
            id,
            block,
            scope: scope_slot(),
        });
        self.eat(SyntaxKind::SemicolonToken);
        Some(Member::Modifier(modifier))
    }

    /// A member whose dotted chain is followed by neither `:` nor `{`: a
    /// declaration when it reads like `type name` or starts with a primitive
    /// type, otherwise a binding whose value is missing.
    fn parse_untyped_member(&mut self) -> Option<Member<'a>> {
        if !self.js.at(SyntaxKind::Identifier) {
            self.js.advance();
            return None;
        }
        let start = self.js.token_pos();
        let line = self.current_line();
        let is_declaration = is_primitive_type_name(self.js.token_value())
            || self.js.look_ahead(|p| {
                p.advance();
                while p.at(SyntaxKind::DotToken) {
                    p.advance();
                    if p.at(SyntaxKind::Identifier) {
                        p.advance();
                    }
                }
                p.at(SyntaxKind::Identifier) && !p.has_preceding_line_break()
            });

        if is_declaration {
            let (kind, modifier) = self.parse_property_type(line);
            let id = self.parse_ident_on_line(line);
            return Some(Member::Property(self.finish_property_declaration(start, false, false, kind, modifier, id)));
        }

        let id = self.parse_qualified_id();
        let value = Expression::Identifier(Identifier::dummy(self.js.prev_end()));
        self.eat(SyntaxKind::SemicolonToken);
        Some(Member::Binding(self.js.alloc(PropertyBinding {
            data: self.js.finish(SyntaxKind::QmlPropertyBinding, start),
            id,
            binding: Binding::Expression(value),
            scope: scope_slot(),
        })))
    }

    fn parse_property_declaration(&mut self) -> &'a PropertyDeclaration<'a> {
        let start = self.js.token_pos();
        let is_default = self.eat(SyntaxKind::DefaultKeyword);
        let is_readonly = self.eat_contextual(ContextualKeyword::Readonly);
        self.expect_contextual(ContextualKeyword::Property);
        let line = self.js.line_of(self.js.prev_end().max(start));
        let (kind, modifier) = self.parse_property_type(line);
        let id = self.parse_ident_on_line(line);
        self.finish_property_declaration(start, is_default, is_readonly, kind, modifier, id)
    }

    fn finish_property_declaration(
        &mut self,
        start: TextPos,
        is_default: bool,
        is_readonly: bool,
        kind: PropertyType<'a>,
        modifier: Option<PropertyType<'a>>,
        id: Identifier<'a>,
    ) -> &'a PropertyDeclaration<'a> {
        let binding = if self.eat(SyntaxKind::ColonToken) {
            Some(self.parse_property_assignment())
        } else {
            None
        };
        self.eat(SyntaxKind::SemicolonToken);
        self.js.alloc(PropertyDeclaration {
            data: self.js.finish(SyntaxKind::QmlPropertyDeclaration, start),
            is_default,
            is_readonly,
            kind,
            modifier,
            id,
            binding,
            scope: scope_slot(),
        })
    }

    fn parse_property_type(&mut self, line: u32) -> (PropertyType<'a>, Option<PropertyType<'a>>) {
        let is_list = self.js.is_contextual(ContextualKeyword::List)
            && self.js.look_ahead(|p| {
                p.advance();
                p.at(SyntaxKind::LessThanToken)
            });
        if !is_list {
            return (self.parse_type_name(line), None);
        }
        let list = self.parse_ident();
        self.js.advance();
        let element = self.parse_type_name(line);
        self.eat(SyntaxKind::GreaterThanToken);
        (PropertyType::Builtin(list), Some(element))
    }

    fn parse_type_name(&mut self, line: u32) -> PropertyType<'a> {
        if !(self.js.at(SyntaxKind::Identifier) && self.on_line(line)) {
            return PropertyType::Named(self.dummy_qualified_id(self.js.prev_end()));
        }
        if is_builtin_type_name(self.js.token_value()) {
            PropertyType::Builtin(self.parse_ident())
        } else {
            PropertyType::Named(self.parse_qualified_id())
        }
    }

    fn parse_signal_definition(&mut self) -> &'a SignalDefinition<'a> {
        let start = self.js.token_pos();
        let line = self.current_line();
        self.js.advance();
        let id = self.parse_ident_on_line(line);

        let mut params = Vec::new();
        if self.js.at(SyntaxKind::OpenParenToken) && self.on_line(line) {
            self.js.advance();
            while !matches!(
                self.js.token(),
                SyntaxKind::CloseParenToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                let param_line = self.current_line();
                let kind = self.parse_type_name(param_line);
                let id = self.parse_ident();
                if kind.name() == DUMMY_IDENTIFIER && id.is_dummy() {
                    break;
                }
                let param_start = kind.range().pos;
                params.push(Parameter {
                    data: NodeData::new(SyntaxKind::QmlParameter, param_start, self.js.prev_end().max(param_start)),
                    kind,
                    id,
                });
                if !self.eat(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.eat(SyntaxKind::CloseParenToken);
        }
        self.eat(SyntaxKind::SemicolonToken);

        self.js.alloc(SignalDefinition {
            data: self.js.finish(SyntaxKind::QmlSignalDefinition, start),
            id,
            params: self.js.alloc_slice(params),
            scope: scope_slot(),
        })
    }

    /// A `function` member. Tries the JavaScript grammar first, then falls
    /// back to reading whatever header is on the `function` line.
    fn parse_function_member(&mut self) -> &'a Function<'a> {
        let start = self.js.token_pos();
        let parsed = self.js.attempt(|p| {
            p.next_token()?;
            p.parse_function(start, true)
        });
        if let Ok(function) = parsed {
            return function;
        }

        let line = self.current_line();
        self.js.advance();
        let id = self.parse_ident_on_line(line);
        let mut params = Vec::new();
        if self.js.at(SyntaxKind::OpenParenToken) && self.on_line(line) {
            self.js.advance();
            while self.js.at(SyntaxKind::Identifier) && self.on_line(line) {
                params.push(self.parse_ident());
                if !self.eat(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.eat(SyntaxKind::CloseParenToken);
        }
        let body = if self.js.at(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            let pos = self.js.prev_end();
            self.js.alloc(BlockStatement {
                data: NodeData::new(SyntaxKind::BlockStatement, pos, pos),
                body: &[],
            })
        };
        self.js.alloc(Function {
            data: self.js.finish(SyntaxKind::FunctionDeclaration, start),
            id: Some(id),
            params: self.js.alloc_slice(params),
            body,
            scope: scope_slot(),
        })
    }

    // ========================================================================
    // Script
    // ========================================================================

    /// The value after `:`: a statement block, an object literal, a list of
    /// object literals, or an expression (a dummy identifier when none parses).
    fn parse_property_assignment(&mut self) -> Binding<'a> {
        if self.js.at(SyntaxKind::OpenBraceToken) {
            return Binding::Block(self.parse_statement_block());
        }
        if self.js.at(SyntaxKind::OpenBracketToken) && self.is_array_binding() {
            return Binding::Array(self.parse_array_binding());
        }
        if self.js.at(SyntaxKind::Identifier) && self.chain_end_token() == SyntaxKind::OpenBraceToken {
            let start = self.js.token_pos();
            let id = self.parse_qualified_id();
            return Binding::Object(self.parse_object_literal_rest(start, id));
        }
        Binding::Expression(self.parse_expression())
    }

    /// `[` followed by a dotted name and `{`.
    fn is_array_binding(&mut self) -> bool {
        self.js.look_ahead(|p| {
            p.advance();
            if !p.at(SyntaxKind::Identifier) {
                return false;
            }
            p.advance();
            while p.at(SyntaxKind::DotToken) {
                p.advance();
                if p.at(SyntaxKind::Identifier) {
                    p.advance();
                }
            }
            p.at(SyntaxKind::OpenBraceToken)
        })
    }

    /// `[ A {}, B {} ]`. Elements that are not object literals end the list;
    /// a missing `]` is tolerated.
    fn parse_array_binding(&mut self) -> &'a ArrayBinding<'a> {
        let start = self.js.token_pos();
        self.js.advance();
        let mut elements = Vec::new();
        while self.js.at(SyntaxKind::Identifier) && self.chain_end_token() == SyntaxKind::OpenBraceToken {
            elements.push(self.parse_object_literal());
            if !self.eat(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.eat(SyntaxKind::CloseBracketToken);
        self.js.alloc(ArrayBinding {
            data: self.js.finish(SyntaxKind::QmlArrayBinding, start),
            elements: self.js.alloc_slice(elements),
        })
    }

    fn parse_expression(&mut self) -> Expression<'a> {
        match self.js.attempt(|p| p.parse_expression()) {
            Ok(expression) => expression,
            Err(err) => {
                trace!(pos = err.pos, message = %err.message, "replacing expression with a dummy");
                let pos = self.js.prev_end();
                let line = self.js.line_of(pos);
                while !matches!(
                    self.js.token(),
                    SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken | SyntaxKind::SemicolonToken
                ) && self.current_line() == line
                {
                    self.js.advance();
                }
                Expression::Identifier(Identifier::dummy(pos))
            }
        }
    }

    fn parse_statement_block(&mut self) -> &'a StatementBlock<'a> {
        let start = self.js.token_pos();
        let body = self.parse_braced_statements();
        self.js.alloc(StatementBlock {
            data: self.js.finish(SyntaxKind::QmlStatementBlock, start),
            body,
            scope: scope_slot(),
        })
    }

    fn parse_block(&mut self) -> &'a BlockStatement<'a> {
        let start = self.js.token_pos();
        let body = self.parse_braced_statements();
        self.js.alloc(BlockStatement {
            data: self.js.finish(SyntaxKind::BlockStatement, start),
            body,
        })
    }

    /// `{ statements }` as a function body. Statements that fail to parse are
    /// skipped up to the next `;`, line or `}`.
    fn parse_braced_statements(&mut self) -> &'a [Statement<'a>] {
        let open = self.js.token_pos();
        let indent = self.indentation_of(open);
        let line = self.js.line_of(open);
        self.eat(SyntaxKind::OpenBraceToken);

        let saved_in_function = self.js.set_in_function(true);
        let mut body = Vec::new();
        while !self.closes(SyntaxKind::CloseBraceToken, indent, line) {
            match self.js.attempt(|p| p.parse_statement()) {
                Ok(statement) => body.push(statement),
                Err(err) => {
                    trace!(pos = err.pos, message = %err.message, "skipping statement");
                    self.skip_statement();
                }
            }
        }
        self.js.set_in_function(saved_in_function);
        self.eat(SyntaxKind::CloseBraceToken);
        self.js.alloc_slice(body)
    }

    fn skip_statement(&mut self) {
        let line = self.current_line();
        self.js.advance();
        while !matches!(self.js.token(), SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken)
            && self.current_line() == line
        {
            if self.eat(SyntaxKind::SemicolonToken) {
                return;
            }
            self.js.advance();
        }
    }
}
