//! The strict QML grammar.
//!
//! Parses a whole document and stops at the first error. Script positions
//! (binding values, statement blocks, function members) are handed to the
//! embedded [`JsParser`].

use bumpalo::Bump;
use rqml_ast::node::*;
use rqml_ast::syntax_kind::{ContextualKeyword, SyntaxKind};
use rqml_core::text::{TextPos, TextRange};
use rqml_diagnostics::messages;
use rqml_options::ParseOptions;
use rqml_scanner::numeric_value;

use crate::parser::{JsParser, ParseResult};
use crate::utilities::{is_builtin_type_name, split_version};

pub struct QmlParser<'a> {
    js: JsParser<'a>,
}

impl<'a> QmlParser<'a> {
    pub fn new(arena: &'a Bump, source: &str, options: &ParseOptions) -> Self {
        Self {
            js: JsParser::new(arena, source, options.identifier_rules()),
        }
    }

    /// Parse `HeaderStatements RootObject? EOF`.
    pub fn parse_program(mut self) -> ParseResult<&'a Program<'a>> {
        self.js.next_token()?;
        let header_statements = self.parse_header_statements()?;
        let root_object = if self.js.at(SyntaxKind::EndOfFileToken) {
            None
        } else {
            Some(self.parse_object_literal()?)
        };
        if !self.js.at(SyntaxKind::EndOfFileToken) {
            return self.js.unexpected();
        }
        Ok(self.js.alloc(Program {
            data: NodeData::new(SyntaxKind::QmlProgram, 0, self.js.source_len()),
            header_statements,
            root_object,
        }))
    }

    // ========================================================================
    // Header statements
    // ========================================================================

    fn parse_header_statements(&mut self) -> ParseResult<HeaderStatements<'a>> {
        let start = self.js.token_pos();
        let mut statements = Vec::new();
        loop {
            if self.js.at(SyntaxKind::ImportKeyword) {
                statements.push(HeaderStatement::Import(self.parse_import_statement()?));
            } else if self.is_pragma_start() {
                statements.push(HeaderStatement::Pragma(self.parse_pragma_statement()?));
            } else {
                break;
            }
        }
        let end = if statements.is_empty() { start } else { self.js.prev_end() };
        Ok(HeaderStatements {
            data: NodeData::new(SyntaxKind::QmlHeaderStatements, start, end),
            statements: self.js.alloc_slice(statements),
        })
    }

    /// `pragma` is a header keyword only when a name follows it.
    fn is_pragma_start(&mut self) -> bool {
        self.js.is_contextual(ContextualKeyword::Pragma)
            && self.js.look_ahead(|p| p.next_token().is_ok() && p.at(SyntaxKind::Identifier))
    }

    fn parse_import_statement(&mut self) -> ParseResult<&'a ImportStatement<'a>> {
        let start = self.js.token_pos();
        self.js.expect(SyntaxKind::ImportKeyword)?;
        let source = if self.js.at(SyntaxKind::StringLiteral) {
            ImportSource::Directory(self.js.parse_literal()?)
        } else {
            ImportSource::Module(self.parse_module()?)
        };
        let qualifier = if self.js.eat_contextual(ContextualKeyword::As)? {
            Some(self.parse_qml_ident(false)?)
        } else {
            None
        };
        self.js.semicolon()?;
        Ok(self.js.alloc(ImportStatement {
            data: self.js.finish(SyntaxKind::QmlImportStatement, start),
            source,
            qualifier,
        }))
    }

    fn parse_module(&mut self) -> ParseResult<Module<'a>> {
        let start = self.js.token_pos();
        let id = self.parse_qualified_id(false)?;
        let version = self.parse_version_literal()?;
        Ok(Module {
            data: self.js.finish(SyntaxKind::QmlModule, start),
            id,
            version,
        })
    }

    fn parse_version_literal(&mut self) -> ParseResult<VersionLiteral<'a>> {
        let start = self.js.token_pos();
        let end = self.js.token_end();
        if !self.js.at(SyntaxKind::NumericLiteral) {
            return self.js.unexpected();
        }
        let raw = self.js.token_value();
        let Some((major, minor)) = split_version(raw) else {
            return Err(self.js.error_at(start, &messages::QML_MODULE_VERSION_REQUIRED, &[]));
        };
        let value = numeric_value(raw).unwrap_or_default();
        let raw = self.js.alloc_str(raw);
        self.js.next_token()?;
        Ok(VersionLiteral {
            data: NodeData::new(SyntaxKind::QmlVersionLiteral, start, end),
            major,
            minor,
            value,
            raw,
        })
    }

    fn parse_pragma_statement(&mut self) -> ParseResult<&'a PragmaStatement<'a>> {
        let start = self.js.token_pos();
        self.js.expect_contextual(ContextualKeyword::Pragma)?;
        let id = self.parse_qualified_id(false)?;
        self.js.semicolon()?;
        Ok(self.js.alloc(PragmaStatement {
            data: self.js.finish(SyntaxKind::QmlPragmaStatement, start),
            id,
        }))
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    /// A QML name. Fixed keywords never qualify; without `liberal`, reserved
    /// words and the header words `as` and `pragma` are rejected as well.
    fn parse_qml_ident(&mut self, liberal: bool) -> ParseResult<Identifier<'a>> {
        if !self.js.at(SyntaxKind::Identifier) {
            return self.js.unexpected();
        }
        if liberal {
            return self.js.parse_ident(true);
        }
        if self.js.is_contextual(ContextualKeyword::As) || self.js.is_contextual(ContextualKeyword::Pragma) {
            return self.js.unexpected();
        }
        self.js.parse_ident(false)
    }

    fn parse_qualified_id(&mut self, liberal: bool) -> ParseResult<QualifiedId<'a>> {
        let start = self.js.token_pos();
        let mut parts = vec![self.parse_qml_ident(liberal)?];
        while self.js.eat(SyntaxKind::DotToken)? {
            parts.push(self.parse_qml_ident(liberal)?);
        }
        Ok(QualifiedId::new(
            self.js.arena(),
            TextRange::new(start, self.js.prev_end()),
            self.js.alloc_slice(parts),
        ))
    }

    // ========================================================================
    // Objects & members
    // ========================================================================

    fn parse_object_literal(&mut self) -> ParseResult<&'a ObjectLiteral<'a>> {
        let start = self.js.token_pos();
        let id = self.parse_qualified_id(true)?;
        self.parse_object_literal_rest(start, id)
    }

    fn parse_object_literal_rest(&mut self, start: TextPos, id: QualifiedId<'a>) -> ParseResult<&'a ObjectLiteral<'a>> {
        let block = self.parse_member_block()?;
        Ok(self.js.alloc(ObjectLiteral {
            data: self.js.finish(SyntaxKind::QmlObjectLiteral, start),
            id,
            block,
            scope: scope_slot(),
        }))
    }

    fn parse_member_block(&mut self) -> ParseResult<MemberBlock<'a>> {
        let start = self.js.token_pos();
        self.js.expect(SyntaxKind::OpenBraceToken)?;
        let mut members = Vec::new();
        while !self.js.eat(SyntaxKind::CloseBraceToken)? {
            members.push(self.parse_member()?);
        }
        Ok(MemberBlock {
            data: self.js.finish(SyntaxKind::QmlMemberBlock, start),
            members: self.js.alloc_slice(members),
            scope: scope_slot(),
        })
    }

    fn parse_member(&mut self) -> ParseResult<Member<'a>> {
        match self.js.token() {
            SyntaxKind::FunctionKeyword => {
                let start = self.js.token_pos();
                self.js.next_token()?;
                let function = self.js.parse_function(start, true)?;
                self.js.eat(SyntaxKind::SemicolonToken)?;
                Ok(Member::Function(function))
            }
            SyntaxKind::DefaultKeyword => Ok(Member::Property(self.parse_property_declaration()?)),
            SyntaxKind::Identifier
                if (self.js.is_contextual(ContextualKeyword::Property)
                    || self.js.is_contextual(ContextualKeyword::Readonly))
                    && self.is_keyword_use() =>
            {
                Ok(Member::Property(self.parse_property_declaration()?))
            }
            SyntaxKind::Identifier if self.js.is_contextual(ContextualKeyword::Signal) && self.is_keyword_use() => {
                Ok(Member::Signal(self.parse_signal_definition()?))
            }
            _ => self.parse_object_literal_or_binding(),
        }
    }

    /// A leading `property`, `readonly` or `signal` is a keyword unless it is
    /// the first part of a dotted name or directly followed by `:` or `{`.
    fn is_keyword_use(&mut self) -> bool {
        self.js.look_ahead(|p| {
            p.next_token().is_ok()
                && !matches!(
                    p.token(),
                    SyntaxKind::ColonToken | SyntaxKind::OpenBraceToken | SyntaxKind::DotToken
                )
        })
    }

    /// Separator after a member: `;`, a line break, or the end of the block.
    /// Members ending in `}` need none.
    fn end_member(&mut self) -> ParseResult<()> {
        if self.js.prev_token() == SyntaxKind::CloseBraceToken {
            self.js.eat(SyntaxKind::SemicolonToken)?;
            return Ok(());
        }
        self.js.semicolon()
    }

    fn parse_property_declaration(&mut self) -> ParseResult<&'a PropertyDeclaration<'a>> {
        let start = self.js.token_pos();
        let is_default = self.js.eat(SyntaxKind::DefaultKeyword)?;
        let is_readonly = !is_default && self.js.eat_contextual(ContextualKeyword::Readonly)?;
        self.js.expect_contextual(ContextualKeyword::Property)?;
        let (kind, modifier) = self.parse_property_type()?;
        let id = self.parse_qml_ident(false)?;
        let binding = if self.js.eat(SyntaxKind::ColonToken)? {
            Some(self.parse_property_assignment()?)
        } else {
            None
        };
        self.end_member()?;
        Ok(self.js.alloc(PropertyDeclaration {
            data: self.js.finish(SyntaxKind::QmlPropertyDeclaration, start),
            is_default,
            is_readonly,
            kind,
            modifier,
            id,
            binding,
            scope: scope_slot(),
        }))
    }

    /// A property type, with the element type when it is `list<T>`.
    fn parse_property_type(&mut self) -> ParseResult<(PropertyType<'a>, Option<PropertyType<'a>>)> {
        let is_list = self.js.is_contextual(ContextualKeyword::List)
            && self.js.look_ahead(|p| p.next_token().is_ok() && p.at(SyntaxKind::LessThanToken));
        if !is_list {
            return Ok((self.parse_type_name()?, None));
        }
        let list = self.js.parse_ident(true)?;
        self.js.expect(SyntaxKind::LessThanToken)?;
        let element = self.parse_type_name()?;
        self.js.expect(SyntaxKind::GreaterThanToken)?;
        Ok((PropertyType::Builtin(list), Some(element)))
    }

    fn parse_type_name(&mut self) -> ParseResult<PropertyType<'a>> {
        if self.js.at(SyntaxKind::Identifier) && is_builtin_type_name(self.js.token_value()) {
            return Ok(PropertyType::Builtin(self.js.parse_ident(true)?));
        }
        Ok(PropertyType::Named(self.parse_qualified_id(false)?))
    }

    fn parse_signal_definition(&mut self) -> ParseResult<&'a SignalDefinition<'a>> {
        let start = self.js.token_pos();
        self.js.expect_contextual(ContextualKeyword::Signal)?;
        let id = self.parse_qml_ident(false)?;
        let mut params = Vec::new();
        if self.js.eat(SyntaxKind::OpenParenToken)? {
            while !self.js.eat(SyntaxKind::CloseParenToken)? {
                if !params.is_empty() {
                    self.js.expect(SyntaxKind::CommaToken)?;
                }
                let param_start = self.js.token_pos();
                let kind = self.parse_type_name()?;
                let id = self.parse_qml_ident(false)?;
                params.push(Parameter {
                    data: self.js.finish(SyntaxKind::QmlParameter, param_start),
                    kind,
                    id,
                });
            }
        }
        self.end_member()?;
        Ok(self.js.alloc(SignalDefinition {
            data: self.js.finish(SyntaxKind::QmlSignalDefinition, start),
            id,
            params: self.js.alloc_slice(params),
            scope: scope_slot(),
        }))
    }

    fn parse_object_literal_or_binding(&mut self) -> ParseResult<Member<'a>> {
        let start = self.js.token_pos();
        let id = self.parse_qualified_id(true)?;
        if self.js.at(SyntaxKind::OpenBraceToken) {
            let object = self.parse_object_literal_rest(start, id)?;
            self.js.eat(SyntaxKind::SemicolonToken)?;
            return Ok(Member::Object(object));
        }
        self.js.expect(SyntaxKind::ColonToken)?;
        let binding = self.parse_property_assignment()?;
        self.end_member()?;
        Ok(Member::Binding(self.js.alloc(PropertyBinding {
            data: self.js.finish(SyntaxKind::QmlPropertyBinding, start),
            id,
            binding,
            scope: scope_slot(),
        })))
    }

    /// The value after `:`. A leading `{` is always a statement block.
    fn parse_property_assignment(&mut self) -> ParseResult<Binding<'a>> {
        if self.js.at(SyntaxKind::OpenBraceToken) {
            return Ok(Binding::Block(self.parse_statement_block()?));
        }
        let expression = self.js.parse_expression()?;
        if expression.is_dotted_name() && self.js.at(SyntaxKind::OpenBraceToken) {
            return self.js.unexpected_at(expression.range().pos);
        }
        Ok(Binding::Expression(expression))
    }

    fn parse_statement_block(&mut self) -> ParseResult<&'a StatementBlock<'a>> {
        let start = self.js.token_pos();
        self.js.expect(SyntaxKind::OpenBraceToken)?;
        let body = self.js.in_function_body(|p| {
            let mut body = Vec::new();
            while !p.eat(SyntaxKind::CloseBraceToken)? {
                body.push(p.parse_statement()?);
            }
            Ok(body)
        })?;
        Ok(self.js.alloc(StatementBlock {
            data: self.js.finish(SyntaxKind::QmlStatementBlock, start),
            body: self.js.alloc_slice(body),
            scope: scope_slot(),
        }))
    }
}
