//! AST node definitions for QML documents and the ES5 code embedded in them.
//!
//! Nodes reference child nodes via arena-allocated references. Every node
//! carries a [`NodeData`] with its kind and character range; a finished node's
//! range always encloses the ranges of its children.

use crate::syntax_kind::SyntaxKind;
use crate::types::{ScopeSlot, DUMMY_IDENTIFIER};
use rqml_core::text::TextRange;
use std::cell::Cell;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all AST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeData {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            range: TextRange::new(pos, end),
        }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// Create an empty scope slot.
#[inline]
pub fn scope_slot() -> ScopeSlot {
    Cell::new(None)
}

// ============================================================================
// Identifier & Literal
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    pub data: NodeData,
    pub name: &'a str,
}

impl<'a> Identifier<'a> {
    pub fn new(pos: u32, end: u32, name: &'a str) -> Self {
        Self {
            data: NodeData::new(SyntaxKind::Identifier, pos, end),
            name,
        }
    }

    /// A placeholder identifier with an empty range, produced by the loose parser.
    pub fn dummy(pos: u32) -> Self {
        Self::new(pos, pos, DUMMY_IDENTIFIER)
    }

    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.name == DUMMY_IDENTIFIER
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.data.range
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'a> {
    Null,
    Boolean(bool),
    Number(f64),
    String(&'a str),
    RegExp { pattern: &'a str, flags: &'a str },
}

#[derive(Debug, Clone, Copy)]
pub struct Literal<'a> {
    pub data: NodeData,
    pub value: LiteralValue<'a>,
    /// Exact source slice, quotes included.
    pub raw: &'a str,
}

// ============================================================================
// QML: Program & header
// ============================================================================

#[derive(Debug)]
pub struct Program<'a> {
    pub data: NodeData,
    pub header_statements: HeaderStatements<'a>,
    pub root_object: Option<&'a ObjectLiteral<'a>>,
}

#[derive(Debug)]
pub struct HeaderStatements<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, HeaderStatement<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub enum HeaderStatement<'a> {
    Import(&'a ImportStatement<'a>),
    Pragma(&'a PragmaStatement<'a>),
}

impl<'a> HeaderStatement<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            HeaderStatement::Import(n) => n.data.range,
            HeaderStatement::Pragma(n) => n.data.range,
        }
    }
}

#[derive(Debug)]
pub struct ImportStatement<'a> {
    pub data: NodeData,
    pub source: ImportSource<'a>,
    /// The `as Name` alias.
    pub qualifier: Option<Identifier<'a>>,
}

#[derive(Debug)]
pub enum ImportSource<'a> {
    Module(Module<'a>),
    /// A quoted directory or script path.
    Directory(Literal<'a>),
}

#[derive(Debug)]
pub struct Module<'a> {
    pub data: NodeData,
    pub id: QualifiedId<'a>,
    pub version: VersionLiteral<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct VersionLiteral<'a> {
    pub data: NodeData,
    pub major: u32,
    pub minor: u32,
    /// Numeric value of the literal (`2.02` -> 2.02).
    pub value: f64,
    pub raw: &'a str,
}

#[derive(Debug)]
pub struct PragmaStatement<'a> {
    pub data: NodeData,
    pub id: QualifiedId<'a>,
}

// ============================================================================
// QML: Objects & members
// ============================================================================

/// A dotted name such as `QtQuick.Controls` or `anchors.fill`.
#[derive(Debug, Clone, Copy)]
pub struct QualifiedId<'a> {
    pub data: NodeData,
    pub parts: NodeList<'a, Identifier<'a>>,
    /// `parts` joined by `.`.
    pub name: &'a str,
}

impl<'a> QualifiedId<'a> {
    /// Build from already-parsed parts. `name` is derived here and nowhere else.
    pub fn new(bump: &'a bumpalo::Bump, range: TextRange, parts: NodeList<'a, Identifier<'a>>) -> Self {
        let name: &'a str = match parts {
            [single] => single.name,
            _ => {
                let mut joined = bumpalo::collections::String::new_in(bump);
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        joined.push('.');
                    }
                    joined.push_str(part.name);
                }
                joined.into_bump_str()
            }
        };
        Self {
            data: NodeData {
                kind: SyntaxKind::QmlQualifiedId,
                range,
            },
            parts,
            name,
        }
    }

    /// Last dotted segment.
    pub fn last(&self) -> Option<&Identifier<'a>> {
        self.parts.last()
    }

    pub fn is_single(&self) -> bool {
        self.parts.len() == 1
    }
}

#[derive(Debug)]
pub struct ObjectLiteral<'a> {
    pub data: NodeData,
    /// Type name of the object.
    pub id: QualifiedId<'a>,
    pub block: MemberBlock<'a>,
    pub scope: ScopeSlot,
}

#[derive(Debug)]
pub struct MemberBlock<'a> {
    pub data: NodeData,
    pub members: NodeList<'a, Member<'a>>,
    pub scope: ScopeSlot,
}

#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Property(&'a PropertyDeclaration<'a>),
    Binding(&'a PropertyBinding<'a>),
    Signal(&'a SignalDefinition<'a>),
    Object(&'a ObjectLiteral<'a>),
    Function(&'a Function<'a>),
    Modifier(&'a PropertyModifier<'a>),
}

impl<'a> Member<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            Member::Property(n) => n.data.range,
            Member::Binding(n) => n.data.range,
            Member::Signal(n) => n.data.range,
            Member::Object(n) => n.data.range,
            Member::Function(n) => n.data.range,
            Member::Modifier(n) => n.data.range,
        }
    }
}

/// The declared type of a property or signal parameter.
#[derive(Debug, Clone, Copy)]
pub enum PropertyType<'a> {
    /// A primitive type name, `var`, or `alias`.
    Builtin(Identifier<'a>),
    /// A component type such as `Item` or `QtQuick.Item`.
    Named(QualifiedId<'a>),
}

impl<'a> PropertyType<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            PropertyType::Builtin(id) => id.data.range,
            PropertyType::Named(qid) => qid.data.range,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            PropertyType::Builtin(id) => id.name,
            PropertyType::Named(qid) => qid.name,
        }
    }
}

#[derive(Debug)]
pub struct PropertyDeclaration<'a> {
    pub data: NodeData,
    pub is_default: bool,
    pub is_readonly: bool,
    pub kind: PropertyType<'a>,
    /// Element type of `list<T>`.
    pub modifier: Option<PropertyType<'a>>,
    pub id: Identifier<'a>,
    pub binding: Option<Binding<'a>>,
    /// Script scope of an expression initializer.
    pub scope: ScopeSlot,
}

#[derive(Debug)]
pub struct PropertyBinding<'a> {
    pub data: NodeData,
    pub id: QualifiedId<'a>,
    pub binding: Binding<'a>,
    /// Script scope of an expression value, including handler bindings
    /// (`onClicked: ...`).
    pub scope: ScopeSlot,
}

/// A value source or interceptor applied to a property:
/// `NumberAnimation on x { ... }`. Only the loose grammar produces it.
#[derive(Debug)]
pub struct PropertyModifier<'a> {
    pub data: NodeData,
    /// Type of the modifier object.
    pub kind: QualifiedId<'a>,
    /// The modified property.
    pub id: QualifiedId<'a>,
    pub block: MemberBlock<'a>,
    pub scope: ScopeSlot,
}

/// The right-hand side of a property declaration or binding.
#[derive(Debug, Clone, Copy)]
pub enum Binding<'a> {
    Expression(Expression<'a>),
    Block(&'a StatementBlock<'a>),
    Object(&'a ObjectLiteral<'a>),
    Array(&'a ArrayBinding<'a>),
}

/// A list of object literals bound to a property: `states: [ State {} ]`.
#[derive(Debug)]
pub struct ArrayBinding<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, &'a ObjectLiteral<'a>>,
}

impl<'a> Binding<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            Binding::Expression(e) => e.range(),
            Binding::Block(b) => b.data.range,
            Binding::Object(o) => o.data.range,
            Binding::Array(a) => a.data.range,
        }
    }
}

#[derive(Debug)]
pub struct SignalDefinition<'a> {
    pub data: NodeData,
    pub id: Identifier<'a>,
    pub params: NodeList<'a, Parameter<'a>>,
    pub scope: ScopeSlot,
}

#[derive(Debug, Clone, Copy)]
pub struct Parameter<'a> {
    pub data: NodeData,
    pub kind: PropertyType<'a>,
    pub id: Identifier<'a>,
}

/// A `{ ... }` JavaScript statement block bound to a property.
#[derive(Debug)]
pub struct StatementBlock<'a> {
    pub data: NodeData,
    pub body: NodeList<'a, Statement<'a>>,
    pub scope: ScopeSlot,
}

// ============================================================================
// JavaScript: Expressions
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Expression<'a> {
    Identifier(Identifier<'a>),
    Literal(Literal<'a>),
    This(NodeData),
    Array(&'a ArrayExpression<'a>),
    Object(&'a ObjectExpression<'a>),
    Function(&'a Function<'a>),
    Unary(&'a UnaryExpression<'a>),
    Update(&'a UpdateExpression<'a>),
    /// Binary and logical expressions; `data.kind` tells them apart.
    Binary(&'a BinaryExpression<'a>),
    Assignment(&'a AssignmentExpression<'a>),
    Conditional(&'a ConditionalExpression<'a>),
    /// Call and `new` expressions; `data.kind` tells them apart.
    Call(&'a CallExpression<'a>),
    Member(&'a MemberExpression<'a>),
    Sequence(&'a SequenceExpression<'a>),
}

impl<'a> Expression<'a> {
    pub fn data(&self) -> NodeData {
        match self {
            Expression::Identifier(n) => n.data,
            Expression::Literal(n) => n.data,
            Expression::This(d) => *d,
            Expression::Array(n) => n.data,
            Expression::Object(n) => n.data,
            Expression::Function(n) => n.data,
            Expression::Unary(n) => n.data,
            Expression::Update(n) => n.data,
            Expression::Binary(n) => n.data,
            Expression::Assignment(n) => n.data,
            Expression::Conditional(n) => n.data,
            Expression::Call(n) => n.data,
            Expression::Member(n) => n.data,
            Expression::Sequence(n) => n.data,
        }
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.data().range
    }

    /// Whether the expression is an identifier or a chain of non-computed
    /// member accesses on one (`a`, `a.b.c`).
    pub fn is_dotted_name(&self) -> bool {
        match self {
            Expression::Identifier(_) => true,
            Expression::Member(m) => !m.computed && m.object.is_dotted_name(),
            _ => false,
        }
    }

    /// Whether the expression can appear on the left of `=`.
    pub fn is_assignment_target(&self) -> bool {
        matches!(self, Expression::Identifier(_) | Expression::Member(_))
    }
}

#[derive(Debug)]
pub struct ArrayExpression<'a> {
    pub data: NodeData,
    /// `None` entries are holes (`[a, , b]`).
    pub elements: NodeList<'a, Option<Expression<'a>>>,
}

#[derive(Debug)]
pub struct ObjectExpression<'a> {
    pub data: NodeData,
    pub properties: NodeList<'a, ObjectProperty<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

impl PropertyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKind::Init => "init",
            PropertyKind::Get => "get",
            PropertyKind::Set => "set",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PropertyKey<'a> {
    Identifier(Identifier<'a>),
    Literal(Literal<'a>),
}

impl<'a> PropertyKey<'a> {
    /// The key as a property name.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            PropertyKey::Identifier(id) => Some(id.name),
            PropertyKey::Literal(lit) => match lit.value {
                LiteralValue::String(s) => Some(s),
                _ => Some(lit.raw),
            },
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            PropertyKey::Identifier(id) => id.data.range,
            PropertyKey::Literal(lit) => lit.data.range,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ObjectProperty<'a> {
    pub data: NodeData,
    pub key: PropertyKey<'a>,
    pub value: Expression<'a>,
    pub kind: PropertyKind,
}

/// A function declaration or expression; `data.kind` tells them apart.
#[derive(Debug)]
pub struct Function<'a> {
    pub data: NodeData,
    pub id: Option<Identifier<'a>>,
    pub params: NodeList<'a, Identifier<'a>>,
    pub body: &'a BlockStatement<'a>,
    pub scope: ScopeSlot,
}

impl<'a> Function<'a> {
    pub fn is_declaration(&self) -> bool {
        self.data.kind == SyntaxKind::FunctionDeclaration
    }
}

#[derive(Debug)]
pub struct UnaryExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub argument: Expression<'a>,
}

#[derive(Debug)]
pub struct UpdateExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub prefix: bool,
    pub argument: Expression<'a>,
}

#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub left: Expression<'a>,
    pub right: Expression<'a>,
}

#[derive(Debug)]
pub struct AssignmentExpression<'a> {
    pub data: NodeData,
    pub operator: SyntaxKind,
    pub left: Expression<'a>,
    pub right: Expression<'a>,
}

#[derive(Debug)]
pub struct ConditionalExpression<'a> {
    pub data: NodeData,
    pub test: Expression<'a>,
    pub consequent: Expression<'a>,
    pub alternate: Expression<'a>,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub callee: Expression<'a>,
    pub arguments: NodeList<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct MemberExpression<'a> {
    pub data: NodeData,
    pub object: Expression<'a>,
    pub property: Expression<'a>,
    /// `a[b]` rather than `a.b`.
    pub computed: bool,
}

impl<'a> MemberExpression<'a> {
    /// Static property name of `a.b` or `a["b"]`.
    pub fn static_name(&self) -> Option<&'a str> {
        match self.property {
            Expression::Identifier(id) if !self.computed => Some(id.name),
            Expression::Literal(Literal {
                value: LiteralValue::String(s),
                ..
            }) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct SequenceExpression<'a> {
    pub data: NodeData,
    pub expressions: NodeList<'a, Expression<'a>>,
}

// ============================================================================
// JavaScript: Statements
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
    Expression(&'a ExpressionStatement<'a>),
    Block(&'a BlockStatement<'a>),
    Empty(NodeData),
    Debugger(NodeData),
    With(&'a WithStatement<'a>),
    Return(&'a ReturnStatement<'a>),
    Labeled(&'a LabeledStatement<'a>),
    Break(&'a JumpStatement<'a>),
    Continue(&'a JumpStatement<'a>),
    If(&'a IfStatement<'a>),
    Switch(&'a SwitchStatement<'a>),
    Throw(&'a ThrowStatement<'a>),
    Try(&'a TryStatement<'a>),
    While(&'a WhileStatement<'a>),
    DoWhile(&'a WhileStatement<'a>),
    For(&'a ForStatement<'a>),
    ForIn(&'a ForInStatement<'a>),
    FunctionDeclaration(&'a Function<'a>),
    VariableDeclaration(&'a VariableDeclaration<'a>),
}

impl<'a> Statement<'a> {
    pub fn data(&self) -> NodeData {
        match self {
            Statement::Expression(n) => n.data,
            Statement::Block(n) => n.data,
            Statement::Empty(d) | Statement::Debugger(d) => *d,
            Statement::With(n) => n.data,
            Statement::Return(n) => n.data,
            Statement::Labeled(n) => n.data,
            Statement::Break(n) | Statement::Continue(n) => n.data,
            Statement::If(n) => n.data,
            Statement::Switch(n) => n.data,
            Statement::Throw(n) => n.data,
            Statement::Try(n) => n.data,
            Statement::While(n) | Statement::DoWhile(n) => n.data,
            Statement::For(n) => n.data,
            Statement::ForIn(n) => n.data,
            Statement::FunctionDeclaration(n) => n.data,
            Statement::VariableDeclaration(n) => n.data,
        }
    }

    #[inline]
    pub fn range(&self) -> TextRange {
        self.data().range
    }
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: Expression<'a>,
}

#[derive(Debug)]
pub struct BlockStatement<'a> {
    pub data: NodeData,
    pub body: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct WithStatement<'a> {
    pub data: NodeData,
    pub object: Expression<'a>,
    pub body: Statement<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub argument: Option<Expression<'a>>,
}

#[derive(Debug)]
pub struct LabeledStatement<'a> {
    pub data: NodeData,
    pub label: Identifier<'a>,
    pub body: Statement<'a>,
}

/// `break` or `continue`.
#[derive(Debug)]
pub struct JumpStatement<'a> {
    pub data: NodeData,
    pub label: Option<Identifier<'a>>,
}

#[derive(Debug)]
pub struct IfStatement<'a> {
    pub data: NodeData,
    pub test: Expression<'a>,
    pub consequent: Statement<'a>,
    pub alternate: Option<Statement<'a>>,
}

#[derive(Debug)]
pub struct SwitchStatement<'a> {
    pub data: NodeData,
    pub discriminant: Expression<'a>,
    pub cases: NodeList<'a, SwitchCase<'a>>,
}

#[derive(Debug)]
pub struct SwitchCase<'a> {
    pub data: NodeData,
    /// `None` for `default:`.
    pub test: Option<Expression<'a>>,
    pub consequent: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct ThrowStatement<'a> {
    pub data: NodeData,
    pub argument: Expression<'a>,
}

#[derive(Debug)]
pub struct TryStatement<'a> {
    pub data: NodeData,
    pub block: &'a BlockStatement<'a>,
    pub handler: Option<&'a CatchClause<'a>>,
    pub finalizer: Option<&'a BlockStatement<'a>>,
}

#[derive(Debug)]
pub struct CatchClause<'a> {
    pub data: NodeData,
    pub param: Identifier<'a>,
    pub body: &'a BlockStatement<'a>,
}

/// `while` or `do ... while`.
#[derive(Debug)]
pub struct WhileStatement<'a> {
    pub data: NodeData,
    pub test: Expression<'a>,
    pub body: Statement<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum ForInit<'a> {
    Declaration(&'a VariableDeclaration<'a>),
    Expression(Expression<'a>),
}

impl<'a> ForInit<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            ForInit::Declaration(d) => d.data.range,
            ForInit::Expression(e) => e.range(),
        }
    }
}

#[derive(Debug)]
pub struct ForStatement<'a> {
    pub data: NodeData,
    pub init: Option<ForInit<'a>>,
    pub test: Option<Expression<'a>>,
    pub update: Option<Expression<'a>>,
    pub body: Statement<'a>,
}

#[derive(Debug)]
pub struct ForInStatement<'a> {
    pub data: NodeData,
    pub left: ForInit<'a>,
    pub right: Expression<'a>,
    pub body: Statement<'a>,
}

#[derive(Debug)]
pub struct VariableDeclaration<'a> {
    pub data: NodeData,
    pub declarations: NodeList<'a, VariableDeclarator<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct VariableDeclarator<'a> {
    pub data: NodeData,
    pub id: Identifier<'a>,
    pub init: Option<Expression<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn test_qualified_id_name_is_dot_join() {
        let bump = Bump::new();
        let parts = bump.alloc_slice_copy(&[
            Identifier::new(0, 7, "anchors"),
            Identifier::new(8, 12, "fill"),
        ]);
        let qid = QualifiedId::new(&bump, TextRange::new(0, 12), parts);
        assert_eq!(qid.name, "anchors.fill");
        assert_eq!(qid.last().map(|p| p.name), Some("fill"));
        assert!(!qid.is_single());
    }

    #[test]
    fn test_dummy_identifier() {
        let id = Identifier::dummy(5);
        assert!(id.is_dummy());
        assert!(id.range().is_empty());
        assert_eq!(id.range().pos, 5);
    }
}
