//! SyntaxKind - every token and node kind in a QML document.
//!
//! Token kinds cover ES5 plus the one fixed QML keyword, `import`. Every other
//! QML keyword is contextual and scans as [`SyntaxKind::Identifier`]; see
//! [`ContextualKeyword`].

/// The kind of a token or AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    Unknown,
    EndOfFileToken,

    // Literals
    NumericLiteral,
    StringLiteral,
    RegularExpressionLiteral,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    SemicolonToken,
    CommaToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    GreaterThanGreaterThanGreaterThanToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    ExclamationToken,
    TildeToken,
    AmpersandAmpersandToken,
    BarBarToken,
    QuestionToken,
    ColonToken,

    // Assignment operators
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    GreaterThanGreaterThanGreaterThanEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,

    // Identifiers
    Identifier,

    // Fixed keywords
    BreakKeyword,
    CaseKeyword,
    CatchKeyword,
    ContinueKeyword,
    DebuggerKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    FalseKeyword,
    FinallyKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    ImportKeyword,
    InKeyword,
    InstanceOfKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SwitchKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypeOfKeyword,
    VoidKeyword,
    WhileKeyword,
    WithKeyword,

    // ========================================================================
    // QML nodes
    // ========================================================================
    QmlProgram,
    QmlHeaderStatements,
    QmlImportStatement,
    QmlPragmaStatement,
    QmlModule,
    QmlVersionLiteral,
    QmlObjectLiteral,
    QmlMemberBlock,
    QmlPropertyDeclaration,
    QmlPropertyBinding,
    QmlPropertyModifier,
    QmlArrayBinding,
    QmlSignalDefinition,
    QmlParameter,
    QmlQualifiedId,
    QmlStatementBlock,

    // ========================================================================
    // JavaScript nodes
    // ========================================================================
    Literal,
    ThisExpression,
    ArrayExpression,
    ObjectExpression,
    Property,
    FunctionExpression,
    UnaryExpression,
    UpdateExpression,
    BinaryExpression,
    LogicalExpression,
    AssignmentExpression,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    SequenceExpression,

    ExpressionStatement,
    BlockStatement,
    EmptyStatement,
    DebuggerStatement,
    WithStatement,
    ReturnStatement,
    LabeledStatement,
    BreakStatement,
    ContinueStatement,
    IfStatement,
    SwitchStatement,
    SwitchCase,
    ThrowStatement,
    TryStatement,
    CatchClause,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForInStatement,
    FunctionDeclaration,
    VariableDeclaration,
    VariableDeclarator,
}

impl SyntaxKind {
    /// Look up a fixed keyword from its text.
    ///
    /// `var` is deliberately absent: it doubles as a QML property type and the
    /// statement parser recognises it contextually.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        match text {
            "break" => Some(SyntaxKind::BreakKeyword),
            "case" => Some(SyntaxKind::CaseKeyword),
            "catch" => Some(SyntaxKind::CatchKeyword),
            "continue" => Some(SyntaxKind::ContinueKeyword),
            "debugger" => Some(SyntaxKind::DebuggerKeyword),
            "default" => Some(SyntaxKind::DefaultKeyword),
            "delete" => Some(SyntaxKind::DeleteKeyword),
            "do" => Some(SyntaxKind::DoKeyword),
            "else" => Some(SyntaxKind::ElseKeyword),
            "false" => Some(SyntaxKind::FalseKeyword),
            "finally" => Some(SyntaxKind::FinallyKeyword),
            "for" => Some(SyntaxKind::ForKeyword),
            "function" => Some(SyntaxKind::FunctionKeyword),
            "if" => Some(SyntaxKind::IfKeyword),
            "import" => Some(SyntaxKind::ImportKeyword),
            "in" => Some(SyntaxKind::InKeyword),
            "instanceof" => Some(SyntaxKind::InstanceOfKeyword),
            "new" => Some(SyntaxKind::NewKeyword),
            "null" => Some(SyntaxKind::NullKeyword),
            "return" => Some(SyntaxKind::ReturnKeyword),
            "switch" => Some(SyntaxKind::SwitchKeyword),
            "this" => Some(SyntaxKind::ThisKeyword),
            "throw" => Some(SyntaxKind::ThrowKeyword),
            "true" => Some(SyntaxKind::TrueKeyword),
            "try" => Some(SyntaxKind::TryKeyword),
            "typeof" => Some(SyntaxKind::TypeOfKeyword),
            "void" => Some(SyntaxKind::VoidKeyword),
            "while" => Some(SyntaxKind::WhileKeyword),
            "with" => Some(SyntaxKind::WithKeyword),
            _ => None,
        }
    }

    /// Text of a fixed keyword.
    pub fn keyword_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::BreakKeyword => Some("break"),
            SyntaxKind::CaseKeyword => Some("case"),
            SyntaxKind::CatchKeyword => Some("catch"),
            SyntaxKind::ContinueKeyword => Some("continue"),
            SyntaxKind::DebuggerKeyword => Some("debugger"),
            SyntaxKind::DefaultKeyword => Some("default"),
            SyntaxKind::DeleteKeyword => Some("delete"),
            SyntaxKind::DoKeyword => Some("do"),
            SyntaxKind::ElseKeyword => Some("else"),
            SyntaxKind::FalseKeyword => Some("false"),
            SyntaxKind::FinallyKeyword => Some("finally"),
            SyntaxKind::ForKeyword => Some("for"),
            SyntaxKind::FunctionKeyword => Some("function"),
            SyntaxKind::IfKeyword => Some("if"),
            SyntaxKind::ImportKeyword => Some("import"),
            SyntaxKind::InKeyword => Some("in"),
            SyntaxKind::InstanceOfKeyword => Some("instanceof"),
            SyntaxKind::NewKeyword => Some("new"),
            SyntaxKind::NullKeyword => Some("null"),
            SyntaxKind::ReturnKeyword => Some("return"),
            SyntaxKind::SwitchKeyword => Some("switch"),
            SyntaxKind::ThisKeyword => Some("this"),
            SyntaxKind::ThrowKeyword => Some("throw"),
            SyntaxKind::TrueKeyword => Some("true"),
            SyntaxKind::TryKeyword => Some("try"),
            SyntaxKind::TypeOfKeyword => Some("typeof"),
            SyntaxKind::VoidKeyword => Some("void"),
            SyntaxKind::WhileKeyword => Some("while"),
            SyntaxKind::WithKeyword => Some("with"),
            _ => None,
        }
    }

    /// Text of a punctuation token.
    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::OpenParenToken => Some("("),
            SyntaxKind::CloseParenToken => Some(")"),
            SyntaxKind::OpenBracketToken => Some("["),
            SyntaxKind::CloseBracketToken => Some("]"),
            SyntaxKind::DotToken => Some("."),
            SyntaxKind::SemicolonToken => Some(";"),
            SyntaxKind::CommaToken => Some(","),
            SyntaxKind::LessThanToken => Some("<"),
            SyntaxKind::GreaterThanToken => Some(">"),
            SyntaxKind::LessThanEqualsToken => Some("<="),
            SyntaxKind::GreaterThanEqualsToken => Some(">="),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::ExclamationEqualsToken => Some("!="),
            SyntaxKind::EqualsEqualsEqualsToken => Some("==="),
            SyntaxKind::ExclamationEqualsEqualsToken => Some("!=="),
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::AsteriskToken => Some("*"),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::PercentToken => Some("%"),
            SyntaxKind::PlusPlusToken => Some("++"),
            SyntaxKind::MinusMinusToken => Some("--"),
            SyntaxKind::LessThanLessThanToken => Some("<<"),
            SyntaxKind::GreaterThanGreaterThanToken => Some(">>"),
            SyntaxKind::GreaterThanGreaterThanGreaterThanToken => Some(">>>"),
            SyntaxKind::AmpersandToken => Some("&"),
            SyntaxKind::BarToken => Some("|"),
            SyntaxKind::CaretToken => Some("^"),
            SyntaxKind::ExclamationToken => Some("!"),
            SyntaxKind::TildeToken => Some("~"),
            SyntaxKind::AmpersandAmpersandToken => Some("&&"),
            SyntaxKind::BarBarToken => Some("||"),
            SyntaxKind::QuestionToken => Some("?"),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::PlusEqualsToken => Some("+="),
            SyntaxKind::MinusEqualsToken => Some("-="),
            SyntaxKind::AsteriskEqualsToken => Some("*="),
            SyntaxKind::SlashEqualsToken => Some("/="),
            SyntaxKind::PercentEqualsToken => Some("%="),
            SyntaxKind::LessThanLessThanEqualsToken => Some("<<="),
            SyntaxKind::GreaterThanGreaterThanEqualsToken => Some(">>="),
            SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken => Some(">>>="),
            SyntaxKind::AmpersandEqualsToken => Some("&="),
            SyntaxKind::BarEqualsToken => Some("|="),
            SyntaxKind::CaretEqualsToken => Some("^="),
            _ => None,
        }
    }

    /// Source text of an operator token, keyword operators included.
    pub fn operator_text(self) -> &'static str {
        self.punctuation_text()
            .or_else(|| self.keyword_text())
            .unwrap_or("")
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        self >= SyntaxKind::BreakKeyword && self <= SyntaxKind::WithKeyword
    }

    #[inline]
    pub fn is_assignment_operator(self) -> bool {
        self >= SyntaxKind::EqualsToken && self <= SyntaxKind::CaretEqualsToken
    }

    /// The ESTree `type` tag of a node kind.
    pub fn node_type_name(self) -> &'static str {
        match self {
            SyntaxKind::QmlProgram => "QMLProgram",
            SyntaxKind::QmlHeaderStatements => "QMLHeaderStatements",
            SyntaxKind::QmlImportStatement => "QMLImportStatement",
            SyntaxKind::QmlPragmaStatement => "QMLPragmaStatement",
            SyntaxKind::QmlModule => "QMLModule",
            SyntaxKind::QmlVersionLiteral => "QMLVersionLiteral",
            SyntaxKind::QmlObjectLiteral => "QMLObjectLiteral",
            SyntaxKind::QmlMemberBlock => "QMLMemberBlock",
            SyntaxKind::QmlPropertyDeclaration => "QMLPropertyDeclaration",
            SyntaxKind::QmlPropertyBinding => "QMLPropertyBinding",
            SyntaxKind::QmlPropertyModifier => "QMLPropertyModifier",
            SyntaxKind::QmlArrayBinding => "QMLArrayBinding",
            SyntaxKind::QmlSignalDefinition => "QMLSignalDefinition",
            SyntaxKind::QmlParameter => "QMLParameter",
            SyntaxKind::QmlQualifiedId => "QMLQualifiedID",
            SyntaxKind::QmlStatementBlock => "QMLStatementBlock",
            SyntaxKind::Identifier => "Identifier",
            SyntaxKind::Literal => "Literal",
            SyntaxKind::ThisExpression => "ThisExpression",
            SyntaxKind::ArrayExpression => "ArrayExpression",
            SyntaxKind::ObjectExpression => "ObjectExpression",
            SyntaxKind::Property => "Property",
            SyntaxKind::FunctionExpression => "FunctionExpression",
            SyntaxKind::UnaryExpression => "UnaryExpression",
            SyntaxKind::UpdateExpression => "UpdateExpression",
            SyntaxKind::BinaryExpression => "BinaryExpression",
            SyntaxKind::LogicalExpression => "LogicalExpression",
            SyntaxKind::AssignmentExpression => "AssignmentExpression",
            SyntaxKind::ConditionalExpression => "ConditionalExpression",
            SyntaxKind::CallExpression => "CallExpression",
            SyntaxKind::NewExpression => "NewExpression",
            SyntaxKind::MemberExpression => "MemberExpression",
            SyntaxKind::SequenceExpression => "SequenceExpression",
            SyntaxKind::ExpressionStatement => "ExpressionStatement",
            SyntaxKind::BlockStatement => "BlockStatement",
            SyntaxKind::EmptyStatement => "EmptyStatement",
            SyntaxKind::DebuggerStatement => "DebuggerStatement",
            SyntaxKind::WithStatement => "WithStatement",
            SyntaxKind::ReturnStatement => "ReturnStatement",
            SyntaxKind::LabeledStatement => "LabeledStatement",
            SyntaxKind::BreakStatement => "BreakStatement",
            SyntaxKind::ContinueStatement => "ContinueStatement",
            SyntaxKind::IfStatement => "IfStatement",
            SyntaxKind::SwitchStatement => "SwitchStatement",
            SyntaxKind::SwitchCase => "SwitchCase",
            SyntaxKind::ThrowStatement => "ThrowStatement",
            SyntaxKind::TryStatement => "TryStatement",
            SyntaxKind::CatchClause => "CatchClause",
            SyntaxKind::WhileStatement => "WhileStatement",
            SyntaxKind::DoWhileStatement => "DoWhileStatement",
            SyntaxKind::ForStatement => "ForStatement",
            SyntaxKind::ForInStatement => "ForInStatement",
            SyntaxKind::FunctionDeclaration => "FunctionDeclaration",
            SyntaxKind::VariableDeclaration => "VariableDeclaration",
            SyntaxKind::VariableDeclarator => "VariableDeclarator",
            _ => "Token",
        }
    }

    /// Human-readable token label for token dumps.
    pub fn token_label(self) -> &'static str {
        match self {
            SyntaxKind::EndOfFileToken => "eof",
            SyntaxKind::NumericLiteral => "num",
            SyntaxKind::StringLiteral => "string",
            SyntaxKind::RegularExpressionLiteral => "regexp",
            SyntaxKind::Identifier => "name",
            SyntaxKind::Unknown => "unknown",
            kind => kind.punctuation_text().or_else(|| kind.keyword_text()).unwrap_or("unknown"),
        }
    }
}

// ============================================================================
// Contextual keywords
// ============================================================================

/// QML words that are keywords only where the grammar asks for them.
///
/// All of these scan as [`SyntaxKind::Identifier`]. The parser checks
/// `is_contextual(kw)` at the call sites where a keyword reading is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextualKeyword {
    Property,
    Readonly,
    Signal,
    Alias,
    As,
    Pragma,
    // Primitive property types
    Boolean,
    Double,
    Int,
    List,
    Color,
    Real,
    String,
    Url,
    Var,
}

impl ContextualKeyword {
    pub fn from_word(word: &str) -> Option<ContextualKeyword> {
        match word {
            "property" => Some(ContextualKeyword::Property),
            "readonly" => Some(ContextualKeyword::Readonly),
            "signal" => Some(ContextualKeyword::Signal),
            "alias" => Some(ContextualKeyword::Alias),
            "as" => Some(ContextualKeyword::As),
            "pragma" => Some(ContextualKeyword::Pragma),
            "boolean" => Some(ContextualKeyword::Boolean),
            "double" => Some(ContextualKeyword::Double),
            "int" => Some(ContextualKeyword::Int),
            "list" => Some(ContextualKeyword::List),
            "color" => Some(ContextualKeyword::Color),
            "real" => Some(ContextualKeyword::Real),
            "string" => Some(ContextualKeyword::String),
            "url" => Some(ContextualKeyword::Url),
            "var" => Some(ContextualKeyword::Var),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContextualKeyword::Property => "property",
            ContextualKeyword::Readonly => "readonly",
            ContextualKeyword::Signal => "signal",
            ContextualKeyword::Alias => "alias",
            ContextualKeyword::As => "as",
            ContextualKeyword::Pragma => "pragma",
            ContextualKeyword::Boolean => "boolean",
            ContextualKeyword::Double => "double",
            ContextualKeyword::Int => "int",
            ContextualKeyword::List => "list",
            ContextualKeyword::Color => "color",
            ContextualKeyword::Real => "real",
            ContextualKeyword::String => "string",
            ContextualKeyword::Url => "url",
            ContextualKeyword::Var => "var",
        }
    }

    /// Whether the word names a built-in property type.
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            ContextualKeyword::Boolean
                | ContextualKeyword::Double
                | ContextualKeyword::Int
                | ContextualKeyword::List
                | ContextualKeyword::Color
                | ContextualKeyword::Real
                | ContextualKeyword::String
                | ContextualKeyword::Url
                | ContextualKeyword::Var
        )
    }

    /// Whether the word can stand as a property type without a qualified id.
    pub fn is_builtin_type(self) -> bool {
        self.is_primitive_type() || self == ContextualKeyword::Alias
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for word in ["import", "function", "typeof", "with", "default"] {
            let kind = SyntaxKind::from_keyword(word).unwrap();
            assert!(kind.is_keyword());
            assert_eq!(kind.keyword_text(), Some(word));
        }
    }

    #[test]
    fn test_var_is_not_a_fixed_keyword() {
        assert_eq!(SyntaxKind::from_keyword("var"), None);
        assert!(ContextualKeyword::from_word("var").unwrap().is_primitive_type());
    }

    #[test]
    fn test_assignment_operator_range() {
        assert!(SyntaxKind::EqualsToken.is_assignment_operator());
        assert!(SyntaxKind::CaretEqualsToken.is_assignment_operator());
        assert!(!SyntaxKind::EqualsEqualsToken.is_assignment_operator());
        assert!(!SyntaxKind::Identifier.is_assignment_operator());
    }

    #[test]
    fn test_contextual_keywords() {
        assert_eq!(ContextualKeyword::from_word("signal"), Some(ContextualKeyword::Signal));
        assert!(!ContextualKeyword::Signal.is_primitive_type());
        assert!(ContextualKeyword::Alias.is_builtin_type());
        assert_eq!(ContextualKeyword::from_word("component"), None);
    }
}
