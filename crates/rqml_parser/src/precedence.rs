//! Operator precedence for ES5 binary operators.

use rqml_ast::syntax_kind::SyntaxKind;

/// Binary operator precedence levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    Lowest = 0,
    LogicalOr = 1,
    LogicalAnd = 2,
    BitwiseOr = 3,
    BitwiseXor = 4,
    BitwiseAnd = 5,
    Equality = 6,
    Relational = 7,
    Shift = 8,
    Additive = 9,
    Multiplicative = 10,
    Invalid = 255,
}

/// Get the binary operator precedence for a given token kind.
///
/// `in` is a relational operator except where the caller forbids it (the
/// head of a `for` statement).
pub fn get_binary_operator_precedence(kind: SyntaxKind, allow_in: bool) -> OperatorPrecedence {
    match kind {
        SyntaxKind::BarBarToken => OperatorPrecedence::LogicalOr,
        SyntaxKind::AmpersandAmpersandToken => OperatorPrecedence::LogicalAnd,
        SyntaxKind::BarToken => OperatorPrecedence::BitwiseOr,
        SyntaxKind::CaretToken => OperatorPrecedence::BitwiseXor,
        SyntaxKind::AmpersandToken => OperatorPrecedence::BitwiseAnd,
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => OperatorPrecedence::Equality,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::InstanceOfKeyword => OperatorPrecedence::Relational,
        SyntaxKind::InKeyword if allow_in => OperatorPrecedence::Relational,
        SyntaxKind::LessThanLessThanToken
        | SyntaxKind::GreaterThanGreaterThanToken
        | SyntaxKind::GreaterThanGreaterThanGreaterThanToken => OperatorPrecedence::Shift,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => OperatorPrecedence::Additive,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            OperatorPrecedence::Multiplicative
        }
        _ => OperatorPrecedence::Invalid,
    }
}

/// `&&` and `||` build logical rather than binary expressions.
pub fn is_logical_operator(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::BarBarToken | SyntaxKind::AmpersandAmpersandToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicative_binds_tighter() {
        assert!(
            get_binary_operator_precedence(SyntaxKind::AsteriskToken, true)
                > get_binary_operator_precedence(SyntaxKind::PlusToken, true)
        );
    }

    #[test]
    fn test_in_can_be_disabled() {
        assert_eq!(get_binary_operator_precedence(SyntaxKind::InKeyword, true), OperatorPrecedence::Relational);
        assert_eq!(get_binary_operator_precedence(SyntaxKind::InKeyword, false), OperatorPrecedence::Invalid);
    }
}
