//! Scanner integration tests.
//!
//! Verifies that the scanner tokenizes QML documents and embedded JavaScript.

use rqml_ast::syntax_kind::{ContextualKeyword, SyntaxKind};
use rqml_scanner::{classify_word, numeric_value, IdentifierRules, Scanner, WordClass};

/// Helper: scan all tokens from source and return as (kind, value) pairs.
fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        tokens.push((kind, scanner.token_value().to_string()));
    }
    tokens
}

fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    scan_all(source).into_iter().map(|(k, _)| k).collect()
}

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
    assert!(scan_all("   \n\t  // trailing").is_empty());
}

#[test]
fn test_import_header() {
    let tokens = scan_all("import QtQuick 2.0 as Q");
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::ImportKeyword, "import".to_string()),
            (SyntaxKind::Identifier, "QtQuick".to_string()),
            (SyntaxKind::NumericLiteral, "2.0".to_string()),
            (SyntaxKind::Identifier, "as".to_string()),
            (SyntaxKind::Identifier, "Q".to_string()),
        ]
    );
}

#[test]
fn test_qml_words_are_identifiers() {
    assert_eq!(
        scan_kinds("property readonly signal alias pragma var int"),
        vec![SyntaxKind::Identifier; 7]
    );
}

#[test]
fn test_object_body() {
    assert_eq!(
        scan_kinds("Window { id: w; width: 300 }"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::OpenBraceToken,
            SyntaxKind::Identifier,
            SyntaxKind::ColonToken,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
            SyntaxKind::Identifier,
            SyntaxKind::ColonToken,
            SyntaxKind::NumericLiteral,
            SyntaxKind::CloseBraceToken,
        ]
    );
}

#[test]
fn test_token_ranges_are_char_offsets() {
    let mut scanner = Scanner::new("\"é\" x");
    scanner.scan();
    assert_eq!((scanner.token_start(), scanner.token_end()), (0, 3));
    scanner.scan();
    assert_eq!((scanner.token_start(), scanner.token_end()), (4, 5));
}

#[test]
fn test_numeric_literals() {
    let tokens = scan_all("42 3.14 0xFF 017 1e-3 .5");
    let values: Vec<_> = tokens.iter().map(|(_, v)| numeric_value(v)).collect();
    assert_eq!(values, vec![Some(42.0), Some(3.14), Some(255.0), Some(15.0), Some(0.001), Some(0.5)]);
}

#[test]
fn test_identifier_after_number_is_an_error() {
    let mut scanner = Scanner::new("3in");
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert!(scanner.token_error().is_some());
}

#[test]
fn test_unicode_escape_in_identifier() {
    let mut scanner = Scanner::new("\\u0069f");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "if");
}

#[test]
fn test_unexpected_character() {
    let mut scanner = Scanner::new("#");
    assert_eq!(scanner.scan(), SyntaxKind::Unknown);
    assert_eq!(
        scanner.token_error().map(|e| e.message.clone()),
        Some("Unexpected character '#'".to_string())
    );
}

#[test]
fn test_unterminated_comment() {
    let mut scanner = Scanner::new("a /* never closed");
    scanner.scan();
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
    assert_eq!(scanner.diagnostics().len(), 1);
}

#[test]
fn test_look_ahead_restores() {
    let mut scanner = Scanner::new("a.b {");
    scanner.scan();
    let next = scanner.look_ahead(|s| {
        s.scan();
        s.scan();
        s.scan()
    });
    assert_eq!(next, SyntaxKind::OpenBraceToken);
    assert_eq!(scanner.token(), SyntaxKind::Identifier);
    assert_eq!(scanner.token_value(), "a");
}

#[test]
fn test_try_scan_keeps_success() {
    let mut scanner = Scanner::new("x : y");
    scanner.scan();
    let colon = scanner.try_scan(|s| (s.scan() == SyntaxKind::ColonToken).then_some(()));
    assert!(colon.is_some());
    assert_eq!(scanner.token(), SyntaxKind::ColonToken);

    let brace = scanner.try_scan(|s| (s.scan() == SyntaxKind::OpenBraceToken).then_some(()));
    assert!(brace.is_none());
    assert_eq!(scanner.token(), SyntaxKind::ColonToken);
}

#[test]
fn test_token_record() {
    let mut scanner = Scanner::new("  width");
    scanner.scan();
    let info = scanner.token_info();
    let record = info.to_record();
    assert_eq!(record.label, "name");
    assert_eq!(record.value, "width");
    assert_eq!(record.range, [2, 7]);
}

#[test]
fn test_classify_word() {
    assert_eq!(classify_word("import"), WordClass::Keyword(SyntaxKind::ImportKeyword));
    assert_eq!(classify_word("readonly"), WordClass::Contextual(ContextualKeyword::Readonly));
    assert_eq!(classify_word("Rectangle"), WordClass::Identifier);
}

#[test]
fn test_reserved_rules() {
    let es5 = IdentifierRules::default();
    assert!(es5.is_reserved("class"));
    assert!(es5.is_reserved("public"));
    assert!(!es5.is_reserved("Rectangle"));

    let es3 = IdentifierRules::new(3, false);
    assert!(es3.is_reserved("class"));
    assert!(!es3.is_reserved("public"));

    let lenient = IdentifierRules::new(5, true);
    assert!(!lenient.is_reserved("class"));
}
