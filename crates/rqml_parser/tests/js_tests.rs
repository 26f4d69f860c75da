//! Embedded JavaScript tests.
//!
//! Script appears in QML as binding values, statement blocks and function
//! members; every case here goes through one of those positions.

use bumpalo::Bump;
use rqml_ast::serialize::AstSerializer;
use rqml_ast::syntax_kind::SyntaxKind;
use rqml_options::ParseOptions;
use rqml_parser::{parse, tokenize};
use serde_json::Value;

/// Helper: parse `a { b: <expr> }` and return the bound expression.
fn expr(source: &str) -> Value {
    let text = format!("a {{ b: {} }}", source);
    let arena = Bump::new();
    match parse(&text, &ParseOptions::default(), &arena) {
        Ok(program) => AstSerializer::new().program(program)["rootObject"]["block"]["members"][0]["expr"].clone(),
        Err(err) => panic!("unexpected error for {:?}: {}", text, err),
    }
}

/// Helper: parse the statements of a handler block.
fn block(body: &str) -> Vec<Value> {
    let text = format!("a {{ onB: {{ {} }} }}", body);
    let arena = Bump::new();
    match parse(&text, &ParseOptions::default(), &arena) {
        Ok(program) => AstSerializer::new().program(program)["rootObject"]["block"]["members"][0]["expr"]["body"]
            .as_array()
            .cloned()
            .unwrap_or_default(),
        Err(err) => panic!("unexpected error for {:?}: {}", text, err),
    }
}

/// Helper: the error for a handler block, rendered with its location.
fn block_error(body: &str) -> String {
    let text = format!("a{{ b: {{ {} }} }}", body);
    let arena = Bump::new();
    match parse(&text, &ParseOptions::default(), &arena) {
        Ok(_) => panic!("expected an error for {:?}", text),
        Err(err) => err.to_string(),
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_precedence() {
    let e = expr("1 + 2 * 3");
    assert_eq!(e["type"], "BinaryExpression");
    assert_eq!(e["operator"], "+");
    assert_eq!(e["right"]["operator"], "*");
}

#[test]
fn test_logical_and_conditional() {
    let e = expr("a && b || c ? 1 : 2");
    assert_eq!(e["type"], "ConditionalExpression");
    assert_eq!(e["test"]["type"], "LogicalExpression");
    assert_eq!(e["test"]["operator"], "||");
    assert_eq!(e["test"]["left"]["operator"], "&&");
}

#[test]
fn test_member_and_call_chain() {
    let e = expr("parent.items[0].width(1, 2)");
    assert_eq!(e["type"], "CallExpression");
    assert_eq!(e["arguments"].as_array().unwrap().len(), 2);
    assert_eq!(e["callee"]["type"], "MemberExpression");
    assert_eq!(e["callee"]["object"]["computed"], true);
}

#[test]
fn test_new_expression() {
    let e = expr("new Date(2020)");
    assert_eq!(e["type"], "NewExpression");
    assert_eq!(e["callee"]["name"], "Date");
}

#[test]
fn test_object_and_array_literals() {
    let e = expr("[1, , { x: 2, 'y': 3, get z() { return 4 } }]");
    assert_eq!(e["type"], "ArrayExpression");
    let elements = e["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 3);
    assert!(elements[1].is_null());
    let props = elements[2]["properties"].as_array().unwrap();
    assert_eq!(props.len(), 3);
    assert_eq!(props[1]["key"]["value"], "y");
    assert_eq!(props[2]["kind"], "get");
}

#[test]
fn test_function_expression() {
    let e = expr("function (x) { return x * 2 }");
    assert_eq!(e["type"], "FunctionExpression");
    assert!(e["id"].is_null());
    assert_eq!(e["body"]["body"][0]["type"], "ReturnStatement");
}

#[test]
fn test_unary_update_and_assignment() {
    let e = expr("x = y += -z++");
    assert_eq!(e["type"], "AssignmentExpression");
    assert_eq!(e["right"]["operator"], "+=");
    assert_eq!(e["right"]["right"]["operator"], "-");
    assert_eq!(e["right"]["right"]["argument"]["prefix"], false);
}

#[test]
fn test_regex_literal() {
    let e = expr("/ab+c/gi.test(s)");
    let regex = &e["callee"]["object"];
    assert_eq!(regex["regex"]["pattern"], "ab+c");
    assert_eq!(regex["regex"]["flags"], "gi");
}

#[test]
fn test_string_escapes() {
    let e = expr(r#""a\tb""#);
    assert_eq!(e["value"], "a\tb");
    assert_eq!(e["raw"], r#""a\tb""#);
}

#[test]
fn test_assign_to_rvalue() {
    let arena = Bump::new();
    let err = parse("a { b: 1 = 2 }", &ParseOptions::default(), &arena).unwrap_err();
    assert_eq!(err.to_string(), "Assigning to rvalue (1:7)");
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_var_and_loops() {
    let body = block("var i, n = 3; for (i = 0; i < n; i++) { if (i) continue; } for (var k in o) break; while (n--) {}");
    let kinds: Vec<&str> = body.iter().map(|s| s["type"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        ["VariableDeclaration", "ForStatement", "ForInStatement", "WhileStatement"]
    );
    assert_eq!(body[0]["declarations"].as_array().unwrap().len(), 2);
    assert_eq!(body[2]["left"]["type"], "VariableDeclaration");
}

#[test]
fn test_switch_try_and_labels() {
    let body = block(
        "switch (x) { case 1: y(); break; default: z() } \
         try { f() } catch (e) { g(e) } finally { h() } \
         outer: do { break outer } while (true)",
    );
    assert_eq!(body[0]["type"], "SwitchStatement");
    assert_eq!(body[0]["cases"].as_array().unwrap().len(), 2);
    assert!(body[0]["cases"][1]["test"].is_null());
    assert_eq!(body[1]["handler"]["param"]["name"], "e");
    assert_eq!(body[2]["type"], "LabeledStatement");
    assert_eq!(body[2]["body"]["type"], "DoWhileStatement");
}

#[test]
fn test_asi_on_line_breaks() {
    let body = block("var a = 1\nvar b = a\nreturn\nb");
    assert_eq!(body.len(), 4);
    assert!(body[2]["argument"].is_null());
}

#[test]
fn test_statement_errors() {
    assert_eq!(block_error("break;"), "Unsyntactic break (1:8)");
    assert_eq!(block_error("x: x: 1"), "Label 'x' is already declared (1:11)");
    assert_eq!(block_error("try {}"), "Missing catch or finally clause (1:8)");
    assert_eq!(
        block_error("switch (a) { default: 1; default: 2 }"),
        "Multiple default clauses (1:33)"
    );
}

#[test]
fn test_return_inside_statement_block() {
    let body = block("if (x) { return } return 1");
    assert_eq!(body[0]["consequent"]["body"][0]["type"], "ReturnStatement");
    assert_eq!(body[1]["argument"]["value"], 1);
}

// ============================================================================
// Reserved words
// ============================================================================

#[test]
fn test_reserved_words_depend_on_version() {
    let arena = Bump::new();
    let es5 = parse("a { b: { var public = 1 } }", &ParseOptions::default(), &arena);
    assert_eq!(es5.unwrap_err().message, "The keyword 'public' is reserved");
    let es3 = parse("a { b: { var public = 1 } }", &ParseOptions::default().with_ecma_version(3), &arena);
    assert!(es3.is_ok());
}

#[test]
fn test_allow_reserved() {
    let arena = Bump::new();
    let options = ParseOptions {
        allow_reserved: true,
        ..ParseOptions::default()
    };
    assert!(parse("a { b: { var enum = 1 } }", &options, &arena).is_ok());
    assert!(parse("a { b: { var enum = 1 } }", &ParseOptions::default(), &arena).is_err());
}

// ============================================================================
// Tokenize
// ============================================================================

#[test]
fn test_tokenize_header() {
    let tokens = tokenize("import QtQuick 2.0\nItem {}", &ParseOptions::default()).unwrap();
    let kinds: Vec<SyntaxKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [
            SyntaxKind::ImportKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::NumericLiteral,
            SyntaxKind::Identifier,
            SyntaxKind::OpenBraceToken,
            SyntaxKind::CloseBraceToken,
        ]
    );
    assert_eq!(tokens[2].value, "2.0");
    assert_eq!((tokens[3].pos, tokens[3].end), (19, 23));
    assert!(tokens[3].has_preceding_line_break());
}

#[test]
fn test_tokenize_contextual_keywords_are_identifiers() {
    let tokens = tokenize("property readonly signal alias as pragma var", &ParseOptions::default()).unwrap();
    assert!(tokens.iter().all(|t| t.kind == SyntaxKind::Identifier));
}

#[test]
fn test_tokenize_errors() {
    let err = tokenize("a: 'open", &ParseOptions::default()).unwrap_err();
    assert_eq!(err.message, "Unterminated string constant");
    assert!(tokenize("a: 'open", &ParseOptions::loose()).is_ok());
    assert!(tokenize("a", &ParseOptions::default().with_ecma_version(6)).is_err());
}
