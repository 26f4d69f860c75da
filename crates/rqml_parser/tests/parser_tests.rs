//! Strict grammar integration tests.
//!
//! Verifies the shape of parsed QML documents through their JSON form and the
//! exact messages and positions of syntax errors.

use bumpalo::Bump;
use rqml_ast::serialize::AstSerializer;
use rqml_options::ParseOptions;
use rqml_parser::parse;
use serde_json::Value;

/// Helper: parse with the strict grammar and return the JSON tree.
fn parse_json(source: &str) -> Value {
    let arena = Bump::new();
    match parse(source, &ParseOptions::default(), &arena) {
        Ok(program) => AstSerializer::new().program(program),
        Err(err) => panic!("unexpected error for {:?}: {}", source, err),
    }
}

/// Helper: parse with the strict grammar and return the rendered error.
fn parse_error(source: &str) -> String {
    let arena = Bump::new();
    match parse(source, &ParseOptions::default(), &arena) {
        Ok(_) => panic!("expected an error for {:?}", source),
        Err(err) => err.to_string(),
    }
}

/// Helper: the members of the root object.
fn root_members(source: &str) -> Vec<Value> {
    let program = parse_json(source);
    program["rootObject"]["block"]["members"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

fn assert_parses(source: &str) {
    let _ = parse_json(source);
}

// ============================================================================
// Header statements
// ============================================================================

#[test]
fn test_import_module_with_version() {
    let program = parse_json("import QtQuick 2.2");
    let statements = program["headerStatements"]["statements"].as_array().unwrap();
    assert_eq!(statements.len(), 1);
    let import = &statements[0];
    assert_eq!(import["type"], "QMLImportStatement");
    assert_eq!(import["module"]["id"]["name"], "QtQuick");
    assert_eq!(import["module"]["version"]["major"], 2);
    assert_eq!(import["module"]["version"]["minor"], 2);
    assert_eq!(import["module"]["version"]["raw"], "2.2");
    assert_eq!(import["qualifier"], Value::Null);
    assert!(program["rootObject"].is_null());
}

#[test]
fn test_import_ranges() {
    let program = parse_json("import QtQuick 2.2");
    let import = &program["headerStatements"]["statements"][0];
    assert_eq!(import["range"], serde_json::json!([0, 18]));
    assert_eq!(import["module"]["range"], serde_json::json!([7, 18]));
    assert_eq!(import["module"]["id"]["range"], serde_json::json!([7, 14]));
    assert_eq!(import["module"]["version"]["range"], serde_json::json!([15, 18]));
    assert_eq!(program["range"], serde_json::json!([0, 18]));
}

#[test]
fn test_import_dotted_module() {
    let program = parse_json("import QtQuick.Controls.Styles 1.02");
    let module = &program["headerStatements"]["statements"][0]["module"];
    assert_eq!(module["id"]["name"], "QtQuick.Controls.Styles");
    assert_eq!(module["id"]["parts"].as_array().unwrap().len(), 3);
    assert_eq!(module["version"]["major"], 1);
    assert_eq!(module["version"]["minor"], 2);
    assert_eq!(module["version"]["raw"], "1.02");
}

#[test]
fn test_import_qualifier_and_directory() {
    let program = parse_json("import QtQuick 2.0 as Q\nimport \"./components\"\nimport \"script.js\" as Script;");
    let statements = program["headerStatements"]["statements"].as_array().unwrap();
    assert_eq!(statements.len(), 3);
    assert_eq!(statements[0]["qualifier"]["name"], "Q");
    assert_eq!(statements[1]["directory"]["value"], "./components");
    assert_eq!(statements[1]["directory"]["raw"], "\"./components\"");
    assert_eq!(statements[2]["qualifier"]["name"], "Script");
}

#[test]
fn test_pragma() {
    let program = parse_json("pragma Singleton\nimport QtQuick 2.0\nItem {}");
    let statements = program["headerStatements"]["statements"].as_array().unwrap();
    assert_eq!(statements[0]["type"], "QMLPragmaStatement");
    assert_eq!(statements[0]["id"]["name"], "Singleton");
    assert_eq!(statements[1]["type"], "QMLImportStatement");
    assert_eq!(program["rootObject"]["id"]["name"], "Item");
}

#[test]
fn test_pragma_as_object_name() {
    let program = parse_json("pragma {}");
    assert!(program["headerStatements"]["statements"].as_array().unwrap().is_empty());
    assert_eq!(program["rootObject"]["id"]["name"], "pragma");
}

#[test]
fn test_import_missing_version() {
    assert_eq!(parse_error("import QtQuick ver"), "Unexpected token (1:15)");
    assert_eq!(parse_error("import QtQuick"), "Unexpected token (1:14)");
}

#[test]
fn test_import_version_must_have_minor() {
    let expected = "QML module must specify major and minor version (1:15)";
    assert_eq!(parse_error("import QtQuick 2"), expected);
    assert_eq!(parse_error("import QtQuick 0x01"), expected);
    assert_eq!(parse_error("import QtQuick 1e2"), expected);
}

#[test]
fn test_import_qualifier_must_be_plain_name() {
    assert_eq!(parse_error("import QtQuick 2.0 as as"), "Unexpected token (1:22)");
    assert_eq!(parse_error("import QtQuick 2.0 as public"), "The keyword 'public' is reserved (1:22)");
}

#[test]
fn test_import_needs_separator() {
    assert_eq!(parse_error("import QtQuick 2.0 import QtQml 2.0"), "Unexpected token (1:19)");
    assert_parses("import QtQuick 2.0; import QtQml 2.0");
}

#[test]
fn test_ecma_version_too_new() {
    let arena = Bump::new();
    let options = ParseOptions::default().with_ecma_version(6);
    let err = parse("Item {}", &options, &arena).unwrap_err();
    assert_eq!(
        err.to_string(),
        "QML only supports ECMA Script Language Specification 5 or older (1:0)"
    );
    assert_eq!(err.pos, 0);
}

// ============================================================================
// Objects & members
// ============================================================================

#[test]
fn test_property_declaration() {
    let members = root_members("Window { property int w: 3 }");
    assert_eq!(members.len(), 1);
    let prop = &members[0];
    assert_eq!(prop["type"], "QMLPropertyDeclaration");
    assert_eq!(prop["kind"], "int");
    assert_eq!(prop["id"]["name"], "w");
    assert_eq!(prop["init"]["value"], 3);
    assert_eq!(prop["default"], false);
    assert_eq!(prop["readonly"], false);
}

#[test]
fn test_property_modifiers() {
    let members = root_members("a {\n default property Item content\n readonly property string s: \"x\"\n}");
    assert_eq!(members[0]["default"], true);
    assert_eq!(members[0]["kind"]["type"], "QMLQualifiedID");
    assert_eq!(members[0]["kind"]["name"], "Item");
    assert_eq!(members[0]["init"], Value::Null);
    assert_eq!(members[1]["readonly"], true);
    assert_eq!(members[1]["kind"], "string");
}

#[test]
fn test_list_property() {
    let members = root_members("a { property list<Item> items }");
    assert_eq!(members[0]["kind"], "list");
    assert_eq!(members[0]["modifier"]["name"], "Item");
    assert_eq!(members[0]["id"]["name"], "items");
}

#[test]
fn test_alias_property() {
    let members = root_members("a { property alias text: label.text }");
    assert_eq!(members[0]["kind"], "alias");
    assert_eq!(members[0]["init"]["type"], "MemberExpression");
}

#[test]
fn test_property_name_rejects_header_words() {
    assert_eq!(parse_error("a{ readonly property var as: 3 }"), "Unexpected token (1:25)");
    assert_eq!(parse_error("a{ property var public }"), "The keyword 'public' is reserved (1:16)");
}

#[test]
fn test_contextual_keywords_as_binding_names() {
    let words = [
        "property", "readonly", "signal", "alias", "list", "color", "real", "string", "url", "as", "pragma",
    ];
    for word in words {
        let source = format!("a{{ {}: 1 }}", word);
        let members = root_members(&source);
        assert_eq!(members.len(), 1, "source: {}", source);
        assert_eq!(members[0]["type"], "QMLPropertyBinding", "source: {}", source);
        assert_eq!(members[0]["id"]["name"], word, "source: {}", source);
    }
}

#[test]
fn test_contextual_keyword_as_object_and_dotted_name() {
    let members = root_members("a {\n property {}\n signal.x: 2\n}");
    assert_eq!(members[0]["type"], "QMLObjectLiteral");
    assert_eq!(members[0]["id"]["name"], "property");
    assert_eq!(members[1]["type"], "QMLPropertyBinding");
    assert_eq!(members[1]["id"]["name"], "signal.x");
}

#[test]
fn test_dotted_binding() {
    let members = root_members("Item { anchors.fill: parent }");
    let binding = &members[0];
    assert_eq!(binding["id"]["name"], "anchors.fill");
    assert_eq!(binding["id"]["parts"][1]["name"], "fill");
    assert_eq!(binding["expr"]["type"], "Identifier");
    assert_eq!(binding["expr"]["name"], "parent");
}

#[test]
fn test_statement_block_binding() {
    let members = root_members("Button { onClicked: { var x = 1; return x } }");
    let block = &members[0]["expr"];
    assert_eq!(block["type"], "QMLStatementBlock");
    assert_eq!(block["body"].as_array().unwrap().len(), 2);
    assert_eq!(block["body"][0]["type"], "VariableDeclaration");
    assert_eq!(block["body"][1]["type"], "ReturnStatement");
}

#[test]
fn test_object_literal_not_allowed_as_value() {
    assert_eq!(parse_error("a{ property var b: Window {} }"), "Unexpected token (1:19)");
    assert_eq!(parse_error("a{ b: Qt.Window {} }"), "Unexpected token (1:6)");
}

#[test]
fn test_nested_objects_keep_source_order() {
    let members = root_members("Column {\n Text {}\n Rectangle { Text {} }\n Image {};\n}");
    let names: Vec<&str> = members.iter().map(|m| m["id"]["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Text", "Rectangle", "Image"]);
    assert_eq!(members[1]["block"]["members"][0]["id"]["name"], "Text");
}

#[test]
fn test_signal_definitions() {
    let members = root_members("Window {\n signal clicked(int mouseX, int mouseY)\n signal closed\n signal moved()\n}");
    assert_eq!(members[0]["type"], "QMLSignalDefinition");
    assert_eq!(members[0]["id"]["name"], "clicked");
    let params = members[0]["params"].as_array().unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0]["type"], "QMLParameter");
    assert_eq!(params[0]["kind"], "int");
    assert_eq!(params[1]["id"]["name"], "mouseY");
    assert!(members[1]["params"].as_array().unwrap().is_empty());
    assert!(members[2]["params"].as_array().unwrap().is_empty());
}

#[test]
fn test_signal_parameter_with_component_type() {
    let members = root_members("a { signal picked(Item item) }");
    assert_eq!(members[0]["params"][0]["kind"]["name"], "Item");
}

#[test]
fn test_function_member() {
    let members = root_members("a {\n function area(w, h) { return w * h }\n width: 1\n}");
    assert_eq!(members[0]["type"], "FunctionDeclaration");
    assert_eq!(members[0]["id"]["name"], "area");
    assert_eq!(members[0]["params"].as_array().unwrap().len(), 2);
    assert_eq!(members[1]["id"]["name"], "width");
}

#[test]
fn test_anonymous_function_member() {
    assert_eq!(parse_error("a{ function () {} }"), "Unexpected token (1:12)");
}

#[test]
fn test_members_need_separators() {
    assert_eq!(parse_error("a{ b: 1 c: 2 }"), "Unexpected token (1:8)");
    assert_parses("a{ b: 1; c: 2 }");
    assert_parses("a{ b: 1\n c: 2 }");
    assert_parses("a{ B {} C {} }");
}

#[test]
fn test_missing_close_brace() {
    assert_eq!(parse_error("a {"), "Unexpected token (1:3)");
    assert_eq!(parse_error("a {} b {}"), "Unexpected token (1:5)");
}

#[test]
fn test_header_ranges_when_empty() {
    let program = parse_json("  Item {}");
    assert_eq!(program["headerStatements"]["range"], serde_json::json!([2, 2]));
    assert_eq!(program["rootObject"]["range"], serde_json::json!([2, 9]));
    assert_eq!(program["range"], serde_json::json!([0, 9]));
}

#[test]
fn test_member_ranges() {
    let members = root_members("a{ b: 1; c {}; property int d }");
    assert_eq!(members[0]["range"], serde_json::json!([3, 8]));
    assert_eq!(members[1]["range"], serde_json::json!([9, 13]));
    assert_eq!(members[2]["range"], serde_json::json!([15, 29]));
}

// ============================================================================
// Locations
// ============================================================================

#[test]
fn test_locations_are_line_and_column() {
    let source = "import QtQuick 2.0\nItem {\n  width: 3\n}";
    let arena = Bump::new();
    let options = ParseOptions::default().with_locations(true);
    let program = parse(source, &options, &arena).unwrap();
    let line_map = rqml_core::text::LineMap::new(source);
    let json = AstSerializer::with_locations(&line_map).program(program);
    let binding = &json["rootObject"]["block"]["members"][0];
    assert_eq!(binding["loc"]["start"]["line"], 3);
    assert_eq!(binding["loc"]["start"]["column"], 2);
    assert_eq!(json["rootObject"]["loc"]["start"]["line"], 2);
    assert_eq!(json["rootObject"]["loc"]["start"]["column"], 0);
}

#[test]
fn test_error_location_on_later_line() {
    assert_eq!(parse_error("Item {\n  width: 3 4\n}"), "Unexpected token (2:11)");
}
