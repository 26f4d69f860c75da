//! QML parser conformance suite.
//!
//! Runs a catalogue of documents through both grammars and checks the
//! strict error messages. Fixture documents get spot checks on the shape of
//! their serialized trees.

use rqml_options::ParseOptions;
use rqml_tests::{load_fixture, parse_json, ConformanceSuite};
use serde_json::{json, Value};

fn strict(source: &str) -> Value {
    match parse_json(source, &ParseOptions::default()) {
        Ok(value) => value,
        Err(err) => panic!("unexpected error: {}", err),
    }
}

fn loose(source: &str) -> Value {
    match parse_json(source, &ParseOptions::loose()) {
        Ok(value) => value,
        Err(err) => panic!("loose grammar failed: {}", err),
    }
}

fn at<'v>(value: &'v Value, pointer: &str) -> &'v Value {
    match value.pointer(pointer) {
        Some(found) => found,
        None => panic!("no value at {}", pointer),
    }
}

// ============================================================================
// Catalogue
// ============================================================================

#[test]
fn test_qml_conformance() {
    let mut suite = ConformanceSuite::new();

    // ========================================================================
    // Category: Header statements
    // ========================================================================
    suite.parses("module_import", "header", "import QtQuick 2.0\nItem {}");
    suite.parses("dotted_module_import", "header", "import QtQuick.Controls 1.4\nItem {}");
    suite.parses("qualified_import", "header", "import QtQuick 2.0 as Q\nQ.Item {}");
    suite.parses("directory_import", "header", "import \"components\"\nItem {}");
    suite.parses("semicolon_imports", "header", "import QtQuick 2.0; import QtQml 2.0\nItem {}");
    suite.parses("pragma", "header", "pragma Singleton\nItem {}");
    suite.parses("pragma_object_name", "header", "pragma {}");
    suite.fails("import_missing_version", "header", "import QtQuick", "Unexpected token (1:14)");
    suite.fails("import_bad_version", "header", "import QtQuick ver", "Unexpected token (1:15)");
    suite.fails(
        "import_major_only",
        "header",
        "import QtQuick 2",
        "QML module must specify major and minor version (1:15)",
    );
    suite.fails(
        "import_reserved_qualifier",
        "header",
        "import QtQuick 2.0 as public",
        "The keyword 'public' is reserved (1:22)",
    );
    suite.fails(
        "imports_on_one_line",
        "header",
        "import QtQuick 2.0 import QtQml 2.0",
        "Unexpected token (1:19)",
    );

    // ========================================================================
    // Category: Objects
    // ========================================================================
    suite.parses("empty_object", "objects", "Item {}");
    suite.parses("qualified_object", "objects", "QtQuick.Window {}");
    suite.parses("nested_objects", "objects", "Item {\n    Rectangle {\n        Text {}\n    }\n}");
    suite.parses("object_then_semicolon", "objects", "Item {\n    Text {};\n}");
    suite.fails("unclosed_object", "objects", "a {", "Unexpected token (1:3)");
    suite.fails("two_root_objects", "objects", "a {} b {}", "Unexpected token (1:5)");

    // ========================================================================
    // Category: Property declarations
    // ========================================================================
    suite.parses("typed_property", "properties", "Item {\n    property int w: 3\n}");
    suite.parses("property_without_value", "properties", "Item {\n    property string title\n}");
    suite.parses("readonly_property", "properties", "Item {\n    readonly property var r: 1\n}");
    suite.parses("default_property", "properties", "Item {\n    default property alias content: box.children\n}");
    suite.parses("component_typed_property", "properties", "Item {\n    property QtQuick.Item child\n}");
    suite.parses("list_property", "properties", "Item {\n    property list<Item> overlays\n}");
    suite.parses("property_keywords_as_names", "properties", "Item {\n    property var signal: 1\n    property var readonly\n}");
    suite.parses("property_as_binding_name", "properties", "Item {\n    property: 3\n    property.x: 4\n}");
    suite.parses("property_handler_block", "properties", "Item {\n    property var f: {\n        var x = 1\n    }\n}");
    suite.fails(
        "reserved_property_name",
        "properties",
        "a{ property var public }",
        "The keyword 'public' is reserved (1:16)",
    );
    suite.fails("as_is_not_a_property_name", "properties", "a{ readonly property var as: 3 }", "Unexpected token (1:25)");
    suite.fails("object_as_property_value", "properties", "a{ property var b: Window {} }", "Unexpected token (1:19)");

    // ========================================================================
    // Category: Bindings
    // ========================================================================
    suite.parses("literal_binding", "bindings", "Item {\n    width: 100\n}");
    suite.parses("grouped_binding", "bindings", "Item {\n    anchors.fill: parent\n}");
    suite.parses("id_binding", "bindings", "Item {\n    id: root\n}");
    suite.parses("expression_binding", "bindings", "Item {\n    width: parent.width / 2 + (visible ? 10 : 0)\n}");
    suite.parses("handler_block", "bindings", "Item {\n    onClicked: {\n        var x = 1;\n        x++\n    }\n}");
    suite.parses("semicolon_separated", "bindings", "a { b: 1; c: 2 }");
    suite.parses("keyword_binding_name", "bindings", "Item {\n    signal: 1\n}");
    suite.fails("qualified_object_binding", "bindings", "a{ b: Qt.Window {} }", "Unexpected token (1:6)");
    suite.fails("missing_separator", "bindings", "a{ b: 1 c: 2 }", "Unexpected token (1:8)");
    suite.fails("two_values", "bindings", "Item {\n  width: 3 4\n}", "Unexpected token (2:11)");

    // ========================================================================
    // Category: Signals
    // ========================================================================
    suite.parses("signal_without_params", "signals", "Item {\n    signal closed\n}");
    suite.parses("signal_empty_params", "signals", "Item {\n    signal closed()\n}");
    suite.parses("signal_with_params", "signals", "Item {\n    signal clicked(int mouseX, int mouseY)\n}");
    suite.parses("signal_component_param", "signals", "Item {\n    signal picked(QtQuick.Item item)\n}");

    // ========================================================================
    // Category: Functions
    // ========================================================================
    suite.parses("function_member", "functions", "Item {\n    function f(a, b) {\n        return a + b\n    }\n}");
    suite.parses("function_then_member", "functions", "Item {\n    function f() {}\n    width: 3\n}");
    suite.parses(
        "function_with_statements",
        "functions",
        "Item {\n    function f(list) {\n        for (var i = 0; i < list.length; i++) {\n            if (list[i]) continue;\n        }\n        return null;\n    }\n}",
    );
    suite.fails("anonymous_function_member", "functions", "a{ function () {} }", "Unexpected token (1:12)");

    suite.print_summary();
    let failures = suite.failures();
    assert!(failures.is_empty(), "{} conformance cases failed", failures.len());
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn test_counter_fixture() {
    let source = load_fixture("counter.qml");
    let program = strict(&source);

    let imports = at(&program, "/headerStatements/statements").as_array().unwrap();
    assert_eq!(imports.len(), 3);
    assert_eq!(imports[0]["module"]["id"]["name"], "QtQuick");
    assert_eq!(imports[0]["module"]["version"]["raw"], "2.5");
    assert_eq!(imports[1]["module"]["id"]["name"], "QtQuick.Controls");
    assert_eq!(imports[1]["qualifier"]["name"], "Controls");
    assert_eq!(imports[2]["directory"]["value"], "components");

    let members = at(&program, "/rootObject/block/members").as_array().unwrap();
    let types: Vec<&str> = members.iter().filter_map(|m| m["type"].as_str()).collect();
    assert_eq!(
        types,
        vec![
            "QMLPropertyBinding",
            "QMLPropertyBinding",
            "QMLPropertyBinding",
            "QMLPropertyBinding",
            "QMLPropertyDeclaration",
            "QMLPropertyDeclaration",
            "QMLPropertyDeclaration",
            "QMLPropertyDeclaration",
            "QMLPropertyDeclaration",
            "QMLSignalDefinition",
            "QMLSignalDefinition",
            "FunctionDeclaration",
            "QMLPropertyBinding",
            "QMLObjectLiteral",
        ]
    );
    assert_eq!(members[6]["readonly"], json!(true));
    assert_eq!(members[6]["kind"]["name"], "bool");
    assert_eq!(members[7]["kind"], "list");
    assert_eq!(members[7]["modifier"]["name"], "Item");
    assert_eq!(members[8]["default"], json!(true));
    assert_eq!(members[8]["kind"], "alias");
    assert_eq!(members[9]["params"][1]["kind"], "string");
    assert_eq!(members[12]["expr"]["type"], "QMLStatementBlock");

    let button = at(&program, "/rootObject/block/members/13/block/members/4");
    assert_eq!(button["id"]["name"], "Controls.Button");

    assert_eq!(loose(&source), program);
}

#[test]
fn test_pragma_fixture() {
    let source = load_fixture("pragma.qml");
    let program = strict(&source);
    assert_eq!(at(&program, "/headerStatements/statements/0/type"), "QMLPragmaStatement");
    assert_eq!(at(&program, "/headerStatements/statements/0/id/name"), "Singleton");
    assert_eq!(at(&program, "/rootObject/block/members/0/init/type"), "ObjectExpression");
    assert_eq!(at(&program, "/rootObject/block/members/1/params/1/name"), "amount");
    assert_eq!(loose(&source), program);
}

#[test]
fn test_broken_fixture() {
    let source = load_fixture("broken.qml");
    assert!(parse_json(&source, &ParseOptions::default()).is_err());

    let program = loose(&source);
    let imports = at(&program, "/headerStatements/statements").as_array().unwrap();
    assert_eq!(imports.len(), 2);
    assert_eq!(imports[0]["module"]["version"]["major"], 2);
    assert_eq!(at(&program, "/rootObject/id/name"), "Item");

    let members = at(&program, "/rootObject/block/members").as_array().unwrap();
    assert_eq!(members[0]["id"]["name"], "id");
    assert_eq!(members[1]["id"]["name"], "count");
    assert!(members.iter().any(|m| m["type"] == "QMLSignalDefinition"));
    assert!(members.iter().any(|m| m["type"] == "QMLObjectLiteral" && m["id"]["name"] == "Text"));
}
