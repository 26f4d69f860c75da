//! Scope gathering and type inference tests.

use bumpalo::Bump;
use rqml_infer::{analyze, summarize_component, Analysis, ComponentExport, ImportResolver, ModuleTable, NullResolver};
use rqml_options::{ParseOptions, ServiceOptions};
use rqml_parser::parse;

/// Helper: parse `source` strictly and analyze it as `main.qml`.
fn analyze_source(source: &str) -> Analysis {
    analyze_with(source, "main.qml", &NullResolver)
}

/// Helper: parse `source` with the loose grammar and analyze it as `main.qml`.
fn analyze_loose(source: &str) -> Analysis {
    let arena = Bump::new();
    match parse(source, &ParseOptions::loose(), &arena) {
        Ok(program) => analyze(program, "main.qml", &NullResolver),
        Err(err) => panic!("unexpected error for {:?}: {}", source, err),
    }
}

fn analyze_with(source: &str, file: &str, resolver: &dyn ImportResolver) -> Analysis {
    let arena = Bump::new();
    match parse(source, &ParseOptions::default(), &arena) {
        Ok(program) => analyze(program, file, resolver),
        Err(err) => panic!("unexpected error for {:?}: {}", source, err),
    }
}

/// Helper: character offset just past the first occurrence of `needle`.
fn after(source: &str, needle: &str) -> u32 {
    match source.find(needle) {
        Some(i) => (i + needle.len()) as u32,
        None => panic!("{:?} not found", needle),
    }
}

/// Helper: character offset of the first occurrence of `needle`.
fn at(source: &str, needle: &str) -> u32 {
    match source.find(needle) {
        Some(i) => i as u32,
        None => panic!("{:?} not found", needle),
    }
}

fn names(analysis: &Analysis, source: &str, offset: u32) -> Vec<String> {
    analysis.completions(source, offset).into_iter().map(|c| c.name).collect()
}

const QT_QUICK: &str = r#"{"modules": {"QtQuick": {"components": [
    {"name": "Item", "properties": [{"name": "width", "type": "real"}, {"name": "visible", "type": "bool"}]},
    {"name": "Rectangle", "base": "Item", "properties": [{"name": "color", "type": "color"}]},
    {"name": "MouseArea", "base": "Item", "signals": [{"name": "pressed", "params": [{"name": "x", "type": "int"}]}]}
]}}}"#;

// ============================================================================
// Properties and signals
// ============================================================================

#[test]
fn test_signal_defines_signal_and_handler() {
    let analysis = analyze_source("Window { signal clicked(int mouseX, int mouseY) }");
    assert_eq!(
        analysis.root_property_type("clicked").as_deref(),
        Some("fn(mouseX: ?, mouseY: ?) -> Signal")
    );
    assert_eq!(analysis.root_property_type("onClicked").as_deref(), Some("Signal Handler"));
}

#[test]
fn test_declared_kinds_seed_properties() {
    let source = "Window {\n    property int w: 3\n    property string s\n    property boolean b\n    property color c\n    property var v: \"x\"\n}";
    let analysis = analyze_source(source);
    assert_eq!(analysis.root_property_type("w").as_deref(), Some("number"));
    assert_eq!(analysis.root_property_type("s").as_deref(), Some("string"));
    assert_eq!(analysis.root_property_type("b").as_deref(), Some("bool"));
    assert_eq!(analysis.root_property_type("c").as_deref(), Some("string"));
    assert_eq!(analysis.root_property_type("v").as_deref(), Some("string"));
    assert_eq!(analysis.root_property_type("missing"), None);
}

#[test]
fn test_declared_kind_and_initializer_merge() {
    let analysis = analyze_source("Window { property int w: \"wide\" }");
    assert_eq!(analysis.root_property_type("w").as_deref(), Some("number|string"));
}

#[test]
fn test_handler_sees_signal_arguments() {
    let source = "Window {\n    onClicked: {\n        var x = mouseX\n    }\n    signal clicked(int mouseX, int mouseY)\n}";
    let analysis = analyze_source(source);
    let offset = after(source, "var x = mouseX");
    // Declared parameter types do not constrain the arguments.
    assert_eq!(analysis.type_of_name(offset, "mouseX").as_deref(), Some("?"));
    assert_eq!(analysis.type_of_name(offset, "x").as_deref(), Some("?"));
    let def = analysis.definition(after(source, "var x = mouse")).unwrap();
    assert_eq!(def.range.map(|r| r.pos), Some(at(source, "mouseX,")));
    // Outside the handler the arguments are not visible.
    assert_eq!(analysis.type_of_name(at(source, "signal"), "mouseX"), None);
}

#[test]
fn test_dotted_binding_resolves_by_full_name_only() {
    let source = "Window {\n    property var anchors: ({ fill: 1 })\n    anchors.fill: \"x\"\n}";
    let analysis = analyze_source(source);
    let offset = after(source, "anchors.fi");
    // The binding does not reach the `fill` member of `anchors`.
    assert_eq!(analysis.type_of_name(offset, "anchors.fill").as_deref(), Some("number"));
    assert_eq!(analysis.definition(at(source, "anchors.fill") + 1), None);
}

// ============================================================================
// Property modifiers and object lists
// ============================================================================

#[test]
fn test_object_list_binding_is_an_array_of_objects() {
    let source = "Item {\n    property var s: [ QtObject {}, QtObject {} ]\n}";
    let analysis = analyze_loose(source);
    assert_eq!(analysis.root_property_type("s").as_deref(), Some("[QtObject]"));
}

#[test]
fn test_object_list_members_get_object_scopes() {
    let source = "Item {\n    property int size: 2\n    states: [ State { property var t: si } ]\n}";
    let analysis = analyze_loose(source);
    assert_eq!(names(&analysis, source, after(source, "t: si")), vec!["size"]);
}

#[test]
fn test_property_modifier_target_and_members() {
    let source = "Item {\n    property int width2: 3\n    Behavior on width2 {\n        property var t: wi\n    }\n}";
    let analysis = analyze_loose(source);

    let def = analysis.definition(after(source, "on wid")).unwrap();
    assert_eq!(def.range.map(|r| r.pos), Some(at(source, "width2")));

    // The modifier is an object of its own that still sees the root's properties.
    assert_eq!(names(&analysis, source, after(source, "t: wi")), vec!["width2"]);
    assert_eq!(analysis.root_property_type("t"), None);
    assert_eq!(analysis.root_property_type("width2").as_deref(), Some("number"));
}

// ============================================================================
// Ids and scripts
// ============================================================================

#[test]
fn test_ids_are_visible_document_wide() {
    let source = "Item {\n    id: root\n    property int size: 4\n    Rectangle {\n        property var w: root.size\n    }\n}";
    let analysis = analyze_source(source);
    let offset = after(source, "root.si");
    assert_eq!(analysis.type_of_name(offset, "root.size").as_deref(), Some("number"));
    assert_eq!(analysis.type_at(offset).as_deref(), Some("number"));
    assert_eq!(analysis.type_of_name(offset, "root").as_deref(), Some("Item"));
}

#[test]
fn test_function_member_return_type() {
    let source = "Item {\n    function twice(x) { return x + x }\n    property var t: twice(2)\n}";
    let analysis = analyze_source(source);
    assert_eq!(analysis.root_property_type("t").as_deref(), Some("number"));
    assert_eq!(analysis.root_property_type("twice").as_deref(), Some("fn(x: number) -> number"));
}

#[test]
fn test_javascript_expressions() {
    let source = "Item {\n    property var a: [1, 2]\n    property var o: ({ n: 1, s: \"x\" })\n    property var m: Math.floor(2.5)\n    property var c: 1 < 2\n    property var j: \"a\" + 1\n    property var k: typeof a\n}";
    let analysis = analyze_source(source);
    assert_eq!(analysis.root_property_type("a").as_deref(), Some("[number]"));
    assert_eq!(analysis.root_property_type("o").as_deref(), Some("{n, s}"));
    assert_eq!(analysis.root_property_type("m").as_deref(), Some("number"));
    assert_eq!(analysis.root_property_type("c").as_deref(), Some("bool"));
    assert_eq!(analysis.root_property_type("j").as_deref(), Some("string"));
    assert_eq!(analysis.root_property_type("k").as_deref(), Some("string"));
}

#[test]
fn test_assignment_in_handler_flows_into_property() {
    let source = "Item {\n    property var label\n    onWidthChanged: label = \"wide\"\n}";
    let analysis = analyze_source(source);
    assert_eq!(analysis.root_property_type("label").as_deref(), Some("string"));
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn test_module_components_become_prototypes() {
    let options = ServiceOptions::from_json_str(QT_QUICK).unwrap();
    let source = "import QtQuick 2.0\nRectangle {\n    width: 10\n}";
    let analysis = analyze_with(source, "main.qml", &ModuleTable::new(&options));
    assert_eq!(analysis.root_property_type("color").as_deref(), Some("string"));
    assert_eq!(analysis.root_property_type("width").as_deref(), Some("number"));
    assert_eq!(analysis.root_property_type("visible").as_deref(), Some("bool"));
}

#[test]
fn test_module_signal_handler_arguments() {
    let options = ServiceOptions::from_json_str(QT_QUICK).unwrap();
    let source = "import QtQuick 2.0\nMouseArea {\n    onPressed: {\n        var px = x\n    }\n}";
    let analysis = analyze_with(source, "main.qml", &ModuleTable::new(&options));
    let offset = after(source, "var px = x");
    assert_eq!(analysis.type_of_name(offset, "x").as_deref(), Some("number"));
    assert_eq!(analysis.root_property_type("onPressed").as_deref(), Some("Signal Handler"));
    assert_eq!(analysis.root_property_type("pressed").as_deref(), Some("fn(x: number) -> Signal"));
}

#[test]
fn test_qualified_import() {
    let options = ServiceOptions::from_json_str(QT_QUICK).unwrap();
    let source = "import QtQuick 2.0 as Q\nQ.Rectangle {\n}";
    let analysis = analyze_with(source, "main.qml", &ModuleTable::new(&options));
    assert_eq!(analysis.root_property_type("color").as_deref(), Some("string"));
    // The base is found next to the component, under the qualifier.
    assert_eq!(analysis.root_property_type("width").as_deref(), Some("number"));
    assert_eq!(analysis.type_of_name(0, "Rectangle"), None);
}

#[test]
fn test_unresolved_import_is_not_an_error() {
    let source = "import QtQuick 2.0\nRectangle {\n    width: 10\n}";
    let analysis = analyze_source(source);
    assert_eq!(analysis.root_property_type("width"), None);
}

/// Resolves the components of a fixed set of sibling documents.
struct Siblings(Vec<ComponentExport>);

impl ImportResolver for Siblings {
    fn sibling_components(&self, importer: &str) -> Vec<ComponentExport> {
        self.0.iter().filter(|c| c.origin != importer).cloned().collect()
    }
}

fn button_export(source: &str) -> ComponentExport {
    let arena = Bump::new();
    match parse(source, &ParseOptions::default(), &arena) {
        Ok(program) => summarize_component(program, "Button", "src/Button.qml"),
        Err(err) => panic!("unexpected error: {}", err),
    }
}

#[test]
fn test_sibling_component_files() {
    let button = "Item {\n    property string text\n    signal clicked()\n    function press() {}\n}";
    let export = button_export(button);
    assert_eq!(export.base.as_deref(), Some("Item"));
    assert_eq!(export.properties.len(), 1);
    assert_eq!(export.signals.len(), 1);
    assert_eq!(export.methods.len(), 1);

    let resolver = Siblings(vec![export]);
    let source = "Button {\n    text: \"OK\"\n    onClicked: press()\n}";
    let analysis = analyze_with(source, "src/main.qml", &resolver);
    assert_eq!(analysis.root_property_type("text").as_deref(), Some("string"));
    assert_eq!(analysis.root_property_type("onClicked").as_deref(), Some("Signal Handler"));

    let def = analysis.definition(at(source, "Button") + 1).unwrap();
    assert_eq!(def.origin, "src/Button.qml");
    assert_eq!(def.range.map(|r| r.pos), Some(0));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_completions_in_scope() {
    let source = "Item {\n    property int width2: 3\n    property string label\n    Text {\n        property var t: la\n    }\n}";
    let analysis = analyze_source(source);
    let completions = analysis.completions(source, after(source, "t: la"));
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].name, "label");
    assert_eq!(completions[0].type_name, "string");
    assert_eq!(completions[0].origin.as_deref(), Some("main.qml"));
}

#[test]
fn test_completions_are_sorted_and_include_globals() {
    let source = "Item {\n    property int mb\n    property int ma\n    property var t: m\n}";
    let analysis = analyze_source(source);
    let offset = after(source, "t: m");
    assert_eq!(names(&analysis, source, offset), vec!["ma", "mb"]);

    let source = "Item {\n    property var t: Ma\n}";
    let analysis = analyze_source(source);
    let completions = analysis.completions(source, after(source, "t: Ma"));
    assert_eq!(completions[0].name, "Math");
    assert_eq!(completions[0].origin.as_deref(), Some(rqml_infer::ECMASCRIPT_ORIGIN));
}

#[test]
fn test_member_completions_after_dot() {
    let source = "Item {\n    id: root\n    property string label\n    property int lane\n    Text {\n        property var t: root.la\n    }\n}";
    let analysis = analyze_source(source);
    assert_eq!(names(&analysis, source, after(source, "root.la")), vec!["label", "lane"]);

    let source = "Item {\n    property var t: Math.fl\n}";
    let analysis = analyze_source(source);
    let completions = analysis.completions(source, after(source, "Math.fl"));
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].name, "floor");
    assert_eq!(completions[0].type_name, "fn(a: number) -> number");
}

#[test]
fn test_definition_of_property_and_id() {
    let source = "Item {\n    id: root\n    property int size: 4\n    Rectangle {\n        property var w: root.size\n    }\n}";
    let analysis = analyze_source(source);

    let def = analysis.definition(after(source, "root.si")).unwrap();
    assert_eq!(def.origin, "main.qml");
    assert_eq!(def.range.map(|r| r.pos), Some(at(source, "size")));

    let def = analysis.definition(at(source, "root.size") + 1).unwrap();
    assert_eq!(def.range.map(|r| r.pos), Some(at(source, "root")));
}

#[test]
fn test_definition_of_variable_and_builtin() {
    let source = "Item {\n    onWidthChanged: {\n        var total = 1\n        console.log(total)\n    }\n}";
    let analysis = analyze_source(source);
    let def = analysis.definition(after(source, "log(tot")).unwrap();
    assert_eq!(def.range.map(|r| r.pos), Some(at(source, "total")));

    let def = analysis.definition(at(source, "console") + 2).unwrap();
    assert_eq!(def.origin, rqml_infer::ECMASCRIPT_ORIGIN);
    assert_eq!(def.range, None);

    assert_eq!(analysis.definition(at(source, "Item")), None);
}
