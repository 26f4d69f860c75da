//! Language service tests: documents, parse queries, completions,
//! definitions and the JSON entry point.

use rqml_ls::{LanguageService, LineCh, Location, Request, Response, ServiceError};
use rqml_options::{ParseOptions, ServiceOptions};
use serde_json::{json, Value};

/// Helper: a service with the given documents open.
fn service_with(files: &[(&str, &str)]) -> LanguageService {
    let mut service = LanguageService::default();
    for (name, text) in files {
        service.open_document(name.to_string(), text.to_string(), 1);
    }
    service
}

/// Helper: character offset just past the first occurrence of `needle`.
fn after(source: &str, needle: &str) -> Location {
    match source.find(needle) {
        Some(i) => Location::Offset((i + needle.len()) as u32),
        None => panic!("{:?} not found", needle),
    }
}

fn completion_names(service: &LanguageService, file: &str, end: Location) -> Vec<String> {
    match service.completions(file, end) {
        Ok(completions) => completions.into_iter().map(|c| c.name).collect(),
        Err(err) => panic!("completions failed: {}", err),
    }
}

fn handle_json(service: &mut LanguageService, request: Value) -> Value {
    let response = service.handle_json(&request.to_string());
    match serde_json::from_str(&response) {
        Ok(value) => value,
        Err(err) => panic!("invalid response {:?}: {}", response, err),
    }
}

// ============================================================================
// Documents
// ============================================================================

#[test]
fn test_document_lifecycle() {
    let mut service = service_with(&[("main.qml", "Item {}")]);
    assert_eq!(service.document_text("main.qml"), Some("Item {}"));
    assert_eq!(service.document_version("main.qml"), Some(1));

    service.update_document("main.qml", "Rectangle {}".to_string(), 2);
    assert_eq!(service.document_text("main.qml"), Some("Rectangle {}"));
    assert_eq!(service.document_version("main.qml"), Some(2));

    service.update_document("other.qml", "Item {}".to_string(), 1);
    assert_eq!(service.document_text("other.qml"), None);

    service.close_document("main.qml");
    assert_eq!(service.document_text("main.qml"), None);
    assert!(matches!(
        service.parse_file("main.qml", None),
        Err(ServiceError::UnknownFile(file)) if file == "main.qml"
    ));
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_string() {
    let service = LanguageService::default();
    let ast = service.parse_string("Window { property int w: 3 }", None).unwrap();
    assert_eq!(ast["type"], "QMLProgram");
    assert_eq!(ast["rootObject"]["id"]["name"], "Window");
    assert!(ast.get("loc").is_none());

    let options = ParseOptions::default().with_locations(true);
    let ast = service.parse_string("Window {}", Some(&options)).unwrap();
    assert_eq!(ast["loc"]["start"], json!({"line": 1, "column": 0}));
}

#[test]
fn test_parse_error() {
    let service = LanguageService::default();
    let err = service.parse_string("import QtQuick ver", None).unwrap_err();
    assert!(matches!(err, ServiceError::Parse(_)));
    assert_eq!(err.to_string(), "Unexpected token (1:15)");
}

#[test]
fn test_parse_file_uses_loose_options() {
    let service = service_with(&[("main.qml", "Item {\n    width:\n}")]);
    assert!(service.parse_file("main.qml", None).is_err());
    let ast = service.parse_file("main.qml", Some(&ParseOptions::loose())).unwrap();
    assert_eq!(ast["rootObject"]["block"]["members"][0]["type"], "QMLPropertyBinding");
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_by_offset_and_line() {
    let source = "Item {\n    property string label\n    property int lane\n    property var t: la\n}";
    let service = service_with(&[("main.qml", source)]);

    assert_eq!(completion_names(&service, "main.qml", after(source, "t: la")), vec!["label", "lane"]);

    let end = Location::LineCh(LineCh { line: 3, ch: 22 });
    let completions = service.completions("main.qml", end).unwrap();
    assert_eq!(completions.len(), 2);
    assert_eq!(completions[0].name, "label");
    assert_eq!(completions[0].type_name, "string");
    assert_eq!(completions[0].origin.as_deref(), Some("main.qml"));
}

#[test]
fn test_completions_on_broken_document() {
    let source = "Item {\n    property int count\n    property var t: cou\n";
    let service = service_with(&[("main.qml", source)]);
    assert_eq!(completion_names(&service, "main.qml", after(source, "t: cou")), vec!["count"]);
}

#[test]
fn test_completions_from_module_import() {
    let options = ServiceOptions::from_json_str(
        r#"{"modules": {"QtQuick": {"components": [
            {"name": "Item", "properties": [{"name": "width", "type": "real"}, {"name": "height", "type": "real"}]}
        ]}}}"#,
    )
    .unwrap();
    let source = "import QtQuick 2.0\nItem {\n    property var t: wi\n}";
    let mut service = LanguageService::new(options);
    service.open_document("main.qml".to_string(), source.to_string(), 1);
    let completions = service.completions("main.qml", after(source, "t: wi")).unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].name, "width");
    assert_eq!(completions[0].type_name, "number");
}

#[test]
fn test_completions_from_directory_import() {
    let card = "Item {\n    property string title\n}";
    let source = "import \"ui\"\nCard {\n    property var t: ti\n}";
    let service = service_with(&[("src/ui/Card.qml", card), ("src/main.qml", source)]);
    assert_eq!(completion_names(&service, "src/main.qml", after(source, "t: ti")), vec!["title"]);
}

// ============================================================================
// Definitions
// ============================================================================

#[test]
fn test_definition_in_same_document() {
    let source = "Item {\n    property int size: 4\n    Rectangle {\n        property var w: size\n    }\n}";
    let service = service_with(&[("main.qml", source)]);
    let def = service.definition("main.qml", after(source, "w: si")).unwrap();
    assert_eq!(def.origin.as_deref(), Some("main.qml"));
    assert_eq!(def.file.as_deref(), Some("main.qml"));
    assert_eq!(def.start, Some(LineCh { line: 1, ch: 17 }));
    assert_eq!(def.end, Some(LineCh { line: 1, ch: 21 }));
    assert_eq!(def.context_offset, Some(17));
}

#[test]
fn test_definition_in_sibling_document() {
    let button = "Item {\n    signal clicked()\n}";
    let source = "Button {\n    onClicked: {}\n}";
    let service = service_with(&[("src/Button.qml", button), ("src/main.qml", source)]);
    let def = service.definition("src/main.qml", Location::Offset(2)).unwrap();
    assert_eq!(def.origin.as_deref(), Some("src/Button.qml"));
    assert_eq!(def.file.as_deref(), Some("src/Button.qml"));
    assert_eq!(def.start, Some(LineCh { line: 0, ch: 0 }));
}

#[test]
fn test_definition_not_found() {
    let source = "Item {\n    width: 3\n}";
    let service = service_with(&[("main.qml", source)]);
    let def = service.definition("main.qml", Location::Offset(0)).unwrap();
    assert_eq!(def, Default::default());
    assert!(matches!(
        service.definition("missing.qml", Location::Offset(0)),
        Err(ServiceError::UnknownFile(_))
    ));
}

// ============================================================================
// Requests
// ============================================================================

#[test]
fn test_request_deserialization() {
    let request: Request = serde_json::from_value(json!({
        "type": "completions", "file": "main.qml", "end": {"line": 2, "ch": 4}
    }))
    .unwrap();
    assert_eq!(
        request,
        Request::Completions {
            file: "main.qml".to_string(),
            end: Location::LineCh(LineCh { line: 2, ch: 4 }),
        }
    );

    let request: Request = serde_json::from_value(json!({"type": "definition", "file": "a.qml", "end": 7})).unwrap();
    assert!(matches!(request, Request::Definition { end: Location::Offset(7), .. }));
}

#[test]
fn test_handle_typed_request() {
    let service = LanguageService::default();
    let request = Request::ParseString {
        text: "Item {}".to_string(),
        options: None,
    };
    match service.handle(&request) {
        Ok(Response::Ast { ast }) => assert_eq!(ast["rootObject"]["id"]["name"], "Item"),
        other => panic!("unexpected response: {:?}", other),
    }
}

#[test]
fn test_handle_json_completions() {
    let mut service = LanguageService::default();
    let source = "Item {\n    property string label\n    property var t: la\n}";
    let response = handle_json(
        &mut service,
        json!({
            "files": [{"name": "main.qml", "text": source}],
            "query": {"type": "completions", "file": "main.qml", "end": {"line": 2, "ch": 22}}
        }),
    );
    assert_eq!(
        response,
        json!({"completions": [{"name": "label", "type": "string", "origin": "main.qml"}]})
    );
    assert_eq!(service.document_text("main.qml"), Some(source));
}

#[test]
fn test_handle_json_definition() {
    let mut service = LanguageService::default();
    let source = "Item {\n    id: root\n    property var t: root\n}";
    let response = handle_json(
        &mut service,
        json!({
            "files": [{"name": "main.qml", "text": source}],
            "query": {"type": "definition", "file": "main.qml", "end": {"line": 2, "ch": 22}}
        }),
    );
    assert_eq!(
        response,
        json!({
            "origin": "main.qml",
            "start": {"line": 1, "ch": 8},
            "end": {"line": 1, "ch": 12},
            "file": "main.qml",
            "contextOffset": 8
        })
    );
}

#[test]
fn test_handle_json_parse_string() {
    let mut service = LanguageService::default();
    let response = handle_json(
        &mut service,
        json!({"query": {"type": "parseString", "text": "Item {}", "options": {"locations": true}}}),
    );
    assert_eq!(response["ast"]["type"], "QMLProgram");
    assert!(response["ast"]["loc"].is_object());
}

#[test]
fn test_handle_json_errors() {
    let mut service = LanguageService::default();
    let response = handle_json(&mut service, json!({"query": {"type": "parseFile", "file": "nope.qml"}}));
    assert_eq!(response, json!({"error": "unknown file: nope.qml"}));

    let response = handle_json(&mut service, json!({"query": {"type": "parseString", "text": "import QtQuick"}}));
    assert_eq!(response, json!({"error": "Unexpected token (1:14)"}));

    let response = service.handle_json("{");
    assert!(response.starts_with(r#"{"error":"malformed request"#));
}
