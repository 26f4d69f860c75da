//! JSON request and response shapes.

use rqml_options::ParseOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A position in a document: a character offset or a 0-based line and
/// character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Offset(u32),
    LineCh(LineCh),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCh {
    pub line: u32,
    pub ch: u32,
}

/// A query, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    ParseFile {
        file: String,
        #[serde(default)]
        options: Option<ParseOptions>,
    },
    ParseString {
        text: String,
        #[serde(default)]
        options: Option<ParseOptions>,
    },
    Completions {
        file: String,
        end: Location,
    },
    Definition {
        file: String,
        end: Location,
    },
}

/// Document text sent along with a query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileText {
    pub name: String,
    pub text: String,
}

/// The JSON envelope: documents to open or replace, then the query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub files: Vec<FileText>,
    pub query: Request,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// A definition site. Every field is absent when nothing was found; the
/// positions are absent for built-ins and module definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<LineCh>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<LineCh>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Character offset of `start` within its line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ast { ast: Value },
    Completions { completions: Vec<CompletionInfo> },
    Definition(DefinitionInfo),
}
