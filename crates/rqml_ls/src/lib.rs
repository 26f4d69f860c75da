//! rqml_ls: Language service.
//!
//! Tracks open QML documents and answers parse, completion and definition
//! queries. Queries run against the latest text of every open document:
//! components defined by other open files are visible to directory imports
//! and to documents in the same directory.

mod protocol;
mod resolver;

use indexmap::IndexMap;
use rqml_ast::serialize::AstSerializer;
use rqml_core::text::{LineMap, TextPos};
use rqml_core::SyntaxArena;
use rqml_diagnostics::ParseError;
use rqml_infer::{analyze, Analysis};
use rqml_options::{ParseOptions, ServiceOptions};
use rqml_parser::{parse, parse_loose};
use serde_json::Value;
use tracing::debug;

pub use protocol::{CompletionInfo, DefinitionInfo, Envelope, FileText, LineCh, Location, Request, Response};
use resolver::DocumentResolver;

/// A document tracked by the language service.
#[derive(Debug)]
pub(crate) struct Document {
    text: String,
    /// Version number for incremental updates.
    version: i32,
    line_map: LineMap,
}

impl Document {
    fn new(text: String, version: i32) -> Self {
        let line_map = LineMap::new(&text);
        Self {
            text,
            version,
            line_map,
        }
    }

    fn offset_of(&self, location: Location) -> TextPos {
        match location {
            Location::Offset(offset) => offset,
            Location::LineCh(LineCh { line, ch }) => self.line_map.offset_of(line, ch),
        }
    }

    fn line_ch(&self, pos: TextPos) -> LineCh {
        let lc = self.line_map.line_and_column_of(pos);
        LineCh {
            line: lc.line,
            ch: lc.character,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unknown file: {0}")]
    UnknownFile(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("malformed request: {0}")]
    Request(#[from] serde_json::Error),
}

/// Language service over a set of open documents.
pub struct LanguageService {
    options: ServiceOptions,
    /// Open documents by file name, in opening order.
    documents: IndexMap<String, Document>,
}

impl LanguageService {
    pub fn new(options: ServiceOptions) -> Self {
        Self {
            options,
            documents: IndexMap::new(),
        }
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Open or replace a document.
    pub fn open_document(&mut self, file: String, text: String, version: i32) {
        debug!(file = %file, version, "open document");
        self.documents.insert(file, Document::new(text, version));
    }

    /// Replace the text of an open document. Unknown files are ignored.
    pub fn update_document(&mut self, file: &str, text: String, version: i32) {
        if let Some(doc) = self.documents.get_mut(file) {
            *doc = Document::new(text, version);
        }
    }

    pub fn close_document(&mut self, file: &str) {
        self.documents.shift_remove(file);
    }

    pub fn document_text(&self, file: &str) -> Option<&str> {
        self.documents.get(file).map(|d| d.text.as_str())
    }

    pub fn document_version(&self, file: &str) -> Option<i32> {
        self.documents.get(file).map(|d| d.version)
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    /// Parse `text` and serialize its AST. `options` default to the
    /// service's parse options.
    pub fn parse_string(&self, text: &str, options: Option<&ParseOptions>) -> Result<Value, ServiceError> {
        let options = options.unwrap_or(&self.options.parse);
        let arena = SyntaxArena::for_source(text.len());
        let program = parse(text, options, arena.bump())?;
        let line_map = LineMap::new(text);
        let serializer = if options.locations {
            AstSerializer::with_locations(&line_map)
        } else {
            AstSerializer::new()
        };
        Ok(serializer.program(program))
    }

    /// Parse an open document.
    pub fn parse_file(&self, file: &str, options: Option<&ParseOptions>) -> Result<Value, ServiceError> {
        let doc = self.document(file)?;
        self.parse_string(&doc.text, options)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Completions for the word ending at `end`, sorted by name.
    pub fn completions(&self, file: &str, end: Location) -> Result<Vec<CompletionInfo>, ServiceError> {
        let (analysis, doc) = self.analyze_document(file)?;
        let offset = doc.offset_of(end);
        let completions = analysis
            .completions(&doc.text, offset)
            .into_iter()
            .map(|c| CompletionInfo {
                name: c.name,
                type_name: c.type_name,
                origin: c.origin,
            })
            .collect();
        Ok(completions)
    }

    /// Definition of the name at `end`. Nothing found is an empty result.
    pub fn definition(&self, file: &str, end: Location) -> Result<DefinitionInfo, ServiceError> {
        let (analysis, doc) = self.analyze_document(file)?;
        let Some(def) = analysis.definition(doc.offset_of(end)) else {
            return Ok(DefinitionInfo::default());
        };
        let mut info = DefinitionInfo {
            origin: Some(def.origin.clone()),
            ..DefinitionInfo::default()
        };
        if let Some(range) = def.range {
            if let Some(target) = self.documents.get(&def.origin) {
                let start = target.line_ch(range.pos);
                info.start = Some(start);
                info.end = Some(target.line_ch(range.end));
                info.context_offset = Some(start.ch);
            }
            info.file = Some(def.origin);
        }
        Ok(info)
    }

    /// Analyze an open document. The strict grammar is tried first; text
    /// that does not parse strictly is analyzed from the loose tree.
    fn analyze_document(&self, file: &str) -> Result<(Analysis, &Document), ServiceError> {
        let doc = self.document(file)?;
        let arena = SyntaxArena::for_source(doc.text.len());
        let strict = ParseOptions {
            loose: false,
            ..self.options.parse.clone()
        };
        let program = match parse(&doc.text, &strict, arena.bump()) {
            Ok(program) => program,
            Err(err) => {
                debug!(file, error = %err, "falling back to the loose grammar");
                parse_loose(&doc.text, &strict, arena.bump())?
            }
        };
        let resolver = DocumentResolver::new(&self.options, &self.documents);
        Ok((analyze(program, file, &resolver), doc))
    }

    fn document(&self, file: &str) -> Result<&Document, ServiceError> {
        self.documents
            .get(file)
            .ok_or_else(|| ServiceError::UnknownFile(file.to_string()))
    }

    // ========================================================================
    // Requests
    // ========================================================================

    pub fn handle(&self, request: &Request) -> Result<Response, ServiceError> {
        match request {
            Request::ParseFile { file, options } => Ok(Response::Ast {
                ast: self.parse_file(file, options.as_ref())?,
            }),
            Request::ParseString { text, options } => Ok(Response::Ast {
                ast: self.parse_string(text, options.as_ref())?,
            }),
            Request::Completions { file, end } => Ok(Response::Completions {
                completions: self.completions(file, *end)?,
            }),
            Request::Definition { file, end } => Ok(Response::Definition(self.definition(file, *end)?)),
        }
    }

    /// Handle a JSON [`Envelope`]: open its files, then answer its query.
    /// Failures become `{"error": "<message>"}`.
    pub fn handle_json(&mut self, json: &str) -> String {
        let result = serde_json::from_str::<Envelope>(json)
            .map_err(ServiceError::from)
            .and_then(|envelope| {
                for file in envelope.files {
                    self.open_document(file.name, file.text, 0);
                }
                debug!(query = ?envelope.query, "handling request");
                self.handle(&envelope.query)
            })
            .and_then(|response| serde_json::to_value(response).map_err(ServiceError::from));
        match result {
            Ok(value) => value.to_string(),
            Err(err) => serde_json::json!({ "error": err.to_string() }).to_string(),
        }
    }
}

impl Default for LanguageService {
    fn default() -> Self {
        Self::new(ServiceOptions::default())
    }
}
