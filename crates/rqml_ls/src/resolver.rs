//! Import resolution against the service's modules and open documents.

use crate::Document;
use indexmap::IndexMap;
use rqml_core::SyntaxArena;
use rqml_infer::{component_name, directory_of, summarize_component, ComponentExport, ImportResolver, ModuleTable};
use rqml_options::{ParseOptions, ServiceOptions};
use rqml_parser::parse_loose;
use tracing::trace;

/// Modules come from the service options; directories and siblings from the
/// open documents whose file names make them components.
pub(crate) struct DocumentResolver<'s> {
    modules: ModuleTable<'s>,
    documents: &'s IndexMap<String, Document>,
}

impl<'s> DocumentResolver<'s> {
    pub fn new(options: &'s ServiceOptions, documents: &'s IndexMap<String, Document>) -> Self {
        Self {
            modules: ModuleTable::new(options),
            documents,
        }
    }

    /// Components defined by open documents directly inside `directory`.
    fn components_in(&self, directory: &str, except: Option<&str>) -> Vec<ComponentExport> {
        let mut out = Vec::new();
        let mut arena = SyntaxArena::new();
        for (file, doc) in self.documents {
            if Some(file.as_str()) == except || directory_of(file) != directory {
                continue;
            }
            let Some(name) = component_name(file) else {
                continue;
            };
            trace!(file = %file, name, "summarizing component");
            arena.reset();
            if let Ok(program) = parse_loose(&doc.text, &ParseOptions::default(), arena.bump()) {
                out.push(summarize_component(program, name, file));
            }
        }
        out
    }
}

impl ImportResolver for DocumentResolver<'_> {
    fn resolve_module(&self, name: &str, major: u32, minor: u32) -> Option<Vec<ComponentExport>> {
        self.modules.resolve_module(name, major, minor)
    }

    fn resolve_directory(&self, importer: &str, path: &str) -> Option<Vec<ComponentExport>> {
        let directory = join_directory(directory_of(importer), path);
        let components = self.components_in(&directory, Some(importer));
        (!components.is_empty()).then_some(components)
    }

    fn sibling_components(&self, importer: &str) -> Vec<ComponentExport> {
        self.components_in(directory_of(importer), Some(importer))
    }
}

/// Resolve `path` against `base` (a directory with a trailing `/`, or
/// empty), folding `.` and `..` segments. The result ends with `/` unless
/// it is empty.
pub(crate) fn join_directory(base: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}{}", base, path)
    };
    let absolute = joined.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(&last) if last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }
    let mut out = String::new();
    if absolute {
        out.push('/');
    }
    for segment in segments {
        out.push_str(segment);
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_directory() {
        assert_eq!(join_directory("src/", "."), "src/");
        assert_eq!(join_directory("src/", "ui"), "src/ui/");
        assert_eq!(join_directory("src/", "./ui/"), "src/ui/");
        assert_eq!(join_directory("src/ui/", "../lib"), "src/lib/");
        assert_eq!(join_directory("", "."), "");
        assert_eq!(join_directory("", "../x"), "../x/");
        assert_eq!(join_directory("/a/", ".."), "/");
    }
}
