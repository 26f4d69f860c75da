//! Queries over a finished analysis: completions, definitions and types.

use crate::analyzer::{Analyzer, RefTarget, Reference};
use crate::scope::{gather_object, ScopeTree};
use crate::types::{AValId, Type, TypeGraph};
use rqml_ast::types::ScopeId;
use rqml_core::intern::Atom;
use rqml_core::text::{TextPos, TextRange};
use rqml_core::collections::FxHashSet;
use rqml_scanner::is_identifier_part;
use std::sync::Arc;

/// A completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub name: String,
    /// Printable type, `?` when unknown.
    pub type_name: String,
    /// File or module that defines the name.
    pub origin: Option<String>,
}

/// Where a name was defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// File or module that defines the name.
    pub origin: String,
    /// Range of the declaring node in `origin`; `None` for built-ins and
    /// module definitions.
    pub range: Option<TextRange>,
}

/// The result of analyzing one document.
#[derive(Debug)]
pub struct Analysis {
    file: Arc<str>,
    graph: TypeGraph,
    scopes: ScopeTree,
    root_scope: Option<ScopeId>,
    refs: Vec<Reference>,
    exprs: Vec<(TextRange, AValId)>,
}

impl From<Analyzer> for Analysis {
    fn from(analyzer: Analyzer) -> Self {
        Self {
            file: analyzer.file,
            graph: analyzer.graph,
            scopes: analyzer.scopes,
            root_scope: analyzer.root_scope,
            refs: analyzer.refs,
            exprs: analyzer.exprs,
        }
    }
}

impl Analysis {
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// Printable type of a property of the root object.
    pub fn root_property_type(&self, name: &str) -> Option<String> {
        let object = self.root_scope.and_then(|scope| self.scopes.object_of(scope))?;
        let prop = self.graph.object_prop(object, self.graph.atoms.get(name)?)?;
        Some(self.graph.display_aval(prop))
    }

    /// Printable type of `name` as seen from the innermost scope at `offset`.
    pub fn type_of_name(&self, offset: TextPos, name: &str) -> Option<String> {
        let scope = self.scopes.innermost_at(offset);
        let parts: Vec<&str> = name.split('.').collect();
        let value = self.scopes.lookup_path(&self.graph, scope, &parts)?;
        Some(self.graph.display_aval(value))
    }

    /// Printable type of the innermost expression or name covering `offset`.
    pub fn type_at(&self, offset: TextPos) -> Option<String> {
        let expr = self
            .exprs
            .iter()
            .filter(|(range, _)| range.contains_inclusive(offset))
            .min_by_key(|(range, _)| range.len())
            .map(|&(_, value)| value);
        let value = expr.or_else(|| self.reference_at(offset).and_then(|r| self.target_value(r.target)))?;
        Some(self.graph.display_aval(value))
    }

    // ========================================================================
    // Completions
    // ========================================================================

    /// Names that may complete the word ending at `offset`, sorted by name.
    /// After a `.` the candidates are the properties of the value before it.
    pub fn completions(&self, source: &str, offset: TextPos) -> Vec<Completion> {
        let chars: Vec<char> = source.chars().take(offset as usize).collect();
        let end = chars.len();
        let mut start = end;
        while start > 0 && is_identifier_part(chars[start - 1]) {
            start -= 1;
        }
        let prefix: String = chars[start..end].iter().collect();

        let candidates = if start > 0 && chars[start - 1] == '.' {
            self.member_candidates(&chars, start - 1, offset)
        } else {
            let scope = self.scopes.innermost_at(offset);
            self.scopes.visible(&self.graph, scope)
        };

        let mut seen: FxHashSet<Atom> = FxHashSet::default();
        let mut out: Vec<Completion> = Vec::new();
        for (atom, value) in candidates {
            if !seen.insert(atom) {
                continue;
            }
            let name = self.graph.atoms.resolve(atom);
            if !name.starts_with(prefix.as_str()) {
                continue;
            }
            let aval = self.graph.aval(value);
            out.push(Completion {
                name: name.to_string(),
                type_name: self.graph.display_aval(value),
                origin: aval.def.as_ref().map(|def| def.origin.to_string()),
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Properties of the value whose expression ends at the `.` at `dot`.
    fn member_candidates(&self, chars: &[char], dot: usize, offset: TextPos) -> Vec<(Atom, AValId)> {
        let dot = dot as TextPos;
        let recorded = self
            .exprs
            .iter()
            .filter(|(range, _)| range.end == dot)
            .max_by_key(|(range, _)| range.len())
            .map(|&(_, value)| value);
        let value = recorded.or_else(|| {
            let path = dotted_path_before(chars, dot as usize);
            let parts: Vec<&str> = path.split('.').collect();
            let scope = self.scopes.innermost_at(offset);
            self.scopes.lookup_path(&self.graph, scope, &parts)
        });
        let Some(value) = value else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for &ty in self.graph.aval(value).types() {
            match self.graph.get(ty) {
                Type::Object(_) => gather_object(&self.graph, ty, &mut out),
                Type::String | Type::Array(_) => {
                    if let Some(length) = self.graph.atoms.get("length") {
                        out.push((length, self.graph.number_val));
                    }
                }
                _ => {}
            }
        }
        out
    }

    // ========================================================================
    // Definitions
    // ========================================================================

    /// The definition of the name under `offset`.
    pub fn definition(&self, offset: TextPos) -> Option<Definition> {
        let reference = self.reference_at(offset)?;
        let value = self.target_value(reference.target)?;
        let def = self.graph.aval(value).def.as_ref()?;
        Some(Definition {
            origin: def.origin.to_string(),
            range: def.range,
        })
    }

    /// The innermost recorded name occurrence covering `offset`.
    fn reference_at(&self, offset: TextPos) -> Option<&Reference> {
        self.refs
            .iter()
            .filter(|r| r.range.contains_inclusive(offset))
            .min_by_key(|r| r.range.len())
    }

    fn target_value(&self, target: RefTarget) -> Option<AValId> {
        match target {
            RefTarget::Value(value) => Some(value),
            RefTarget::Member { object, name } => self.graph.prop_of(object, name),
        }
    }
}

/// The identifier path (`a.b.c`) ending just before `end`.
fn dotted_path_before(chars: &[char], end: usize) -> String {
    let mut start = end;
    while start > 0 && (is_identifier_part(chars[start - 1]) || chars[start - 1] == '.') {
        start -= 1;
    }
    chars[start..end].iter().collect::<String>().trim_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_path_before() {
        let chars: Vec<char> = "x = root.item.".chars().collect();
        assert_eq!(dotted_path_before(&chars, 13), "root.item");
        let chars: Vec<char> = "(a).".chars().collect();
        assert_eq!(dotted_path_before(&chars, 3), "");
    }
}
