//! State shared by the gathering and inference passes.

use crate::scope::ScopeTree;
use crate::types::{AValId, DefSite, TypeGraph};
use rqml_ast::node::QualifiedId;
use rqml_ast::types::ScopeId;
use rqml_core::intern::Atom;
use rqml_core::text::TextRange;
use std::sync::Arc;

/// What a name in the source refers to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RefTarget {
    /// A variable, property or declaration.
    Value(AValId),
    /// A property read off another value, resolved when queried.
    Member { object: AValId, name: Atom },
}

/// A name occurrence and its target.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reference {
    pub range: TextRange,
    pub target: RefTarget,
}

pub(crate) struct Analyzer {
    pub file: Arc<str>,
    /// Component name when the document is itself a component file.
    pub component: Option<String>,
    pub graph: TypeGraph,
    pub scopes: ScopeTree,
    pub root_scope: Option<ScopeId>,
    pub refs: Vec<Reference>,
    /// Values of identifier, member and call expressions by range.
    pub exprs: Vec<(TextRange, AValId)>,
}

impl Analyzer {
    pub fn new(file: &str, document: TextRange) -> Self {
        Self {
            file: Arc::from(file),
            component: crate::imports::component_name(file).map(str::to_string),
            graph: TypeGraph::new(),
            scopes: ScopeTree::new(document),
            root_scope: None,
            refs: Vec::new(),
            exprs: Vec::new(),
        }
    }

    /// A definition site in this document.
    pub fn site(&self, range: TextRange) -> DefSite {
        DefSite {
            origin: self.file.clone(),
            range: Some(range),
        }
    }

    pub fn intern(&mut self, name: &str) -> Atom {
        self.graph.atoms.intern(name)
    }

    /// Define `name` in `scope` with its declaration at `range`, and record
    /// the declaration as a reference to itself.
    pub fn declare(&mut self, scope: ScopeId, name: &str, range: TextRange) -> AValId {
        let atom = self.intern(name);
        let site = self.site(range);
        let aval = self.scopes.define(&mut self.graph, scope, atom, Some(site));
        self.reference(range, RefTarget::Value(aval));
        aval
    }

    /// Resolve a dotted type name from `scope` and record a reference for
    /// each segment. The full joined name wins when it is defined as such;
    /// otherwise the segments are walked as a member chain, which is how
    /// import qualifiers (`Q.Rectangle`) resolve.
    pub fn resolve_qualified_id(&mut self, scope: ScopeId, qid: &QualifiedId<'_>) -> Option<AValId> {
        if !qid.is_single() {
            let joined = self.graph.atoms.get(qid.name);
            if let Some(value) = joined.and_then(|atom| self.scopes.lookup(&self.graph, scope, atom)) {
                self.reference(qid.data.range, RefTarget::Value(value));
                return Some(value);
            }
        }
        let mut current: Option<AValId> = None;
        for part in qid.parts.iter() {
            if part.is_dummy() {
                return None;
            }
            let atom = self.intern(part.name);
            let next = match current {
                None => {
                    let value = self.scopes.lookup(&self.graph, scope, atom)?;
                    self.reference(part.data.range, RefTarget::Value(value));
                    value
                }
                Some(object) => {
                    self.reference(part.data.range, RefTarget::Member { object, name: atom });
                    self.graph.prop_of(object, atom)?
                }
            };
            current = Some(next);
        }
        current
    }

    /// Resolve the property named by a binding or property modifier. A
    /// dotted name resolves only as a whole: `anchors.fill` must be defined
    /// under that name, and never reaches the `fill` property of `anchors`.
    pub fn resolve_property_name(&mut self, scope: ScopeId, qid: &QualifiedId<'_>) -> Option<AValId> {
        if qid.parts.iter().any(|part| part.is_dummy()) {
            return None;
        }
        let atom = self.graph.atoms.get(qid.name)?;
        let value = self.scopes.lookup(&self.graph, scope, atom)?;
        self.reference(qid.data.range, RefTarget::Value(value));
        Some(value)
    }

    pub fn reference(&mut self, range: TextRange, target: RefTarget) {
        if !range.is_empty() {
            self.refs.push(Reference { range, target });
        }
    }
}
