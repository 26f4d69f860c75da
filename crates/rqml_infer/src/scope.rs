//! Scope tree for a QML document.
//!
//! Object scopes own no properties: they read and write the properties of the
//! object type they stand for. Member scopes see their object's non-function
//! properties and then the file scope. Script scopes (binding values and
//! statement blocks) resolve names in this order: document ids, their own
//! variables, the function or signal-argument scope, JavaScript globals, then
//! the enclosing scope chain.

use crate::types::{AValId, DefSite, TypeGraph, TypeId};
use indexmap::IndexMap;
use rqml_ast::types::ScopeId;
use rqml_core::intern::Atom;
use rqml_core::text::TextRange;

/// Maximum depth of a scope chain walk.
const MAX_SCOPE_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// JavaScript built-ins.
    Global,
    /// Imported components and qualifiers.
    File,
    /// Names given with `id:` anywhere in the document.
    Ids,
    /// An object literal; properties live in `object`.
    Object { object: TypeId },
    /// A member block of an object literal.
    Member { file: ScopeId },
    /// A binding value or statement block. Function members get one of these
    /// as the parent of their `Function` scope.
    Block,
    /// The value of an `on<Signal>` binding; `args` is filled during inference.
    Handler { args: Option<ScopeId> },
    /// Parameters and `var`s of a JavaScript function.
    Function { function: TypeId },
    /// Parameters of a signal definition.
    SignalArgs,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Source range of the node that owns the scope.
    pub range: TextRange,
    props: IndexMap<Atom, AValId>,
}

impl Scope {
    pub fn own_props(&self) -> impl Iterator<Item = (Atom, AValId)> + '_ {
        self.props.iter().map(|(&k, &v)| (k, v))
    }
}

#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    pub global: ScopeId,
    pub file: ScopeId,
    pub ids: ScopeId,
}

impl ScopeTree {
    pub fn new(document: TextRange) -> Self {
        let mut tree = Self {
            scopes: Vec::new(),
            global: ScopeId(0),
            file: ScopeId(1),
            ids: ScopeId(2),
        };
        tree.global = tree.add(ScopeKind::Global, None, document);
        tree.file = tree.add(ScopeKind::File, None, document);
        tree.ids = tree.add(ScopeKind::Ids, None, document);
        tree
    }

    pub fn add(&mut self, kind: ScopeKind, parent: Option<ScopeId>, range: TextRange) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            range,
            props: IndexMap::new(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i as u32), s))
    }

    pub fn set_handler_args(&mut self, handler: ScopeId, args: ScopeId) {
        if let ScopeKind::Handler { args: slot } = &mut self.scopes[handler.index()].kind {
            *slot = Some(args);
        }
    }

    /// The object type behind an object scope.
    pub fn object_of(&self, scope: ScopeId) -> Option<TypeId> {
        match self.get(scope).kind {
            ScopeKind::Object { object } => Some(object),
            _ => None,
        }
    }

    /// The nearest enclosing object type.
    pub fn enclosing_object(&self, scope: ScopeId) -> Option<TypeId> {
        let mut current = Some(scope);
        for _ in 0..MAX_SCOPE_DEPTH {
            let id = current?;
            if let Some(object) = self.object_of(id) {
                return Some(object);
            }
            current = self.get(id).parent;
        }
        None
    }

    /// The function type whose body `scope` belongs to.
    pub fn enclosing_function(&self, scope: ScopeId) -> Option<TypeId> {
        let mut current = Some(scope);
        for _ in 0..MAX_SCOPE_DEPTH {
            let id = current?;
            match self.get(id).kind {
                ScopeKind::Function { function } => return Some(function),
                ScopeKind::Object { .. } | ScopeKind::Member { .. } => return None,
                _ => current = self.get(id).parent,
            }
        }
        None
    }

    // ========================================================================
    // Definition
    // ========================================================================

    /// Define `name` in `scope`, reusing an existing definition there.
    /// Object and member scopes write through to the object type.
    pub fn define(&mut self, graph: &mut TypeGraph, scope: ScopeId, name: Atom, def: Option<DefSite>) -> AValId {
        let (kind, parent) = (self.get(scope).kind, self.get(scope).parent);
        match kind {
            ScopeKind::Object { object } => graph.define_prop(object, name, def),
            ScopeKind::Member { .. } => match parent {
                Some(parent) => self.define(graph, parent, name, def),
                None => graph.empty_val,
            },
            _ => {
                if let Some(&existing) = self.get(scope).props.get(&name) {
                    return existing;
                }
                let aval = graph.new_aval();
                graph.aval_mut(aval).def = def;
                self.scopes[scope.index()].props.insert(name, aval);
                aval
            }
        }
    }

    /// Bind an existing value under `name` in a scope that owns its properties.
    pub fn insert(&mut self, scope: ScopeId, name: Atom, aval: AValId) {
        self.scopes[scope.index()].props.insert(name, aval);
    }

    pub fn own(&self, scope: ScopeId, name: Atom) -> Option<AValId> {
        self.get(scope).props.get(&name).copied()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Resolve `name` from `scope` outward. Misses return `None`.
    pub fn lookup(&self, graph: &TypeGraph, scope: ScopeId, name: Atom) -> Option<AValId> {
        self.lookup_depth(graph, scope, name, true, 0)
    }

    fn lookup_depth(&self, graph: &TypeGraph, scope: ScopeId, name: Atom, outward: bool, depth: usize) -> Option<AValId> {
        if depth > MAX_SCOPE_DEPTH {
            return None;
        }
        let s = self.get(scope);
        let found = match s.kind {
            ScopeKind::Object { object } => graph.object_prop(object, name),
            ScopeKind::Member { file } => {
                let own = s
                    .parent
                    .and_then(|object| self.lookup_depth(graph, object, name, false, depth + 1))
                    .filter(|&prop| !graph.aval(prop).is_function);
                return own.or_else(|| self.lookup_depth(graph, file, name, outward, depth + 1));
            }
            ScopeKind::Block => self.script_lookup(graph, scope, None, name, depth),
            ScopeKind::Handler { args } => self.script_lookup(graph, scope, args, name, depth),
            _ => s.props.get(&name).copied(),
        };
        if found.is_some() || !outward {
            return found;
        }
        s.parent.and_then(|parent| self.lookup_depth(graph, parent, name, true, depth + 1))
    }

    fn script_lookup(&self, graph: &TypeGraph, scope: ScopeId, inner: Option<ScopeId>, name: Atom, depth: usize) -> Option<AValId> {
        self.own(self.ids, name)
            .or_else(|| self.own(scope, name))
            .or_else(|| inner.and_then(|inner| self.lookup_depth(graph, inner, name, true, depth + 1)))
            .or_else(|| self.own(self.global, name))
    }

    /// Resolve a dotted path: the full joined name first, then the first
    /// segment in scope and the rest as properties of its type.
    pub fn lookup_path(&self, graph: &TypeGraph, scope: ScopeId, parts: &[&str]) -> Option<AValId> {
        let (first, rest) = parts.split_first()?;
        if !rest.is_empty() {
            let joined = parts.join(".");
            if let Some(found) = graph.atoms.get(&joined).and_then(|atom| self.lookup(graph, scope, atom)) {
                return Some(found);
            }
        }
        let mut current = self.lookup(graph, scope, graph.atoms.get(first)?)?;
        for part in rest {
            current = graph.prop_of(current, graph.atoms.get(part)?)?;
        }
        Some(current)
    }

    // ========================================================================
    // Enumeration
    // ========================================================================

    /// Every name visible from `scope`, nearest first, in lookup order.
    /// Shadowed names may repeat; callers keep the first.
    pub fn visible(&self, graph: &TypeGraph, scope: ScopeId) -> Vec<(Atom, AValId)> {
        let mut out = Vec::new();
        self.gather(graph, scope, true, &mut out, 0);
        out
    }

    fn gather(&self, graph: &TypeGraph, scope: ScopeId, outward: bool, out: &mut Vec<(Atom, AValId)>, depth: usize) {
        if depth > MAX_SCOPE_DEPTH {
            return;
        }
        let s = self.get(scope);
        match s.kind {
            ScopeKind::Object { object } => gather_object(graph, object, out),
            ScopeKind::Member { file } => {
                if let Some(object) = s.parent.and_then(|p| self.object_of(p)) {
                    let mut own = Vec::new();
                    gather_object(graph, object, &mut own);
                    out.extend(own.into_iter().filter(|&(_, prop)| !graph.aval(prop).is_function));
                }
                self.gather(graph, file, outward, out, depth + 1);
                return;
            }
            ScopeKind::Block | ScopeKind::Handler { .. } => {
                out.extend(self.get(self.ids).own_props());
                out.extend(s.own_props());
                if let ScopeKind::Handler { args: Some(args) } = s.kind {
                    self.gather(graph, args, true, out, depth + 1);
                }
                out.extend(self.get(self.global).own_props());
            }
            _ => out.extend(s.own_props()),
        }
        if outward {
            if let Some(parent) = s.parent {
                self.gather(graph, parent, true, out, depth + 1);
            }
        }
    }

    /// The innermost scope whose owner encloses `pos`. Later scopes win ties,
    /// so a wrapper created after the scope it wraps is preferred.
    pub fn innermost_at(&self, pos: u32) -> ScopeId {
        let mut best = self.file;
        let mut best_len = u32::MAX;
        for (id, scope) in self.iter() {
            if matches!(scope.kind, ScopeKind::Global | ScopeKind::Ids | ScopeKind::SignalArgs) {
                continue;
            }
            if scope.range.contains_inclusive(pos) && scope.range.len() <= best_len {
                best = id;
                best_len = scope.range.len();
            }
        }
        best
    }
}

/// Properties of an object and its prototypes, own first.
pub(crate) fn gather_object(graph: &TypeGraph, object: TypeId, out: &mut Vec<(Atom, AValId)>) {
    let mut current = Some(object);
    let mut seen = 0;
    while let Some(obj) = current.and_then(|ty| graph.as_object(ty)) {
        out.extend(obj.props.iter().map(|(&k, &v)| (k, v)));
        current = obj.proto;
        seen += 1;
        if seen > MAX_SCOPE_DEPTH {
            break;
        }
    }
}
