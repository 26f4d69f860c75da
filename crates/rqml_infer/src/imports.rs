//! Import resolution.
//!
//! The analysis pulls component definitions from an [`ImportResolver`]:
//! modules by name and version, directories relative to the importing file,
//! and the components living next to the document. Components are defined on
//! the file scope, or on a qualifier object for `import X as Q`.

use crate::scope::{ScopeKind, ScopeTree};
use crate::types::{AValId, DefSite, TypeGraph, TypeId};
use rqml_ast::node::*;
use rqml_ast::types::ScopeId;
use rqml_core::text::TextRange;
use rqml_options::{ComponentDef, PropertyDef, ServiceOptions};
use std::sync::Arc;
use tracing::debug;

/// A typed member of an exported component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberExport {
    pub name: String,
    /// Primitive type name (`int`, `string`, ...) or component name.
    pub type_name: Option<String>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalExport {
    pub name: String,
    pub params: Vec<MemberExport>,
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodExport {
    pub name: String,
    pub params: Vec<String>,
    pub range: Option<TextRange>,
}

/// A component visible to importing documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentExport {
    pub name: String,
    /// Name of the component this one extends.
    pub base: Option<String>,
    /// File or module that defines the component.
    pub origin: String,
    pub range: Option<TextRange>,
    pub properties: Vec<MemberExport>,
    pub signals: Vec<SignalExport>,
    pub methods: Vec<MethodExport>,
}

impl ComponentExport {
    pub fn from_def(def: &ComponentDef, origin: &str) -> Self {
        let member = |p: &PropertyDef| MemberExport {
            name: p.name.clone(),
            type_name: p.type_name.clone(),
            range: None,
        };
        Self {
            name: def.name.clone(),
            base: def.base.clone(),
            origin: origin.to_string(),
            range: None,
            properties: def.properties.iter().map(member).collect(),
            signals: def
                .signals
                .iter()
                .map(|s| SignalExport {
                    name: s.name.clone(),
                    params: s.params.iter().map(member).collect(),
                    range: None,
                })
                .collect(),
            methods: Vec::new(),
        }
    }
}

/// Supplies components for imports. Every method may report "not found".
pub trait ImportResolver {
    /// Components of module `name` (`QtQuick`, `QtQuick.Controls`).
    fn resolve_module(&self, _name: &str, _major: u32, _minor: u32) -> Option<Vec<ComponentExport>> {
        None
    }

    /// Components of the directory `path`, relative to `importer`.
    fn resolve_directory(&self, _importer: &str, _path: &str) -> Option<Vec<ComponentExport>> {
        None
    }

    /// Components in `importer`'s own directory, `importer` excluded.
    fn sibling_components(&self, _importer: &str) -> Vec<ComponentExport> {
        Vec::new()
    }
}

/// Resolves nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResolver;

impl ImportResolver for NullResolver {}

/// Resolves modules from the definitions in [`ServiceOptions`].
#[derive(Debug, Clone, Copy)]
pub struct ModuleTable<'o> {
    options: &'o ServiceOptions,
}

impl<'o> ModuleTable<'o> {
    pub fn new(options: &'o ServiceOptions) -> Self {
        Self { options }
    }
}

impl ImportResolver for ModuleTable<'_> {
    fn resolve_module(&self, name: &str, _major: u32, _minor: u32) -> Option<Vec<ComponentExport>> {
        let module = self.options.module(name)?;
        Some(module.components.iter().map(|c| ComponentExport::from_def(c, name)).collect())
    }
}

// ============================================================================
// Component files
// ============================================================================

/// Component name of a document path: the file stem when the file is a
/// `.qml` file whose stem starts with an uppercase letter and has no dot.
pub fn component_name(path: &str) -> Option<&str> {
    let file_name = path.rsplit(['/', '\\']).next()?;
    let stem = file_name.strip_suffix(".qml")?;
    let first = stem.chars().next()?;
    (first.is_uppercase() && !stem.contains('.')).then_some(stem)
}

/// Directory part of a path, with a trailing `/`; empty for bare names.
pub fn directory_of(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(i) => &path[..=i],
        None => "",
    }
}

/// Describe the root object of a parsed component file: its base type and
/// the properties, signals and functions it declares.
pub fn summarize_component(program: &Program<'_>, name: &str, origin: &str) -> ComponentExport {
    let mut export = ComponentExport {
        name: name.to_string(),
        origin: origin.to_string(),
        ..ComponentExport::default()
    };
    let Some(root) = program.root_object else {
        return export;
    };
    export.base = Some(root.id.name.to_string()).filter(|base| base != name);
    export.range = Some(root.id.data.range);
    for member in root.block.members.iter() {
        match member {
            Member::Property(decl) if !decl.id.is_dummy() => export.properties.push(MemberExport {
                name: decl.id.name.to_string(),
                type_name: Some(decl.kind.name().to_string()),
                range: Some(decl.id.data.range),
            }),
            Member::Signal(signal) if !signal.id.is_dummy() => export.signals.push(SignalExport {
                name: signal.id.name.to_string(),
                params: signal
                    .params
                    .iter()
                    // Signal parameters stay untyped.
                    .map(|p| MemberExport {
                        name: p.id.name.to_string(),
                        type_name: None,
                        range: Some(p.id.data.range),
                    })
                    .collect(),
                range: Some(signal.id.data.range),
            }),
            Member::Function(function) => {
                if let Some(id) = function.id.filter(|id| !id.is_dummy()) {
                    export.methods.push(MethodExport {
                        name: id.name.to_string(),
                        params: function.params.iter().map(|p| p.name.to_string()).collect(),
                        range: Some(id.data.range),
                    });
                }
            }
            _ => {}
        }
    }
    export
}

// ============================================================================
// Defining imports
// ============================================================================

/// Where an import's components are defined.
#[derive(Clone, Copy)]
enum Target {
    Scope(ScopeId),
    Object(TypeId),
}

/// Signal handler property name: `on` plus the signal name capitalized.
pub fn handler_name(signal: &str) -> String {
    let mut chars = signal.chars();
    match chars.next() {
        Some(first) => format!("on{}{}", first.to_uppercase(), chars.as_str()),
        None => "on".to_string(),
    }
}

/// Whether a binding name (`onClicked`) names a signal handler: `on`
/// followed by an uppercase letter.
pub fn is_handler_name(name: &str) -> bool {
    name.strip_prefix("on")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

/// Seed `aval` from a primitive type name. Other names are left open.
pub fn seed_primitive(graph: &mut TypeGraph, kind: &str, aval: AValId) {
    let ty = match kind {
        "int" | "double" | "real" | "number" => graph.number_type,
        "string" | "color" => graph.string_type,
        "boolean" | "bool" => graph.bool_type,
        _ => return,
    };
    graph.add(aval, ty);
}

pub(crate) struct ImportDefiner<'r> {
    pub resolver: &'r dyn ImportResolver,
    pub file: Arc<str>,
    /// Defined components, where they were defined and the exports they
    /// came from, for the linking pass.
    defined: Vec<(TypeId, Target, ComponentExport)>,
}

impl<'r> ImportDefiner<'r> {
    pub fn new(resolver: &'r dyn ImportResolver, file: Arc<str>) -> Self {
        Self {
            resolver,
            file,
            defined: Vec::new(),
        }
    }

    /// Define sibling components and every import of `program`, then link
    /// component bases and typed properties.
    pub fn define_imports(&mut self, graph: &mut TypeGraph, scopes: &mut ScopeTree, program: &Program<'_>) {
        let file_target = Target::Scope(scopes.file);
        for component in self.resolver.sibling_components(&self.file) {
            self.define_component(graph, scopes, file_target, component);
        }

        for statement in program.header_statements.statements.iter() {
            let HeaderStatement::Import(import) = statement else {
                continue;
            };
            let mut target = file_target;
            if let Some(qualifier) = import.qualifier.filter(|q| !q.is_dummy()) {
                let atom = graph.atoms.intern(qualifier.name);
                let def = DefSite {
                    origin: self.file.clone(),
                    range: Some(qualifier.data.range),
                };
                let prop = scopes.define(graph, scopes.file, atom, Some(def));
                let object = graph.new_object(Some(qualifier.name), Some(self.file.clone()));
                graph.add(prop, object);
                target = Target::Object(object);
            }
            let components = match &import.source {
                ImportSource::Module(module) => {
                    self.resolver.resolve_module(module.id.name, module.version.major, module.version.minor)
                }
                ImportSource::Directory(literal) => match literal.value {
                    LiteralValue::String(path) => self.resolver.resolve_directory(&self.file, path),
                    _ => None,
                },
            };
            match components {
                Some(components) => {
                    for component in components {
                        self.define_component(graph, scopes, target, component);
                    }
                }
                None => debug!(file = %self.file, range = ?import.data.range, "unresolved import"),
            }
        }

        self.link(graph, scopes);
    }

    fn define_component(&mut self, graph: &mut TypeGraph, scopes: &mut ScopeTree, target: Target, component: ComponentExport) {
        let origin: Arc<str> = Arc::from(component.origin.as_str());
        let site = |range: Option<TextRange>| DefSite {
            origin: origin.clone(),
            range,
        };
        let object = graph.new_object(Some(&component.name), Some(origin.clone()));

        for property in &component.properties {
            let atom = graph.atoms.intern(&property.name);
            let prop = graph.define_prop(object, atom, Some(site(property.range)));
            if let Some(kind) = &property.type_name {
                seed_primitive(graph, kind, prop);
            }
        }
        for method in &component.methods {
            let params = method.params.iter().map(|_| graph.new_aval()).collect();
            let f = graph.new_fn(Some(&method.name), params, method.params.clone());
            let atom = graph.atoms.intern(&method.name);
            let prop = graph.define_prop(object, atom, Some(site(method.range)));
            graph.aval_mut(prop).is_function = true;
            graph.add(prop, f);
        }
        for signal in &component.signals {
            define_signal(graph, scopes, object, signal, &site);
        }

        let atom = graph.atoms.intern(&component.name);
        let value = match target {
            Target::Scope(scope) => scopes.define(graph, scope, atom, Some(site(component.range))),
            Target::Object(qualifier) => graph.define_prop(qualifier, atom, Some(site(component.range))),
        };
        graph.add(value, object);
        self.defined.push((object, target, component));
    }

    /// Resolve component bases and component-typed properties now that every
    /// import is defined. A base is looked up next to the component first.
    fn link(&mut self, graph: &mut TypeGraph, scopes: &ScopeTree) {
        for (object, target, component) in std::mem::take(&mut self.defined) {
            if let Some(base) = component.base.as_deref() {
                let beside = match target {
                    Target::Object(qualifier) => graph
                        .atoms
                        .get(base)
                        .and_then(|atom| graph.object_prop(qualifier, atom))
                        .and_then(|value| graph.object_type_of(value)),
                    Target::Scope(_) => None,
                };
                let found = beside
                    .or_else(|| find_component(graph, scopes, base))
                    .filter(|&proto| !graph.proto_reaches(proto, object));
                graph.set_proto(object, found);
            }
            for property in &component.properties {
                let Some(kind) = property.type_name.as_deref() else {
                    continue;
                };
                let Some(component_type) = find_component(graph, scopes, kind) else {
                    continue;
                };
                let atom = graph.atoms.intern(&property.name);
                if let Some(prop) = graph.object_prop(object, atom) {
                    graph.add(prop, component_type);
                }
            }
        }
    }
}

/// Define a signal and its handler property on `object`. The signal's
/// parameters live in their own argument scope, attached to the signal type.
fn define_signal(
    graph: &mut TypeGraph,
    scopes: &mut ScopeTree,
    object: TypeId,
    signal: &SignalExport,
    site: &dyn Fn(Option<TextRange>) -> DefSite,
) {
    let args = scopes.add(ScopeKind::SignalArgs, None, TextRange::default());
    let mut params = Vec::with_capacity(signal.params.len());
    for param in &signal.params {
        let atom = graph.atoms.intern(&param.name);
        let value = scopes.define(graph, args, atom, Some(site(param.range)));
        if let Some(kind) = &param.type_name {
            seed_primitive(graph, kind, value);
        }
        params.push(value);
    }
    let names = signal.params.iter().map(|p| p.name.clone()).collect();
    let f = graph.new_fn(Some(&signal.name), params, names);
    graph.set_signal_args(f, args);
    if let Some(ret) = graph.as_fn(f).map(|f| f.ret) {
        let tag = graph.new_object(Some(SIGNAL), None);
        graph.add(ret, tag);
    }

    let atom = graph.atoms.intern(&signal.name);
    let prop = graph.define_prop(object, atom, Some(site(signal.range)));
    graph.aval_mut(prop).is_function = true;
    graph.add(prop, f);

    let handler_atom = graph.atoms.intern(&handler_name(&signal.name));
    let handler = graph.define_prop(object, handler_atom, Some(site(signal.range)));
    graph.aval_mut(handler).signal = Some(f);
    let marker = graph.new_object(Some(SIGNAL_HANDLER), None);
    graph.add(handler, marker);
}

/// Type name of the value a signal returns.
pub const SIGNAL: &str = "Signal";

/// Type name given to handler properties.
pub const SIGNAL_HANDLER: &str = "Signal Handler";

/// The object type a (possibly dotted) component name denotes in the file scope.
pub fn find_component(graph: &TypeGraph, scopes: &ScopeTree, name: &str) -> Option<TypeId> {
    let parts: Vec<&str> = name.split('.').collect();
    let value = scopes.lookup_path(graph, scopes.file, &parts)?;
    graph.object_type_of(value)
}
