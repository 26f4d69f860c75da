//! rqml_infer: Scope and type inference for QML documents.
//!
//! Analysis runs in two passes over a parsed [`Program`]. Gathering builds
//! the scope tree and defines every declared name; inference then flows
//! types from literals, declarations and imports into the properties and
//! variables that use them. The finished [`Analysis`] answers completion,
//! definition and type queries.
//!
//! Lookup misses are never errors: an unresolved name simply has no type.

mod analyzer;
mod gather;
mod globals;
mod imports;
mod infer;
mod query;
mod scope;
mod types;

use analyzer::Analyzer;
use imports::ImportDefiner;
use rqml_ast::node::Program;
use tracing::debug;

pub use globals::ECMASCRIPT_ORIGIN;
pub use imports::{
    component_name, directory_of, handler_name, is_handler_name, summarize_component, ComponentExport, ImportResolver,
    MemberExport, MethodExport, ModuleTable, NullResolver, SignalExport, SIGNAL, SIGNAL_HANDLER,
};
pub use query::{Analysis, Completion, Definition};
pub use scope::{Scope, ScopeKind, ScopeTree};
pub use types::{AVal, AValId, ArrayType, DefSite, FnType, ObjectType, Type, TypeGraph, TypeId};

/// Analyze a parsed document. `file` names the document for definition
/// sites and import resolution.
pub fn analyze<'a>(program: &'a Program<'a>, file: &str, resolver: &dyn ImportResolver) -> Analysis {
    debug!(file, "analyzing QML document");
    let mut analyzer = Analyzer::new(file, program.data.range);
    globals::define_globals(&mut analyzer.graph, &mut analyzer.scopes);

    let mut definer = ImportDefiner::new(resolver, analyzer.file.clone());
    definer.define_imports(&mut analyzer.graph, &mut analyzer.scopes, program);

    analyzer.gather_program(program);
    analyzer.infer_program(program);
    debug!(file, scopes = analyzer.scopes.len(), references = analyzer.refs.len(), "analysis complete");
    Analysis::from(analyzer)
}
