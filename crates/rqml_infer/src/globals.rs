//! JavaScript built-ins visible from every script scope.

use crate::scope::ScopeTree;
use crate::types::{AValId, DefSite, TypeGraph, TypeId};
use rqml_ast::types::ScopeId;
use std::sync::Arc;

/// Origin reported for built-in names.
pub const ECMASCRIPT_ORIGIN: &str = "ecma5";

/// Short type codes used by the tables below.
#[derive(Clone, Copy)]
enum T {
    Num,
    Str,
    Bool,
    Any,
}

const MATH: &[(&str, &[T], T)] = &[
    ("abs", &[T::Num], T::Num),
    ("ceil", &[T::Num], T::Num),
    ("floor", &[T::Num], T::Num),
    ("round", &[T::Num], T::Num),
    ("sqrt", &[T::Num], T::Num),
    ("pow", &[T::Num, T::Num], T::Num),
    ("max", &[T::Num, T::Num], T::Num),
    ("min", &[T::Num, T::Num], T::Num),
    ("random", &[], T::Num),
    ("sin", &[T::Num], T::Num),
    ("cos", &[T::Num], T::Num),
    ("atan2", &[T::Num, T::Num], T::Num),
];

const CONSOLE: &[(&str, &[T], T)] = &[
    ("log", &[T::Any], T::Any),
    ("debug", &[T::Any], T::Any),
    ("info", &[T::Any], T::Any),
    ("warn", &[T::Any], T::Any),
    ("error", &[T::Any], T::Any),
];

const JSON: &[(&str, &[T], T)] = &[("parse", &[T::Str], T::Any), ("stringify", &[T::Any], T::Str)];

const FUNCTIONS: &[(&str, &[T], T)] = &[
    ("parseInt", &[T::Str, T::Num], T::Num),
    ("parseFloat", &[T::Str], T::Num),
    ("isNaN", &[T::Num], T::Bool),
    ("isFinite", &[T::Num], T::Bool),
    ("String", &[T::Any], T::Str),
    ("Number", &[T::Any], T::Num),
    ("Boolean", &[T::Any], T::Bool),
    ("encodeURIComponent", &[T::Str], T::Str),
    ("decodeURIComponent", &[T::Str], T::Str),
];

const PARAM_NAMES: [&str; 3] = ["a", "b", "c"];

/// Define the built-ins on the global scope.
pub fn define_globals(graph: &mut TypeGraph, scopes: &mut ScopeTree) {
    let origin: Arc<str> = Arc::from(ECMASCRIPT_ORIGIN);
    let global = scopes.global;

    for name in ["NaN", "Infinity"] {
        let value = define(graph, scopes, global, name, &origin);
        graph.propagate(graph.number_val, value);
    }
    define(graph, scopes, global, "undefined", &origin);

    for &(name, params, ret) in FUNCTIONS {
        let f = function(graph, name, params, ret);
        let value = define(graph, scopes, global, name, &origin);
        graph.add(value, f);
    }

    for (name, members) in [("Math", MATH), ("console", CONSOLE), ("JSON", JSON)] {
        let object = graph.new_object(Some(name), Some(origin.clone()));
        for &(member, params, ret) in members {
            let f = function(graph, member, params, ret);
            let atom = graph.atoms.intern(member);
            let prop = graph.define_prop(object, atom, Some(site(&origin)));
            graph.add(prop, f);
        }
        let value = define(graph, scopes, global, name, &origin);
        graph.add(value, object);
    }

    let math = graph.atoms.intern("Math");
    if let Some(object) = scopes.own(global, math).and_then(|v| graph.object_type_of(v)) {
        let pi = graph.atoms.intern("PI");
        let prop = graph.define_prop(object, pi, Some(site(&origin)));
        graph.propagate(graph.number_val, prop);
    }
}

fn site(origin: &Arc<str>) -> DefSite {
    DefSite {
        origin: origin.clone(),
        range: None,
    }
}

fn define(graph: &mut TypeGraph, scopes: &mut ScopeTree, scope: ScopeId, name: &str, origin: &Arc<str>) -> AValId {
    let atom = graph.atoms.intern(name);
    scopes.define(graph, scope, atom, Some(site(origin)))
}

fn function(graph: &mut TypeGraph, name: &str, params: &[T], ret: T) -> TypeId {
    let param_vals: Vec<AValId> = params.iter().map(|&t| value(graph, t)).collect();
    let names = PARAM_NAMES.iter().take(params.len()).map(|s| s.to_string()).collect();
    let f = graph.new_fn(Some(name), param_vals, names);
    if let Some(ret_ty) = type_of(graph, ret) {
        if let Some(ret_val) = graph.as_fn(f).map(|f| f.ret) {
            graph.add(ret_val, ret_ty);
        }
    }
    f
}

fn value(graph: &mut TypeGraph, t: T) -> AValId {
    let aval = graph.new_aval();
    if let Some(ty) = type_of(graph, t) {
        graph.add(aval, ty);
    }
    aval
}

fn type_of(graph: &TypeGraph, t: T) -> Option<TypeId> {
    match t {
        T::Num => Some(graph.number_type),
        T::Str => Some(graph.string_type),
        T::Bool => Some(graph.bool_type),
        T::Any => None,
    }
}
