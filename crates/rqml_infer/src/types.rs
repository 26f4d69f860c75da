//! Type graph.
//!
//! Types live in a table and are referenced by [`TypeId`]. Every variable,
//! property and expression result is an abstract value ([`AValId`]): a small
//! set of types plus constraints that fire whenever a new type arrives.
//! `propagate(a, b)` makes every type of `a`, present or future, flow into `b`.

use indexmap::IndexMap;
use rqml_ast::types::ScopeId;
use rqml_core::intern::{Atom, AtomTable};
use rqml_core::text::TextRange;
use std::sync::Arc;

/// Handle to a type in the [`TypeGraph`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an abstract value in the [`TypeGraph`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AValId(pub u32);

impl AValId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An abstract value stops accepting types past this many.
const MAX_TYPES: usize = 8;

/// Prototype chains longer than this are treated as cyclic.
const MAX_PROTO_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub enum Type {
    Number,
    String,
    Bool,
    Object(ObjectType),
    Fn(FnType),
    Array(ArrayType),
}

#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    /// Component or constructor name; `None` for object literals.
    pub name: Option<String>,
    pub props: IndexMap<Atom, AValId>,
    pub proto: Option<TypeId>,
    /// File or module that defined the type.
    pub origin: Option<Arc<str>>,
}

#[derive(Debug, Clone)]
pub struct FnType {
    pub name: Option<String>,
    pub params: Vec<AValId>,
    pub param_names: Vec<String>,
    pub ret: AValId,
    /// Argument scope handed to handlers when this function is a signal.
    pub signal_args: Option<ScopeId>,
    /// Object produced by `new`, created on first use.
    instance: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct ArrayType {
    pub elem: AValId,
}

/// Where a value was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefSite {
    /// File or module name.
    pub origin: Arc<str>,
    /// Declaring node, when the origin is a parsed document.
    pub range: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Constraint {
    Flow(AValId),
    GetProp { name: Atom, target: AValId },
    SetProp { name: Atom, value: AValId },
    GetElem { target: AValId },
    Call { args: Arc<[AValId]>, ret: AValId },
    New { args: Arc<[AValId]>, ret: AValId },
    Plus { other: AValId, target: AValId },
}

/// An abstract value: the set of types an expression or slot may hold.
#[derive(Debug, Clone, Default)]
pub struct AVal {
    types: Vec<TypeId>,
    constraints: Vec<Constraint>,
    pub def: Option<DefSite>,
    /// Set on properties that hold functions or signals.
    pub is_function: bool,
    /// On a handler property (`onClicked`), the signal it handles.
    pub signal: Option<TypeId>,
    /// Constant values never accept new types.
    frozen: bool,
}

impl AVal {
    pub fn types(&self) -> &[TypeId] {
        &self.types
    }
}

/// The type table, the abstract values, and the names they use.
#[derive(Debug)]
pub struct TypeGraph {
    types: Vec<Type>,
    avals: Vec<AVal>,
    pub atoms: AtomTable,
    // Well-known types
    pub number_type: TypeId,
    pub string_type: TypeId,
    pub bool_type: TypeId,
    // Constant values holding exactly one well-known type
    pub number_val: AValId,
    pub string_val: AValId,
    pub bool_val: AValId,
    /// A value with no types, for `null` and statements.
    pub empty_val: AValId,
    length: Atom,
}

impl TypeGraph {
    pub fn new() -> Self {
        let mut atoms = AtomTable::new();
        let length = atoms.intern("length");
        let mut graph = Self {
            types: Vec::with_capacity(256),
            avals: Vec::with_capacity(1024),
            atoms,
            number_type: TypeId(0),
            string_type: TypeId(1),
            bool_type: TypeId(2),
            number_val: AValId(0),
            string_val: AValId(1),
            bool_val: AValId(2),
            empty_val: AValId(3),
            length,
        };
        graph.add_type(Type::Number);
        graph.add_type(Type::String);
        graph.add_type(Type::Bool);
        for ty in [graph.number_type, graph.string_type, graph.bool_type] {
            graph.avals.push(AVal {
                types: vec![ty],
                frozen: true,
                ..AVal::default()
            });
        }
        graph.avals.push(AVal {
            frozen: true,
            ..AVal::default()
        });
        graph
    }

    // ========================================================================
    // Tables
    // ========================================================================

    pub fn add_type(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn new_aval(&mut self) -> AValId {
        let id = AValId(self.avals.len() as u32);
        self.avals.push(AVal::default());
        id
    }

    pub fn new_aval_at(&mut self, def: DefSite) -> AValId {
        let id = self.new_aval();
        self.avals[id.index()].def = Some(def);
        id
    }

    pub fn aval(&self, id: AValId) -> &AVal {
        &self.avals[id.index()]
    }

    pub fn aval_mut(&mut self, id: AValId) -> &mut AVal {
        &mut self.avals[id.index()]
    }

    /// A fresh value that already holds `ty`.
    pub fn aval_of(&mut self, ty: TypeId) -> AValId {
        let id = self.new_aval();
        self.add(id, ty);
        id
    }

    pub fn new_object(&mut self, name: Option<&str>, origin: Option<Arc<str>>) -> TypeId {
        self.add_type(Type::Object(ObjectType {
            name: name.map(str::to_string),
            origin,
            ..ObjectType::default()
        }))
    }

    pub fn new_fn(&mut self, name: Option<&str>, params: Vec<AValId>, param_names: Vec<String>) -> TypeId {
        let ret = self.new_aval();
        self.add_type(Type::Fn(FnType {
            name: name.map(str::to_string),
            params,
            param_names,
            ret,
            signal_args: None,
            instance: None,
        }))
    }

    pub fn new_array(&mut self) -> TypeId {
        let elem = self.new_aval();
        self.add_type(Type::Array(ArrayType { elem }))
    }

    pub fn as_object(&self, id: TypeId) -> Option<&ObjectType> {
        match self.get(id) {
            Type::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_fn(&self, id: TypeId) -> Option<&FnType> {
        match self.get(id) {
            Type::Fn(f) => Some(f),
            _ => None,
        }
    }

    pub fn set_proto(&mut self, object: TypeId, proto: Option<TypeId>) {
        if let Type::Object(obj) = &mut self.types[object.index()] {
            obj.proto = proto;
        }
    }

    pub fn set_signal_args(&mut self, function: TypeId, scope: ScopeId) {
        if let Type::Fn(f) = &mut self.types[function.index()] {
            f.signal_args = Some(scope);
        }
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Find `name` on an object or along its prototype chain.
    pub fn object_prop(&self, object: TypeId, name: Atom) -> Option<AValId> {
        let mut current = Some(object);
        for _ in 0..MAX_PROTO_DEPTH {
            let obj = self.as_object(current?)?;
            if let Some(&prop) = obj.props.get(&name) {
                return Some(prop);
            }
            current = obj.proto;
        }
        None
    }

    /// Find `name` on any type `aval` holds.
    pub fn prop_of(&self, aval: AValId, name: Atom) -> Option<AValId> {
        self.aval(aval).types.iter().find_map(|&ty| self.type_prop(ty, name))
    }

    fn type_prop(&self, ty: TypeId, name: Atom) -> Option<AValId> {
        match self.get(ty) {
            Type::Object(_) => self.object_prop(ty, name),
            Type::String | Type::Array(_) if name == self.length => Some(self.number_val),
            _ => None,
        }
    }

    /// Define `name` directly on `object`, reusing an existing own property.
    pub fn define_prop(&mut self, object: TypeId, name: Atom, def: Option<DefSite>) -> AValId {
        if let Some(&existing) = self.as_object(object).and_then(|obj| obj.props.get(&name)) {
            return existing;
        }
        let prop = self.new_aval();
        self.avals[prop.index()].def = def;
        if let Type::Object(obj) = &mut self.types[object.index()] {
            obj.props.insert(name, prop);
        }
        prop
    }

    /// Whether `proto` already reaches `object`, so linking would close a cycle.
    pub fn proto_reaches(&self, proto: TypeId, object: TypeId) -> bool {
        let mut current = Some(proto);
        for _ in 0..MAX_PROTO_DEPTH {
            match current {
                Some(ty) if ty == object => return true,
                Some(ty) => current = self.as_object(ty).and_then(|obj| obj.proto),
                None => return false,
            }
        }
        true
    }

    /// The first object type `aval` holds.
    pub fn object_type_of(&self, aval: AValId) -> Option<TypeId> {
        self.aval(aval).types.iter().copied().find(|&ty| self.as_object(ty).is_some())
    }

    // ========================================================================
    // Propagation
    // ========================================================================

    /// Add `ty` to `aval` and run every constraint it triggers.
    pub fn add(&mut self, aval: AValId, ty: TypeId) {
        let mut work = vec![(aval, ty)];
        self.drain(&mut work);
    }

    /// Make every type of `from` flow into `to`.
    pub fn propagate(&mut self, from: AValId, to: AValId) {
        if from == to {
            return;
        }
        self.constrain(from, Constraint::Flow(to));
    }

    /// The value of `object.name`, resolved as `object` gains types.
    pub fn get_prop(&mut self, object: AValId, name: Atom) -> AValId {
        let target = self.new_aval();
        self.constrain(object, Constraint::GetProp { name, target });
        target
    }

    /// `object.name = value`: defines the property on object types lacking it.
    pub fn set_prop(&mut self, object: AValId, name: Atom, value: AValId) {
        self.constrain(object, Constraint::SetProp { name, value });
    }

    /// `object[index]` for a non-constant index.
    pub fn get_elem(&mut self, object: AValId) -> AValId {
        let target = self.new_aval();
        self.constrain(object, Constraint::GetElem { target });
        target
    }

    pub fn call(&mut self, callee: AValId, args: Vec<AValId>, is_new: bool) -> AValId {
        let ret = self.new_aval();
        let args: Arc<[AValId]> = args.into();
        let constraint = if is_new {
            Constraint::New { args, ret }
        } else {
            Constraint::Call { args, ret }
        };
        self.constrain(callee, constraint);
        ret
    }

    /// `left + right`: string when either side is a string, number when both are numbers.
    pub fn plus(&mut self, left: AValId, right: AValId) -> AValId {
        let target = self.new_aval();
        self.constrain(left, Constraint::Plus { other: right, target });
        self.constrain(right, Constraint::Plus { other: left, target });
        target
    }

    fn constrain(&mut self, aval: AValId, constraint: Constraint) {
        let mut work = Vec::new();
        self.constrain_into(aval, constraint, &mut work);
        self.drain(&mut work);
    }

    /// Attach `constraint` and apply it to the types `aval` already holds.
    fn constrain_into(&mut self, aval: AValId, constraint: Constraint, work: &mut Vec<(AValId, TypeId)>) {
        let slot = &mut self.avals[aval.index()];
        if slot.constraints.contains(&constraint) {
            return;
        }
        slot.constraints.push(constraint.clone());
        let existing = slot.types.clone();
        for ty in existing {
            self.apply(&constraint, ty, work);
        }
    }

    fn drain(&mut self, work: &mut Vec<(AValId, TypeId)>) {
        while let Some((aval, ty)) = work.pop() {
            let slot = &mut self.avals[aval.index()];
            if slot.frozen || slot.types.contains(&ty) || slot.types.len() >= MAX_TYPES {
                continue;
            }
            slot.types.push(ty);
            let constraints = slot.constraints.clone();
            for constraint in &constraints {
                self.apply(constraint, ty, work);
            }
        }
    }

    fn apply(&mut self, constraint: &Constraint, ty: TypeId, work: &mut Vec<(AValId, TypeId)>) {
        match constraint {
            Constraint::Flow(target) => work.push((*target, ty)),
            Constraint::GetProp { name, target } => {
                if let Some(prop) = self.type_prop(ty, *name) {
                    self.constrain_into(prop, Constraint::Flow(*target), work);
                }
            }
            Constraint::SetProp { name, value } => {
                if self.as_object(ty).is_some() {
                    let prop = self.define_prop(ty, *name, None);
                    self.constrain_into(*value, Constraint::Flow(prop), work);
                }
            }
            Constraint::GetElem { target } => {
                if let Type::Array(array) = self.get(ty) {
                    let elem = array.elem;
                    self.constrain_into(elem, Constraint::Flow(*target), work);
                }
            }
            Constraint::Call { args, ret } => {
                if let Some(f) = self.as_fn(ty) {
                    let (params, fn_ret) = (f.params.clone(), f.ret);
                    for (arg, param) in args.iter().zip(params) {
                        self.constrain_into(*arg, Constraint::Flow(param), work);
                    }
                    self.constrain_into(fn_ret, Constraint::Flow(*ret), work);
                }
            }
            Constraint::New { args, ret } => {
                if let Some(instance) = self.instance_of(ty) {
                    if let Some(params) = self.as_fn(ty).map(|f| f.params.clone()) {
                        for (arg, param) in args.iter().zip(params) {
                            self.constrain_into(*arg, Constraint::Flow(param), work);
                        }
                    }
                    work.push((*ret, instance));
                }
            }
            Constraint::Plus { other, target } => {
                if ty == self.string_type {
                    work.push((*target, self.string_type));
                } else if ty == self.number_type && self.aval(*other).types.contains(&self.number_type) {
                    work.push((*target, self.number_type));
                }
            }
        }
    }

    /// The object `new f()` produces, named after `f`.
    fn instance_of(&mut self, function: TypeId) -> Option<TypeId> {
        let f = self.as_fn(function)?;
        if let Some(instance) = f.instance {
            return Some(instance);
        }
        let name = f.name.clone();
        let instance = self.new_object(name.as_deref(), None);
        if let Type::Fn(f) = &mut self.types[function.index()] {
            f.instance = Some(instance);
        }
        Some(instance)
    }

    // ========================================================================
    // Display
    // ========================================================================

    /// Printable type of a value: `?` when nothing is known, alternatives
    /// joined by `|`.
    pub fn display_aval(&self, aval: AValId) -> String {
        self.display_aval_depth(aval, 0)
    }

    fn display_aval_depth(&self, aval: AValId, depth: usize) -> String {
        let mut names: Vec<String> = Vec::new();
        for &ty in &self.aval(aval).types {
            let name = self.display_type_depth(ty, depth);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        if names.is_empty() {
            "?".to_string()
        } else {
            names.join("|")
        }
    }

    pub fn display_type(&self, ty: TypeId) -> String {
        self.display_type_depth(ty, 0)
    }

    fn display_type_depth(&self, ty: TypeId, depth: usize) -> String {
        if depth > 2 {
            return "?".to_string();
        }
        match self.get(ty) {
            Type::Number => "number".to_string(),
            Type::String => "string".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Object(obj) => match &obj.name {
                Some(name) => name.clone(),
                None => {
                    let keys: Vec<&str> = obj.props.keys().map(|&k| self.atoms.resolve(k)).collect();
                    format!("{{{}}}", keys.join(", "))
                }
            },
            Type::Array(array) => format!("[{}]", self.display_aval_depth(array.elem, depth + 1)),
            Type::Fn(f) => {
                let params: Vec<String> = f
                    .param_names
                    .iter()
                    .zip(&f.params)
                    .map(|(name, &param)| format!("{}: {}", name, self.display_aval_depth(param, depth + 1)))
                    .collect();
                let ret = self.display_aval_depth(f.ret, depth + 1);
                if ret == "?" {
                    format!("fn({})", params.join(", "))
                } else {
                    format!("fn({}) -> {}", params.join(", "), ret)
                }
            }
        }
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}
