//! First pass: build the scope tree.
//!
//! Every object literal and property modifier gets an object scope and its
//! member block a member scope. Binding values and statement blocks get
//! script scopes, signal definitions an argument scope, and JavaScript
//! functions a function scope.
//! Declarations (properties, signals, handlers, functions, ids, `var`s) are
//! defined here so that inference can resolve forward references.

use crate::analyzer::{Analyzer, RefTarget};
use crate::imports::{handler_name, is_handler_name};
use crate::scope::ScopeKind;
use crate::types::{AValId, TypeId};
use rqml_ast::node::*;
use rqml_ast::types::{ScopeId, ScopeSlot};
use rqml_ast::visitor::{walk_member_block, walk_statement, AstVisitor};
use rqml_core::text::TextRange;
use tracing::trace;

impl Analyzer {
    pub fn gather_program<'a>(&mut self, program: &'a Program<'a>) {
        let mut gatherer = ScopeGatherer {
            analyzer: self,
            object_scope: None,
            member_scope: None,
        };
        gatherer.visit_program(program);
    }

    /// A fresh object type named `id`, with the component that name resolves
    /// to as prototype. The root object of a component file is named after
    /// the file and never inherits from itself.
    fn object_type(&mut self, id: &QualifiedId<'_>, is_root: bool) -> TypeId {
        let file = self.scopes.file;
        let mut proto = self
            .resolve_qualified_id(file, id)
            .and_then(|value| self.graph.object_type_of(value));

        let name = match (&self.component, is_root) {
            (Some(component), true) => component.clone(),
            _ => id.name.to_string(),
        };
        if is_root {
            while let Some(obj) = proto.and_then(|ty| self.graph.as_object(ty)) {
                let is_self = obj.origin.as_deref() == Some(&*self.file) && obj.name.as_deref() == Some(name.as_str());
                if !is_self {
                    break;
                }
                proto = obj.proto;
            }
        }

        let object = self.graph.new_object(Some(&name), Some(self.file.clone()));
        self.graph.set_proto(object, proto);
        object
    }

    /// Object scope for an object literal or property modifier. Nested
    /// objects see the root object's properties unqualified.
    fn object_scope(&mut self, id: &QualifiedId<'_>, range: TextRange, slot: &ScopeSlot) -> ScopeId {
        let is_root = self.root_scope.is_none();
        let object = self.object_type(id, is_root);
        let parent = self.root_scope.unwrap_or(self.scopes.file);
        let scope = self.scopes.add(ScopeKind::Object { object }, Some(parent), range);
        slot.set(Some(scope));
        if is_root {
            self.root_scope = Some(scope);
        }
        trace!(name = id.name, ?scope, "object scope");
        scope
    }

    /// A signal defines a callable property and an `on<Name>` handler
    /// property. Its parameters live in an argument scope that handler
    /// bodies see during inference.
    fn gather_signal<'a>(&mut self, node: &'a SignalDefinition<'a>, object_scope: ScopeId) {
        let args = self.scopes.add(ScopeKind::SignalArgs, None, node.data.range);
        node.scope.set(Some(args));
        let mut params = Vec::with_capacity(node.params.len());
        let mut names = Vec::with_capacity(node.params.len());
        for param in node.params.iter() {
            params.push(self.declare(args, param.id.name, param.id.data.range));
            names.push(param.id.name.to_string());
        }
        let signal = self.graph.new_fn(Some(node.id.name), params, names);
        self.graph.set_signal_args(signal, args);

        let prop = self.declare(object_scope, node.id.name, node.id.data.range);
        self.graph.aval_mut(prop).is_function = true;

        let handler_atom = self.intern(&handler_name(node.id.name));
        let site = self.site(node.id.data.range);
        let handler = self.scopes.define(&mut self.graph, object_scope, handler_atom, Some(site));
        self.graph.aval_mut(handler).signal = Some(signal);
    }

    /// Function members are defined on the object and flagged as functions,
    /// so member scopes skip them. The function scope hangs off a script
    /// scope so its body sees ids, globals and the object's properties.
    fn gather_member_function<'a>(&mut self, function: &'a Function<'a>, object_scope: ScopeId) {
        let script = self.scopes.add(ScopeKind::Block, Some(object_scope), function.data.range);
        let (ty, _) = self.gather_function(function, Some(script));
        if let Some(id) = function.id.filter(|id| !id.is_dummy()) {
            let prop = self.declare(object_scope, id.name, id.data.range);
            self.graph.aval_mut(prop).is_function = true;
            self.graph.add(prop, ty);
        }
    }

    // ========================================================================
    // JavaScript
    // ========================================================================

    /// Create the function type and scope for `function`, bind its
    /// parameters, and gather its body.
    fn gather_function<'a>(&mut self, function: &'a Function<'a>, parent: Option<ScopeId>) -> (TypeId, ScopeId) {
        let mut params: Vec<AValId> = Vec::with_capacity(function.params.len());
        for param in function.params.iter() {
            let site = self.site(param.data.range);
            let aval = self.graph.new_aval_at(site);
            self.reference(param.data.range, RefTarget::Value(aval));
            params.push(aval);
        }
        let names = function.params.iter().map(|p| p.name.to_string()).collect();
        let name = function.id.filter(|id| !id.is_dummy()).map(|id| id.name);
        let ty = self.graph.new_fn(name, params.clone(), names);

        let scope = self.scopes.add(ScopeKind::Function { function: ty }, parent, function.data.range);
        function.scope.set(Some(scope));
        for (param, aval) in function.params.iter().zip(params) {
            let atom = self.intern(param.name);
            self.scopes.insert(scope, atom, aval);
        }
        // A named function expression sees its own name.
        if !function.is_declaration() {
            if let Some(id) = function.id.filter(|id| !id.is_dummy()) {
                let own = self.declare(scope, id.name, id.data.range);
                self.graph.add(own, ty);
            }
        }

        let mut gatherer = JsGatherer { analyzer: self, scope };
        for stmt in function.body.body.iter() {
            gatherer.visit_statement(stmt);
        }
        (ty, scope)
    }
}

/// Walks the QML tree, giving objects and member blocks their scopes and
/// declaring members. Script values are handed to [`JsGatherer`].
struct ScopeGatherer<'s> {
    analyzer: &'s mut Analyzer,
    object_scope: Option<ScopeId>,
    member_scope: Option<ScopeId>,
}

impl ScopeGatherer<'_> {
    fn gather_binding<'a>(&mut self, binding: &'a Binding<'a>, object_scope: ScopeId, slot: &ScopeSlot, handler: bool) {
        let kind = if handler {
            ScopeKind::Handler { args: None }
        } else {
            ScopeKind::Block
        };
        match binding {
            Binding::Expression(expr) => {
                let scope = self.analyzer.scopes.add(kind, Some(object_scope), expr.range());
                slot.set(Some(scope));
                JsGatherer {
                    analyzer: &mut *self.analyzer,
                    scope,
                }
                .visit_expression(expr);
            }
            Binding::Block(block) => {
                let scope = self.analyzer.scopes.add(kind, Some(object_scope), block.data.range);
                block.scope.set(Some(scope));
                let mut gatherer = JsGatherer {
                    analyzer: &mut *self.analyzer,
                    scope,
                };
                for stmt in block.body.iter() {
                    gatherer.visit_statement(stmt);
                }
            }
            Binding::Object(object) => self.visit_object_literal(object),
            Binding::Array(array) => self.visit_array_binding(array),
        }
    }

    fn enter_object<'a>(&mut self, scope: ScopeId, block: &'a MemberBlock<'a>) {
        let saved = self.object_scope.replace(scope);
        self.visit_member_block(block);
        self.object_scope = saved;
    }
}

impl<'a> AstVisitor<'a> for ScopeGatherer<'_> {
    fn visit_object_literal(&mut self, node: &'a ObjectLiteral<'a>) {
        let scope = self.analyzer.object_scope(&node.id, node.data.range, &node.scope);
        self.enter_object(scope, &node.block);
    }

    fn visit_property_modifier(&mut self, node: &'a PropertyModifier<'a>) {
        let scope = self.analyzer.object_scope(&node.kind, node.data.range, &node.scope);
        self.enter_object(scope, &node.block);
    }

    fn visit_member_block(&mut self, node: &'a MemberBlock<'a>) {
        let Some(object_scope) = self.object_scope else {
            return;
        };
        let file = self.analyzer.scopes.file;
        let member_scope = self
            .analyzer
            .scopes
            .add(ScopeKind::Member { file }, Some(object_scope), node.data.range);
        node.scope.set(Some(member_scope));
        let saved = self.member_scope.replace(member_scope);
        walk_member_block(self, node);
        self.member_scope = saved;
    }

    fn visit_property_declaration(&mut self, node: &'a PropertyDeclaration<'a>) {
        let (Some(object_scope), Some(member_scope)) = (self.object_scope, self.member_scope) else {
            return;
        };
        if !node.id.is_dummy() {
            self.analyzer.declare(member_scope, node.id.name, node.id.data.range);
        }
        if let Some(binding) = &node.binding {
            self.gather_binding(binding, object_scope, &node.scope, false);
        }
    }

    fn visit_property_binding(&mut self, node: &'a PropertyBinding<'a>) {
        let Some(object_scope) = self.object_scope else {
            return;
        };
        if node.id.name == "id" {
            if let Binding::Expression(Expression::Identifier(ident)) = node.binding {
                let ids = self.analyzer.scopes.ids;
                self.analyzer.declare(ids, ident.name, ident.data.range);
            }
        }
        let handler = node.id.last().is_some_and(|part| is_handler_name(part.name));
        self.gather_binding(&node.binding, object_scope, &node.scope, handler);
    }

    fn visit_signal_definition(&mut self, node: &'a SignalDefinition<'a>) {
        if let Some(object_scope) = self.object_scope {
            self.analyzer.gather_signal(node, object_scope);
        }
    }

    fn visit_function(&mut self, node: &'a Function<'a>) {
        if let Some(object_scope) = self.object_scope {
            self.analyzer.gather_member_function(node, object_scope);
        }
    }
}

/// Hoists `var` and function declarations into the current variable scope
/// and gives nested functions their own scopes.
struct JsGatherer<'s> {
    analyzer: &'s mut Analyzer,
    scope: ScopeId,
}

impl<'a> AstVisitor<'a> for JsGatherer<'_> {
    fn visit_function(&mut self, node: &'a Function<'a>) {
        let (ty, _) = self.analyzer.gather_function(node, Some(self.scope));
        if node.is_declaration() {
            if let Some(id) = node.id.filter(|id| !id.is_dummy()) {
                let aval = self.analyzer.declare(self.scope, id.name, id.data.range);
                self.analyzer.graph.add(aval, ty);
            }
        }
    }

    fn visit_variable_declarator(&mut self, node: &'a VariableDeclarator<'a>) {
        if !node.id.is_dummy() {
            self.analyzer.declare(self.scope, node.id.name, node.id.data.range);
        }
        if let Some(init) = &node.init {
            self.visit_expression(init);
        }
    }

    fn visit_statement(&mut self, node: &'a Statement<'a>) {
        if let Statement::Try(stmt) = node {
            if let Some(handler) = stmt.handler {
                self.analyzer.declare(self.scope, handler.param.name, handler.param.data.range);
            }
        }
        walk_statement(self, node);
    }
}
