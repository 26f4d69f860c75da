//! Second pass: propagate types through the scopes built by gathering.

use crate::analyzer::{Analyzer, RefTarget};
use crate::imports::{handler_name, seed_primitive, SIGNAL, SIGNAL_HANDLER};
use crate::scope::ScopeKind;
use crate::types::{AValId, TypeId};
use rqml_ast::node::*;
use rqml_ast::types::{ScopeId, ScopeSlot};
use rqml_ast::visitor::{walk_member_block, walk_statement, AstVisitor};
use rqml_ast::SyntaxKind;

impl Analyzer {
    pub fn infer_program<'a>(&mut self, program: &'a Program<'a>) {
        let mut inferrer = QmlInferrer {
            analyzer: self,
            object_scope: None,
            member_scope: None,
        };
        inferrer.visit_program(program);
    }

    // ========================================================================
    // JavaScript
    // ========================================================================

    /// Infer a function's body in the scope gathering gave it.
    fn infer_function<'a>(&mut self, function: &'a Function<'a>) -> Option<TypeId> {
        let scope = function.scope.get()?;
        self.infer_statements(function.body.body.iter(), scope);
        match self.scopes.get(scope).kind {
            ScopeKind::Function { function } => Some(function),
            _ => None,
        }
    }

    fn infer_statements<'a, I>(&mut self, statements: I, scope: ScopeId)
    where
        I: Iterator<Item = &'a Statement<'a>>,
    {
        let mut inferrer = JsInferrer { analyzer: self, scope };
        for stmt in statements {
            inferrer.visit_statement(stmt);
        }
    }

    fn lookup_name(&self, scope: ScopeId, name: &str) -> Option<AValId> {
        let atom = self.graph.atoms.get(name)?;
        self.scopes.lookup(&self.graph, scope, atom)
    }

    /// Infer an expression and return the value holding its types.
    pub fn infer_expr<'a>(&mut self, expr: &'a Expression<'a>, scope: ScopeId) -> AValId {
        match expr {
            Expression::Identifier(id) => {
                if id.is_dummy() {
                    return self.graph.empty_val;
                }
                match self.lookup_name(scope, id.name) {
                    Some(value) => {
                        self.reference(id.data.range, RefTarget::Value(value));
                        self.exprs.push((id.data.range, value));
                        value
                    }
                    None => self.graph.new_aval(),
                }
            }
            Expression::Literal(lit) => match lit.value {
                LiteralValue::Number(_) => self.graph.number_val,
                LiteralValue::String(_) => self.graph.string_val,
                LiteralValue::Boolean(_) => self.graph.bool_val,
                LiteralValue::Null => self.graph.empty_val,
                LiteralValue::RegExp { .. } => {
                    let regexp = self.graph.new_object(Some("RegExp"), None);
                    self.graph.aval_of(regexp)
                }
            },
            Expression::This(_) => match self.scopes.enclosing_object(scope) {
                Some(object) => self.graph.aval_of(object),
                None => self.graph.empty_val,
            },
            Expression::Array(array) => {
                let ty = self.graph.new_array();
                if let Some(elem) = self.array_elem(ty) {
                    for element in array.elements.iter().flatten() {
                        let value = self.infer_expr(element, scope);
                        self.graph.propagate(value, elem);
                    }
                }
                self.graph.aval_of(ty)
            }
            Expression::Object(object) => {
                let ty = self.graph.new_object(None, Some(self.file.clone()));
                for property in object.properties.iter() {
                    let value = self.infer_expr(&property.value, scope);
                    let Some(name) = property.key.name() else {
                        continue;
                    };
                    let atom = self.intern(name);
                    let site = self.site(property.key.range());
                    let prop = self.graph.define_prop(ty, atom, Some(site));
                    self.reference(property.key.range(), RefTarget::Value(prop));
                    match property.kind {
                        PropertyKind::Init => self.graph.propagate(value, prop),
                        PropertyKind::Get => {
                            let ret = self.graph.call(value, Vec::new(), false);
                            self.graph.propagate(ret, prop);
                        }
                        PropertyKind::Set => {}
                    }
                }
                self.graph.aval_of(ty)
            }
            Expression::Function(function) => match self.infer_function(function) {
                Some(ty) => self.graph.aval_of(ty),
                None => self.graph.empty_val,
            },
            Expression::Unary(unary) => {
                self.infer_expr(&unary.argument, scope);
                match unary.operator {
                    SyntaxKind::ExclamationToken | SyntaxKind::DeleteKeyword => self.graph.bool_val,
                    SyntaxKind::TypeOfKeyword => self.graph.string_val,
                    SyntaxKind::VoidKeyword => self.graph.empty_val,
                    _ => self.graph.number_val,
                }
            }
            Expression::Update(update) => {
                self.infer_expr(&update.argument, scope);
                self.graph.number_val
            }
            Expression::Binary(binary) => self.infer_binary(binary, scope),
            Expression::Assignment(assign) => self.infer_assignment(assign, scope),
            Expression::Conditional(cond) => {
                self.infer_expr(&cond.test, scope);
                let out = self.graph.new_aval();
                let consequent = self.infer_expr(&cond.consequent, scope);
                let alternate = self.infer_expr(&cond.alternate, scope);
                self.graph.propagate(consequent, out);
                self.graph.propagate(alternate, out);
                out
            }
            Expression::Call(call) => {
                let callee = self.infer_expr(&call.callee, scope);
                let args = call.arguments.iter().map(|arg| self.infer_expr(arg, scope)).collect();
                let is_new = call.data.kind == SyntaxKind::NewExpression;
                let value = self.graph.call(callee, args, is_new);
                self.exprs.push((call.data.range, value));
                value
            }
            Expression::Member(member) => {
                let object = self.infer_expr(&member.object, scope);
                let value = match member.static_name() {
                    Some(name) => {
                        let atom = self.intern(name);
                        self.reference(member.property.range(), RefTarget::Member { object, name: atom });
                        self.graph.get_prop(object, atom)
                    }
                    None => {
                        self.infer_expr(&member.property, scope);
                        self.graph.get_elem(object)
                    }
                };
                self.exprs.push((member.data.range, value));
                value
            }
            Expression::Sequence(seq) => {
                let mut last = self.graph.empty_val;
                for expr in seq.expressions.iter() {
                    last = self.infer_expr(expr, scope);
                }
                last
            }
        }
    }

    fn array_elem(&self, ty: TypeId) -> Option<AValId> {
        match self.graph.get(ty) {
            crate::types::Type::Array(array) => Some(array.elem),
            _ => None,
        }
    }

    fn infer_binary<'a>(&mut self, binary: &'a BinaryExpression<'a>, scope: ScopeId) -> AValId {
        let left = self.infer_expr(&binary.left, scope);
        let right = self.infer_expr(&binary.right, scope);
        if binary.data.kind == SyntaxKind::LogicalExpression {
            let out = self.graph.new_aval();
            self.graph.propagate(left, out);
            self.graph.propagate(right, out);
            return out;
        }
        match binary.operator {
            SyntaxKind::PlusToken => self.graph.plus(left, right),
            SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::EqualsEqualsEqualsToken
            | SyntaxKind::ExclamationEqualsEqualsToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken
            | SyntaxKind::InKeyword
            | SyntaxKind::InstanceOfKeyword => self.graph.bool_val,
            _ => self.graph.number_val,
        }
    }

    fn infer_assignment<'a>(&mut self, assign: &'a AssignmentExpression<'a>, scope: ScopeId) -> AValId {
        let right = self.infer_expr(&assign.right, scope);
        let value = match assign.operator {
            SyntaxKind::EqualsToken => right,
            SyntaxKind::PlusEqualsToken => {
                let current = self.infer_expr(&assign.left, scope);
                self.graph.plus(current, right)
            }
            _ => self.graph.number_val,
        };
        match &assign.left {
            Expression::Identifier(id) if !id.is_dummy() => {
                if let Some(target) = self.lookup_name(scope, id.name) {
                    if assign.operator == SyntaxKind::EqualsToken {
                        self.reference(id.data.range, RefTarget::Value(target));
                    }
                    self.graph.propagate(value, target);
                }
            }
            Expression::Member(member) => {
                let object = self.infer_expr(&member.object, scope);
                if let Some(name) = member.static_name() {
                    let atom = self.intern(name);
                    self.reference(member.property.range(), RefTarget::Member { object, name: atom });
                    self.graph.set_prop(object, atom, value);
                }
            }
            _ => {}
        }
        value
    }
}

/// Walks the QML tree over the scopes gathering attached to it.
struct QmlInferrer<'s> {
    analyzer: &'s mut Analyzer,
    object_scope: Option<ScopeId>,
    member_scope: Option<ScopeId>,
}

impl QmlInferrer<'_> {
    fn enter_object<'a>(&mut self, slot: &ScopeSlot, block: &'a MemberBlock<'a>) -> Option<TypeId> {
        let scope = slot.get()?;
        let saved = self.object_scope.replace(scope);
        self.visit_member_block(block);
        self.object_scope = saved;
        self.analyzer.scopes.object_of(scope)
    }

    fn object_value<'a>(&mut self, node: &'a ObjectLiteral<'a>) -> AValId {
        match self.enter_object(&node.scope, &node.block) {
            Some(ty) => self.analyzer.graph.aval_of(ty),
            None => self.analyzer.graph.empty_val,
        }
    }

    fn infer_binding<'a>(&mut self, binding: &'a Binding<'a>, object_scope: ScopeId, slot: &ScopeSlot) -> AValId {
        match binding {
            Binding::Expression(expr) => {
                let scope = slot.get().unwrap_or(object_scope);
                self.analyzer.infer_expr(expr, scope)
            }
            Binding::Block(block) => {
                let scope = block.scope.get().unwrap_or(object_scope);
                self.analyzer.infer_statements(block.body.iter(), scope);
                self.analyzer.graph.empty_val
            }
            Binding::Object(object) => self.object_value(object),
            Binding::Array(array) => {
                let ty = self.analyzer.graph.new_array();
                let elem = self.analyzer.array_elem(ty);
                for element in array.elements.iter() {
                    let value = self.object_value(element);
                    if let Some(elem) = elem {
                        self.analyzer.graph.propagate(value, elem);
                    }
                }
                self.analyzer.graph.aval_of(ty)
            }
        }
    }
}

impl<'a> AstVisitor<'a> for QmlInferrer<'_> {
    fn visit_object_literal(&mut self, node: &'a ObjectLiteral<'a>) {
        self.enter_object(&node.scope, &node.block);
    }

    /// The modified property is looked up like a binding's; the modifier's
    /// own members are inferred as an object's.
    fn visit_property_modifier(&mut self, node: &'a PropertyModifier<'a>) {
        if let Some(member_scope) = self.member_scope {
            self.analyzer.resolve_property_name(member_scope, &node.id);
        }
        self.enter_object(&node.scope, &node.block);
    }

    fn visit_member_block(&mut self, node: &'a MemberBlock<'a>) {
        let Some(member_scope) = node.scope.get() else {
            return;
        };
        let saved = self.member_scope.replace(member_scope);
        walk_member_block(self, node);
        self.member_scope = saved;
    }

    /// The declared kind seeds the property; an initializer flows into it too.
    fn visit_property_declaration(&mut self, node: &'a PropertyDeclaration<'a>) {
        let (Some(object_scope), Some(member_scope)) = (self.object_scope, self.member_scope) else {
            return;
        };
        let Some(prop) = self.analyzer.lookup_name(member_scope, node.id.name) else {
            return;
        };
        match &node.kind {
            PropertyType::Builtin(kind) => seed_primitive(&mut self.analyzer.graph, kind.name, prop),
            PropertyType::Named(qid) => {
                let file = self.analyzer.scopes.file;
                let component = self
                    .analyzer
                    .resolve_qualified_id(file, qid)
                    .and_then(|value| self.analyzer.graph.object_type_of(value));
                match component {
                    Some(component) => self.analyzer.graph.add(prop, component),
                    None => seed_primitive(&mut self.analyzer.graph, qid.name, prop),
                }
            }
        }
        if let Some(binding) = &node.binding {
            let value = self.infer_binding(binding, object_scope, &node.scope);
            self.analyzer.graph.propagate(value, prop);
        }
    }

    fn visit_property_binding(&mut self, node: &'a PropertyBinding<'a>) {
        let (Some(object_scope), Some(member_scope)) = (self.object_scope, self.member_scope) else {
            return;
        };
        let analyzer = &mut *self.analyzer;
        if node.id.name == "id" {
            if let Binding::Expression(Expression::Identifier(ident)) = node.binding {
                let id = analyzer
                    .graph
                    .atoms
                    .get(ident.name)
                    .and_then(|atom| analyzer.scopes.own(analyzer.scopes.ids, atom));
                if let (Some(id), Some(object)) = (id, analyzer.scopes.object_of(object_scope)) {
                    analyzer.graph.add(id, object);
                }
            }
            return;
        }

        let prop = analyzer.resolve_property_name(member_scope, &node.id);
        let signal = prop.and_then(|prop| analyzer.graph.aval(prop).signal);
        if let Some(signal) = signal {
            // Handler bodies see the signal's arguments.
            let args = analyzer.graph.as_fn(signal).and_then(|f| f.signal_args);
            let handler = match node.binding {
                Binding::Block(block) => block.scope.get(),
                _ => node.scope.get(),
            };
            if let (Some(handler), Some(args)) = (handler, args) {
                analyzer.scopes.set_handler_args(handler, args);
            }
            self.infer_binding(&node.binding, object_scope, &node.scope);
            return;
        }

        let value = self.infer_binding(&node.binding, object_scope, &node.scope);
        if let Some(prop) = prop {
            self.analyzer.graph.propagate(value, prop);
        }
    }

    /// The signal property holds a function returning a "Signal" object,
    /// with its parameters left open. The handler property holds a
    /// "Signal Handler" marker object.
    fn visit_signal_definition(&mut self, node: &'a SignalDefinition<'a>) {
        let Some(object) = self.object_scope.and_then(|scope| self.analyzer.scopes.object_of(scope)) else {
            return;
        };
        let graph = &mut self.analyzer.graph;
        let handler = graph
            .atoms
            .get(&handler_name(node.id.name))
            .and_then(|atom| graph.object_prop(object, atom));
        let Some(handler) = handler else {
            return;
        };
        let Some(signal) = graph.aval(handler).signal else {
            return;
        };

        if let Some(ret) = graph.as_fn(signal).map(|f| f.ret) {
            let tag = graph.new_object(Some(SIGNAL), None);
            graph.add(ret, tag);
        }
        let prop = graph.atoms.get(node.id.name).and_then(|atom| graph.object_prop(object, atom));
        if let Some(prop) = prop {
            graph.add(prop, signal);
        }
        let marker = graph.new_object(Some(SIGNAL_HANDLER), None);
        graph.add(handler, marker);
    }

    fn visit_function(&mut self, node: &'a Function<'a>) {
        self.analyzer.infer_function(node);
    }
}

/// Walks statements, inferring each expression once and flowing `var`
/// initializers and `return` values into their targets.
struct JsInferrer<'s> {
    analyzer: &'s mut Analyzer,
    scope: ScopeId,
}

impl<'a> AstVisitor<'a> for JsInferrer<'_> {
    fn visit_expression(&mut self, node: &'a Expression<'a>) {
        self.analyzer.infer_expr(node, self.scope);
    }

    fn visit_function(&mut self, node: &'a Function<'a>) {
        self.analyzer.infer_function(node);
    }

    fn visit_variable_declarator(&mut self, node: &'a VariableDeclarator<'a>) {
        let Some(init) = &node.init else {
            return;
        };
        let value = self.analyzer.infer_expr(init, self.scope);
        if let Some(var) = self.analyzer.lookup_name(self.scope, node.id.name) {
            self.analyzer.graph.propagate(value, var);
        }
    }

    fn visit_statement(&mut self, node: &'a Statement<'a>) {
        let Statement::Return(ret) = node else {
            walk_statement(self, node);
            return;
        };
        let Some(argument) = &ret.argument else {
            return;
        };
        let value = self.analyzer.infer_expr(argument, self.scope);
        let target = self
            .analyzer
            .scopes
            .enclosing_function(self.scope)
            .and_then(|f| self.analyzer.graph.as_fn(f))
            .map(|f| f.ret);
        if let Some(target) = target {
            self.analyzer.graph.propagate(value, target);
        }
    }
}
